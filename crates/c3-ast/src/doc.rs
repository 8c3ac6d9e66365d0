// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Doc comments: `<* ... *>` blocks with `@name` contract lines.

use crate::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct DocComment {
    /// Free text before the first contract, lines trimmed.
    pub body: String,
    pub contracts: Vec<DocContract>,
    pub span: Span,
}

/// `@param x "the x"`, `@require a > 0`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct DocContract {
    /// Contract name without the `@`.
    pub name: String,
    pub body: String,
}

impl DocComment {
    /// Parse the raw text of a doc block, delimiters included.
    pub fn parse(raw: &str, span: Span) -> DocComment {
        let inner = raw.strip_prefix("<*").unwrap_or(raw);
        let inner = inner.strip_suffix("*>").unwrap_or(inner);

        let mut body_lines: Vec<&str> = Vec::new();
        let mut contracts: Vec<DocContract> = Vec::new();

        for line in inner.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix('@') {
                let name_len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                if name_len > 0 {
                    contracts.push(DocContract {
                        name: rest[..name_len].to_string(),
                        body: rest[name_len..].trim().to_string(),
                    });
                    continue;
                }
            }
            match contracts.last_mut() {
                // continuation of the previous contract
                Some(c) if !line.is_empty() => {
                    if !c.body.is_empty() {
                        c.body.push(' ');
                    }
                    c.body.push_str(line);
                }
                Some(_) => {}
                None => body_lines.push(line),
            }
        }

        let body = body_lines.join("\n").trim().to_string();
        DocComment { body, contracts, span }
    }

    pub fn contract(&self, name: &str) -> impl Iterator<Item = &DocContract> {
        let name = name.to_string();
        self.contracts.iter().filter(move |c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_and_contracts() {
        let doc = DocComment::parse(
            "<*\n Adds two numbers.\n\n More text.\n @param a \"first\"\n @param b\n   \"second\"\n @require a > 0\n*>",
            Span::default(),
        );
        assert_eq!(doc.body, "Adds two numbers.\n\nMore text.");
        assert_eq!(doc.contracts.len(), 3);
        assert_eq!(doc.contracts[0].name, "param");
        assert_eq!(doc.contracts[0].body, "a \"first\"");
        assert_eq!(doc.contracts[1].body, "b \"second\"");
        assert_eq!(doc.contract("require").count(), 1);
    }

    #[test]
    fn single_line() {
        let doc = DocComment::parse("<* Short. *>", Span::default());
        assert_eq!(doc.body, "Short.");
        assert!(doc.contracts.is_empty());
    }
}
