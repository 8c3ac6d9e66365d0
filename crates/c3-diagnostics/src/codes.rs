// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (E0001, E0100, ...) to titles and categories. Used by
//! `c3p explain <code>` and the JSON report.

use std::collections::HashMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "Lexical"),
            ErrorCategory::Syntax => write!(f, "Syntax"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

pub const INVALID_CHARACTER: &str = "E0001";
pub const UNTERMINATED_LITERAL: &str = "E0002";
pub const INVALID_ESCAPE: &str = "E0003";
pub const INVALID_NUMERIC_SUFFIX: &str = "E0004";
pub const MALFORMED_NUMBER: &str = "E0005";

pub const UNEXPECTED_TOKEN: &str = "E0100";
pub const MISSING_TOKEN: &str = "E0101";
pub const AMBIGUOUS_CONSTRUCT: &str = "E0102";
pub const STRUCTURAL: &str = "E0103";

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer errors (E00xx)
                "E0001" => ("invalid character", Lexical),
                "E0002" => ("unterminated literal or comment", Lexical),
                "E0003" => ("invalid escape sequence", Lexical),
                "E0004" => ("integer suffix on a float literal", Lexical),
                "E0005" => ("malformed numeric literal", Lexical),

                // Parser errors (E01xx)
                "E0100" => ("unexpected token", Syntax),
                "E0101" => ("expected token not found", Syntax),
                "E0102" => ("ambiguous construct", Syntax),
                "E0103" => ("malformed declaration or statement", Syntax),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    /// All codes in ascending order.
    pub fn all(&self) -> Vec<&ErrorCodeInfo> {
        let mut all: Vec<_> = self.codes.values().collect();
        all.sort_by_key(|info| info.code);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_registered() {
        let registry = ErrorCodeRegistry::default();
        for code in [
            INVALID_CHARACTER,
            UNTERMINATED_LITERAL,
            INVALID_ESCAPE,
            INVALID_NUMERIC_SUFFIX,
            MALFORMED_NUMBER,
            UNEXPECTED_TOKEN,
            MISSING_TOKEN,
            AMBIGUOUS_CONSTRUCT,
            STRUCTURAL,
        ] {
            assert!(registry.get(code).is_some(), "{} not registered", code);
        }
        assert_eq!(registry.get("E0100").map(|i| i.category), Some(ErrorCategory::Syntax));
    }

    #[test]
    fn listing_is_sorted() {
        let codes: Vec<_> = ErrorCodeRegistry::default().all().iter().map(|i| i.code).collect();
        assert_eq!(codes.first(), Some(&"E0001"));
        assert_eq!(codes.last(), Some(&"E0103"));
    }
}
