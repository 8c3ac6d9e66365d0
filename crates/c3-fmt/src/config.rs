// SPDX-License-Identifier: (MIT OR Apache-2.0)

/// Pretty printer settings.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Spaces per nesting level.
    pub indent_width: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

/// S-expression dump settings.
#[derive(Debug, Clone, Default)]
pub struct DumpConfig {
    /// Suffix every node head with `@line:col`.
    pub spans: bool,
}
