// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser configuration.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceLevel {
    #[default]
    None,
    /// Emit a `tracing` event on entry to every production.
    Verbose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    pub trace_level: TraceLevel,
    /// Keep parsing after a syntax error. When false the parse stops at the
    /// first error and returns what it has built so far.
    pub recover_on_error: bool,
    /// Tab stop used for column numbers.
    pub tab_width: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            trace_level: TraceLevel::None,
            recover_on_error: true,
            tab_width: 4,
        }
    }
}
