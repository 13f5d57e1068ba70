//! Diagnostic accumulator threaded through the scan, parse and resolve passes.
//!
//! Every phase reports into the same `Diagnostics` value instead of flipping
//! process-wide flags.  The driver inspects it between phases to decide
//! whether to continue, and drains [`Diagnostics::errors`] to stderr.

use log::debug;

use crate::error::LoxError;

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<LoxError>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a static (lexical, syntax or resolution) error.
    pub fn report(&mut self, error: LoxError) {
        debug!("Static error reported: {}", error);

        self.had_error = true;
        self.errors.push(error);
    }

    /// Record the runtime error that aborted execution.
    pub fn report_runtime(&mut self, error: LoxError) {
        debug!("Runtime error reported: {}", error);

        self.had_runtime_error = true;
        self.errors.push(error);
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// All reported errors, in report order.
    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    /// Rendered messages, one per reported error.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Forget everything reported so far (used between REPL lines).
    pub fn clear(&mut self) {
        self.errors.clear();
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_and_runtime_flags_are_independent() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(LoxError::lex(2, "Unexpected character: @"));

        assert!(diagnostics.had_error());
        assert!(!diagnostics.had_runtime_error());
        assert_eq!(
            diagnostics.messages(),
            vec!["[line 2] Error: Unexpected character: @".to_string()]
        );

        diagnostics.clear();
        assert!(!diagnostics.had_error());
        assert!(diagnostics.errors().is_empty());
    }
}
