use thiserror::Error;

/// Preprocessing failures. Each renders as the one-line diagnostic the
/// driver prints before exiting; the engine attempts no recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PpError {
    #[error("Redefinition of macro '{0}' with different substitution.")]
    Redefinition(String),

    #[error("Unexpected token paste operator at beginning of line.")]
    PasteAtStart,

    #[error("Unexpected token paste operator at end of line.")]
    PasteAtEnd,

    #[error("Invalid token resulting from pasting '{left}' and '{right}'.")]
    InvalidPaste { left: String, right: String },

    #[error("Expected '{expected}', but got '{found}'.")]
    Expected {
        expected: &'static str,
        found: String,
    },

    #[error("Negative nesting depth in expansion.")]
    NegativeNesting,

    #[error("Unexpected end of input in expansion.")]
    UnexpectedEnd,

    #[error("Malformed '#{0}' directive.")]
    BadDirective(&'static str),
}
