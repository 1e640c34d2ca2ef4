//! Subcommand implementations.

pub mod cart;
pub mod catalog;

/// Text produced by a command and whether it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Text to print.
    pub text: String,
    /// Whether the process should exit successfully.
    pub success: bool,
}

impl Output {
    /// Successful output.
    #[must_use]
    pub const fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}
