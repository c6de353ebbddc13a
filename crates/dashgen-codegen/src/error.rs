//! Codegen error types.
//!
//! Data-level problems (unknown kinds, bad props, missing bindings) are
//! diagnostics, not errors. These variants cover broken invariants only.

use thiserror::Error;

/// Errors that can occur during code generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A plugin left a guard or branch open (or closed one it never opened).
    #[error("widget '{widget_id}' ({kind}) emitted unbalanced blocks: {detail}")]
    UnbalancedBlocks {
        widget_id: String,
        kind: String,
        detail: String,
    },

    /// Serializing the declarative tree or bundle failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// An internal consistency check failed.
    #[error("internal codegen error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CodegenError {
    fn from(e: serde_json::Error) -> Self {
        CodegenError::Serialization(e.to_string())
    }
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
