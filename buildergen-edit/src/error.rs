//! Error types for buildergen-edit.
//!
//! Exit code 2 is reserved for policy blocks (stale plan, read-only store); conflicts and
//! runtime failures map to 1.

use buildergen_types::decl::DeclPath;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("policy block: {0}")]
    PolicyBlock(#[from] PolicyBlockError),

    /// An op could not be applied; the whole transaction was abandoned.
    #[error("conflict in op {op_id}: {source}")]
    Conflict {
        op_id: String,
        #[source]
        source: ConflictError,
    },

    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyBlockError {
    /// The target class changed (or vanished) since the plan was made.
    #[error("precondition mismatch on `{target}`: expected {expected}, found {actual}")]
    PreconditionMismatch {
        target: DeclPath,
        expected: String,
        actual: String,
    },

    #[error("read-only: {message}")]
    ReadOnly { message: String },
}

/// Structural conflicts between an op and the tree it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("class `{target}` does not exist")]
    MissingTarget { target: DeclPath },

    #[error("`{target}` already declares nested type `{name}`")]
    DuplicateNestedType { target: DeclPath, name: String },

    #[error("`{target}` already declares field `{name}`")]
    DuplicateField { target: DeclPath, name: String },

    #[error("`{target}` already declares method `{signature}`")]
    DuplicateMethod { target: DeclPath, signature: String },

    #[error("`{target}` already declares constructor ({params})")]
    DuplicateConstructor { target: DeclPath, params: String },

    #[error("`{target}` has no constructor ({params}) to delete")]
    NoMatchingConstructor { target: DeclPath, params: String },
}

impl EditError {
    pub fn is_policy_block(&self) -> bool {
        matches!(self, EditError::PolicyBlock(_))
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            EditError::PolicyBlock(_) => 2,
            EditError::Conflict { .. } | EditError::Runtime(_) => 1,
        }
    }
}

pub type EditResult<T> = Result<T, EditError>;
