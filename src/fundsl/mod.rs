//! fun-dsl: keyword-only function calls embedded in templates.
//!
//! A call looks like `line(y=[1, 2, 3], title=report.name)`. Values are
//! literals, lists, tuples, dicts or context lookups; there is no control
//! flow or arithmetic. Parsing and evaluation are split so that the
//! preprocessor can report which stage failed.
//!
//! ```text
//! source ──tokenize──► tokens ──parse──► CallExpr ──evaluate(Context)──► Call
//! ```

pub mod ast;
pub mod eval;
pub mod parser;
pub mod token;
pub mod value;

pub use ast::{CallExpr, Expr};
pub use eval::{Call, Evaluator};
pub use parser::{parse_call, parse_value};
pub use value::{Accessible, Context, ContextShapeError, KwArgs, Map, Value};

use thiserror::Error;

/// Failure while turning one call source into a dispatched result.
#[derive(Debug, Error)]
pub enum DslError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },

    #[error("variable `{0}` not found in context")]
    VariableNotFound(String),

    #[error("`{path}` has no attribute `{attr}`")]
    AttributeNotFound { path: String, attr: String },

    #[error("function `{0}` not found")]
    FunctionNotFound(String),

    #[error("`{function}` failed: {source}")]
    Evaluation {
        function: String,
        #[source]
        source: CallError,
    },
}

/// Failure reported by a host callable.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("missing argument `{0}`")]
    MissingArgument(String),

    #[error("argument `{name}` must be {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Custom(String),

    /// Typed failure of the host, kept for downcasting.
    #[error(transparent)]
    Host(Box<dyn std::error::Error + Send + Sync>),
}

impl CallError {
    pub fn mismatch(name: &str, expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            name: name.to_owned(),
            expected,
            found: found.type_name(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}
