pub mod electricity;
pub mod registry;

pub use electricity::ElectricityInterpreter;
pub use registry::InterpreterRegistry;

use greenbutton_model::{DataDescription, Entry};

use crate::{dst::DstRuleError, graph::FeedGraph, local_time::LocalTimeConverter};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    #[error("invalid GreenButton data: {message} (unsupported kinds: {unsupported_kinds:?})")]
    InvalidData {
        message: String,
        unsupported_kinds: Vec<u32>,
    },
    #[error("invalid DST rule: {0}")]
    InvalidDstRule(#[from] DstRuleError),
    #[error("timestamp {0} is out of range after local time conversion")]
    TimestampOutOfRange(i64),
}

impl InterpretError {
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        InterpretError::InvalidData {
            message: message.into(),
            unsupported_kinds: Vec::new(),
        }
    }

    /// Attaches the unsupported kinds seen so far to an `InvalidData` error.
    pub fn with_unsupported_kinds(self, kinds: &[u32]) -> Self {
        match self {
            InterpretError::InvalidData { message, .. } => InterpretError::InvalidData {
                message,
                unsupported_kinds: kinds.to_vec(),
            },
            other => other,
        }
    }
}

/// Turns one `UsagePoint` entry into a [`DataDescription`], resolving the
/// rest of its hierarchy through the feed graph.
pub trait Interpreter: Send + Sync {
    fn interpret(
        &self,
        usage_point: &Entry,
        graph: &FeedGraph,
        clock: &LocalTimeConverter,
    ) -> Result<DataDescription, InterpretError>;
}
