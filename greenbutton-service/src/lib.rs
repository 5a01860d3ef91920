pub mod app_info;
pub mod bits;
pub mod config;
pub mod driver;
pub mod dst;
pub mod feed;
pub mod graph;
pub mod interpreters;
pub mod local_time;
pub mod observability;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod transform;

pub use driver::{EvaluationClock, FeedInterpreter};
pub use graph::{FeedGraph, Related};
pub use interpreters::{InterpretError, Interpreter, InterpreterRegistry};
pub use pipeline::{Envelope, Pipeline};
