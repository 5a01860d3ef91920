use std::sync::Arc;

use greenbutton_model::DataDescription;
use time::OffsetDateTime;

use crate::{
    app_info::ApplicationInformation,
    feed::FeedDocument,
    graph::FeedGraph,
    interpreters::{InterpretError, InterpreterRegistry},
    local_time::LocalTimeConverter,
};

/// Moment DST applicability is judged against.
#[derive(Debug, Clone, Copy, Default)]
pub enum EvaluationClock {
    /// Wall clock at the start of each feed's interpretation.
    #[default]
    System,
    Fixed(OffsetDateTime),
}

impl EvaluationClock {
    pub fn now(&self) -> OffsetDateTime {
        match self {
            EvaluationClock::System => OffsetDateTime::now_utc(),
            EvaluationClock::Fixed(at) => *at,
        }
    }
}

/// Interprets every usage point of a feed through the registered
/// interpreters.
#[derive(Clone)]
pub struct FeedInterpreter {
    registry: Arc<InterpreterRegistry>,
    app_info: Arc<dyn ApplicationInformation>,
    clock: EvaluationClock,
}

impl FeedInterpreter {
    pub fn new(registry: Arc<InterpreterRegistry>, app_info: Arc<dyn ApplicationInformation>) -> Self {
        Self {
            registry,
            app_info,
            clock: EvaluationClock::System,
        }
    }

    pub fn with_clock(mut self, clock: EvaluationClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn interpret_document(&self, feed: FeedDocument) -> Result<Vec<DataDescription>, InterpretError> {
        let user_id = feed.user_id.clone();
        let graph = FeedGraph::build(feed.into_entries());
        self.interpret(&graph, user_id.as_deref())
    }

    /// Interprets each `UsagePoint` in the feed.
    ///
    /// Usage points whose kind has no interpreter are skipped; the call only
    /// fails on them when nothing else in the feed could be interpreted. Any
    /// error raised by an interpreter aborts the whole feed.
    pub fn interpret(&self, graph: &FeedGraph, user_id: Option<&str>) -> Result<Vec<DataDescription>, InterpretError> {
        let clock = LocalTimeConverter::new(self.clock.now());
        let custodian = self.app_info.data_custodian_id();

        let mut descriptions = Vec::new();
        let mut unsupported_kinds = Vec::new();

        for entry in graph.entries_of_type("UsagePoint") {
            let kind = entry
                .usage_point()
                .map(|u| u.kind)
                .ok_or_else(|| {
                    InterpretError::invalid_data("Missing UsagePoint content").with_unsupported_kinds(&unsupported_kinds)
                })?;

            let Some(interpreter) = self.registry.lookup(kind) else {
                tracing::debug!(kind, self_link = %entry.self_link, "no interpreter registered for usage point kind");
                metrics::counter!("usage_points_unsupported_kind_total").increment(1);
                unsupported_kinds.push(kind);
                continue;
            };

            let mut description = interpreter
                .interpret(entry, graph, &clock)
                .map_err(|e| e.with_unsupported_kinds(&unsupported_kinds))?;

            description.custodian = custodian.clone();
            if let Some(user_id) = user_id {
                description.user_id = Some(user_id.to_string());
            }

            metrics::counter!("usage_points_interpreted_total").increment(1);
            descriptions.push(description);
        }

        if descriptions.is_empty() && !unsupported_kinds.is_empty() {
            tracing::warn!(?unsupported_kinds, "feed contains only unsupported usage point kinds");
            return Err(InterpretError::InvalidData {
                message: format!(
                    "Received unsupported GreenButton data {unsupported_kinds:?}. Supported kinds: {:?}",
                    self.registry.kinds()
                ),
                unsupported_kinds,
            });
        }

        Ok(descriptions)
    }
}
