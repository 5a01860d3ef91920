use std::collections::HashSet;

use greenbutton_model::entry_type_of;

use crate::{
    feed::FeedDocument,
    pipeline::{Envelope, PipelineError, Transform},
};

/// Pure structural validation of a decoded feed.
///
/// Rules:
/// - every entry's self-link is unique within the feed.
/// - every self-link carries an inferable entry type.
pub fn validate_feed(env: Envelope<FeedDocument>) -> Result<Envelope<FeedDocument>, PipelineError> {
    let mut seen = HashSet::with_capacity(env.payload.entries.len());

    for record in &env.payload.entries {
        if entry_type_of(&record.self_link).is_none() {
            return Err(PipelineError::Transform(format!(
                "entry type cannot be inferred from '{}'",
                record.self_link
            )));
        }
        if !seen.insert(record.self_link.as_str()) {
            return Err(PipelineError::Transform(format!(
                "duplicate self link '{}'",
                record.self_link
            )));
        }
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct FeedValidation;

#[async_trait::async_trait]
impl Transform<FeedDocument, FeedDocument> for FeedValidation {
    async fn apply(&self, input: Envelope<FeedDocument>) -> Result<Envelope<FeedDocument>, PipelineError> {
        match validate_feed(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("feed_validation_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}
