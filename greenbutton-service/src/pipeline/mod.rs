use std::{
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::SystemTime,
};

use futures::{Stream, StreamExt};
use greenbutton_model::DataDescription;

use crate::{driver::FeedInterpreter, feed::FeedDocument, interpreters::InterpretError};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
}

impl<T> Envelope<T> {
    pub fn now(payload: T) -> Self {
        Self {
            payload,
            received_at: SystemTime::now(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("interpretation error: {0}")]
    Interpret(#[from] InterpretError),
    #[error("sink error: {0}")]
    Sink(String),
    #[error("{0} feed(s) failed")]
    FeedsFailed(u64),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

/// Feeds from `source`, through the feed transforms and the interpreter,
/// into `sink` as one envelope per data description.
pub struct Pipeline<S, K> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<FeedDocument, FeedDocument> + Send + Sync>>, // same-type transforms chain
    pub interpreter: Arc<FeedInterpreter>,
    pub sink: K,
}

impl<S, K> Pipeline<S, K>
where
    S: Source<FeedDocument> + Send + Sync + 'static,
    K: Sink<DataDescription> + Send + Sync + 'static,
{
    /// Runs to completion. A feed that fails is logged by the sink and
    /// counted; the run still processes the remaining feeds and then
    /// reports [`PipelineError::FeedsFailed`].
    pub async fn run(self) -> Result<(), PipelineError> {
        let mut stream = self.source.stream().await;

        // Apply transforms in sequence (if any).
        for t in self.transforms {
            let t_arc = t.clone();
            stream = Box::pin(stream.then(move |item| {
                let t_inner = t_arc.clone();
                async move {
                    match item {
                        Ok(env) => t_inner.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        let failed = Arc::new(AtomicU64::new(0));
        let failed_in_stream = failed.clone();
        let interpreter = self.interpreter;

        let described = async_stream::stream! {
            while let Some(item) = stream.next().await {
                let env = match item {
                    Ok(env) => env,
                    Err(e) => {
                        failed_in_stream.fetch_add(1, Ordering::Relaxed);
                        yield Err(e);
                        continue;
                    }
                };

                let received_at = env.received_at;
                match interpreter.interpret_document(env.payload) {
                    Ok(descriptions) => {
                        tracing::info!(descriptions = descriptions.len(), "feed interpreted");
                        for description in descriptions {
                            yield Ok(Envelope { payload: description, received_at });
                        }
                    }
                    Err(e) => {
                        failed_in_stream.fetch_add(1, Ordering::Relaxed);
                        yield Err(PipelineError::from(e));
                    }
                }
            }
        };

        self.sink.run(Box::pin(described)).await?;

        match failed.load(Ordering::Relaxed) {
            0 => Ok(()),
            n => Err(PipelineError::FeedsFailed(n)),
        }
    }
}
