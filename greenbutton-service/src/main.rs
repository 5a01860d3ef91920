use anyhow::{bail, Result};
use futures::Stream;
use greenbutton_model::DataDescription;
use greenbutton_service::{
    app_info::StaticApplicationInformation,
    config::{AppConfig, OutputFormat},
    driver::{EvaluationClock, FeedInterpreter},
    feed::FeedDocument,
    interpreters::registry,
    observability,
    pipeline::{Envelope, EnvelopeStream, Pipeline, PipelineError, Sink, Source},
    sinks::{CsvSink, NdjsonSink, OutputTarget},
    sources::{FeedFileSource, FeedNdjsonSource},
    transform,
};
use std::{env, path::Path, sync::Arc};

enum FeedSource {
    Json(FeedFileSource),
    Ndjson(FeedNdjsonSource),
}

#[async_trait::async_trait]
impl Source<FeedDocument> for FeedSource {
    async fn stream(&self) -> EnvelopeStream<FeedDocument> {
        match self {
            Self::Json(s) => s.stream().await,
            Self::Ndjson(s) => s.stream().await,
        }
    }
}

enum OutputSink {
    Ndjson(NdjsonSink),
    Csv(CsvSink),
}

#[async_trait::async_trait]
impl Sink<DataDescription> for OutputSink {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<DataDescription>, PipelineError>> + Send + Unpin + 'static,
    {
        match self {
            Self::Ndjson(s) => s.run(input).await,
            Self::Csv(s) => s.run(input).await,
        }
    }
}

/// Interprets decoded GreenButton feeds into data descriptions.
///
/// Usage:
///   greenbutton-service <feed.json | feeds.ndjson> [user_id]
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: greenbutton-service <feed_file> [user_id]");
    }
    let feed_path = Path::new(&args[1]);
    let user_id = args.get(2).cloned();

    let cfg = AppConfig::load()?;

    let clock = match cfg.interpretation.evaluated_at {
        Some(at) => EvaluationClock::Fixed(at),
        None => EvaluationClock::System,
    };
    let interpreter = FeedInterpreter::new(
        registry::global(),
        Arc::new(StaticApplicationInformation::new(
            cfg.application_information.data_custodian_id.clone(),
        )),
    )
    .with_clock(clock);

    let source = match feed_path.extension().and_then(|e| e.to_str()) {
        Some("ndjson") | Some("jsonl") => {
            if user_id.is_some() {
                tracing::warn!("user_id argument is ignored for ndjson input");
            }
            FeedSource::Ndjson(FeedNdjsonSource::new(feed_path))
        }
        _ => FeedSource::Json(FeedFileSource::new(feed_path).with_user_id(user_id)),
    };

    let target = OutputTarget::from_path(cfg.output.path.clone());
    let sink = match cfg.output.format {
        OutputFormat::Ndjson => OutputSink::Ndjson(NdjsonSink::new(target, cfg.output.batch_size)),
        OutputFormat::Csv => OutputSink::Csv(CsvSink::new(target, cfg.output.batch_size)),
    };

    let pipeline = Pipeline {
        source,
        transforms: vec![Arc::new(transform::FeedValidation)],
        interpreter: Arc::new(interpreter),
        sink,
    };

    pipeline.run().await?;

    Ok(())
}
