use futures::StreamExt;
use greenbutton_model::DataDescription;
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::io::AsyncWriteExt;

use super::{record_encode_failure, record_flush, OutputTarget, OutputWriter};
use crate::pipeline::{Envelope, PipelineError, Sink};

/// One row per interval reading, carrying its block and description context.
#[derive(Debug, Serialize)]
struct ReadingRow<'a> {
    custodian: Option<&'a str>,
    user_id: Option<&'a str>,
    commodity: Option<i32>,
    currency: Option<i32>,
    unit_of_measure: Option<i32>,
    power_of_ten_multiplier: Option<i32>,
    block_start: String,
    block_duration: u32,
    reading_start: String,
    reading_duration: u32,
    value: i64,
    cost: Option<i64>,
}

fn format_ts(ts: OffsetDateTime) -> Result<String, PipelineError> {
    ts.format(&Rfc3339)
        .map_err(|e| PipelineError::Sink(format!("failed to format timestamp: {e}")))
}

/// Flattens data descriptions into CSV reading rows.
pub struct CsvSink {
    target: OutputTarget,
    batch_size: usize,
}

impl CsvSink {
    pub fn new(target: OutputTarget, batch_size: usize) -> Self {
        Self {
            target,
            batch_size: batch_size.max(1),
        }
    }

    /// One row per reading of `d`. Fails as a whole if any timestamp cannot
    /// be formatted, so a description is never written partially.
    fn rows<'a>(d: &'a DataDescription) -> Result<Vec<ReadingRow<'a>>, PipelineError> {
        let mut rows = Vec::with_capacity(d.reading_count());
        for block in &d.data_blocks {
            let block_start = format_ts(block.start_time)?;
            for reading in &block.readings {
                rows.push(ReadingRow {
                    custodian: d.custodian.as_deref(),
                    user_id: d.user_id.as_deref(),
                    commodity: d.commodity,
                    currency: d.currency,
                    unit_of_measure: d.unit_of_measure,
                    power_of_ten_multiplier: d.power_of_ten_multiplier,
                    block_start: block_start.clone(),
                    block_duration: block.duration,
                    reading_start: format_ts(reading.start_time)?,
                    reading_duration: reading.duration,
                    value: reading.value,
                    cost: reading.cost,
                });
            }
        }
        Ok(rows)
    }

    /// Encodes the batch. The csv writer emits the header together with the
    /// first serialized row, so `with_header` only takes effect once a row is
    /// written; the returned row count tells the caller whether it did.
    fn encode_batch(
        &self,
        batch: &[Envelope<DataDescription>],
        with_header: bool,
    ) -> Result<EncodedBatch, PipelineError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(with_header)
            .from_writer(Vec::new());
        let mut descriptions = 0;
        let mut rows_written = 0;

        for env in batch {
            let rows = match Self::rows(&env.payload) {
                Ok(rows) => rows,
                Err(e) => {
                    record_encode_failure("csv", &e);
                    continue;
                }
            };
            for row in rows {
                wtr.serialize(row)
                    .map_err(|e| PipelineError::Sink(format!("failed to encode csv row: {e}")))?;
                rows_written += 1;
            }
            descriptions += 1;
        }

        let payload = wtr
            .into_inner()
            .map_err(|e| PipelineError::Sink(format!("failed to finish csv batch: {e}")))?;

        Ok(EncodedBatch {
            payload,
            descriptions,
            rows: rows_written,
        })
    }

    /// Writes one batch and returns the number of rows it produced.
    async fn flush_batch(
        &self,
        writer: &mut OutputWriter,
        batch: &[Envelope<DataDescription>],
        with_header: bool,
    ) -> Result<usize, PipelineError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let encoded = self.encode_batch(batch, with_header)?;
        if !encoded.payload.is_empty() {
            writer
                .write_all(&encoded.payload)
                .await
                .map_err(|e| PipelineError::Sink(format!("csv write failed: {e}")))?;
            writer
                .flush()
                .await
                .map_err(|e| PipelineError::Sink(format!("csv flush failed: {e}")))?;
        }

        record_flush(batch, encoded.descriptions, encoded.payload.len());
        Ok(encoded.rows)
    }
}

struct EncodedBatch {
    payload: Vec<u8>,
    descriptions: usize,
    rows: usize,
}

#[async_trait::async_trait]
impl Sink<DataDescription> for CsvSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<DataDescription>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut writer = self.target.open().await?;
        let mut buffer: Vec<Envelope<DataDescription>> = Vec::with_capacity(self.batch_size);
        let mut header_pending = true;

        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for CsvSink");
                    continue;
                }
            };

            buffer.push(env);
            if buffer.len() >= self.batch_size {
                if self.flush_batch(&mut writer, &buffer, header_pending).await? > 0 {
                    header_pending = false;
                }
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            self.flush_batch(&mut writer, &buffer, header_pending).await?;
        }

        let _ = writer.shutdown().await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenbutton_model::{DataBlock, DataReading};
    use time::macros::datetime;

    fn description() -> DataDescription {
        let ts = datetime!(2024-01-01 00:00:00 UTC);
        let mut d = DataDescription::new(ts);
        d.custodian = Some("cust".to_string());
        d.unit_of_measure = Some(72);
        d.data_blocks.push(DataBlock {
            start_time: ts,
            duration: 7200,
            readings: vec![
                DataReading {
                    start_time: ts,
                    duration: 3600,
                    value: 10,
                    cost: Some(2),
                },
                DataReading {
                    start_time: datetime!(2024-01-01 01:00:00 UTC),
                    duration: 3600,
                    value: 11,
                    cost: None,
                },
            ],
        });
        d
    }

    #[tokio::test]
    async fn writes_header_once_and_one_row_per_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::new(OutputTarget::File(path.clone()), 1);

        let input = futures::stream::iter(vec![Ok(Envelope::now(description())), Ok(Envelope::now(description()))]);
        sink.run(input).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("custodian,user_id,commodity"));
        assert_eq!(
            lines[1],
            "cust,,,,72,,2024-01-01T00:00:00Z,7200,2024-01-01T00:00:00Z,3600,10,2"
        );
        assert!(lines[2].ends_with(",3600,11,"));
        assert!(!lines[3].starts_with("custodian"));
    }

    #[tokio::test]
    async fn header_waits_for_first_row_when_leading_description_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::new(OutputTarget::File(path.clone()), 1);

        let empty = DataDescription::new(datetime!(2024-01-01 00:00:00 UTC));
        let input = futures::stream::iter(vec![Ok(Envelope::now(empty)), Ok(Envelope::now(description()))]);
        sink.run(input).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("custodian,user_id,commodity"));
        assert!(lines[1].starts_with("cust,"));
    }

    #[tokio::test]
    async fn description_with_unformattable_timestamp_is_skipped_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::new(OutputTarget::File(path.clone()), 8);

        // First reading formats fine, the second does not.
        let mut bad = description();
        bad.custodian = Some("bad".to_string());
        bad.data_blocks[0].readings[1].start_time = time::Date::from_calendar_date(-1, time::Month::January, 1)
            .unwrap()
            .midnight()
            .assume_utc();

        let input = futures::stream::iter(vec![Ok(Envelope::now(bad)), Ok(Envelope::now(description()))]);
        sink.run(input).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("custodian,"));
        assert!(lines[1..].iter().all(|l| l.starts_with("cust,")));
    }
}
