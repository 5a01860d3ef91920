use greenbutton_model::{DataBlock, DataDescription, DataReading, Entry, IntervalBlock};
use time::OffsetDateTime;

use super::{InterpretError, Interpreter};
use crate::{
    graph::FeedGraph,
    local_time::{LocalTimeConverter, TimeConfig},
};

/// Interpreter for electricity usage points (kind 0).
///
/// Walks `UsagePoint -> MeterReading -> (ReadingType, IntervalBlock*)` and
/// flattens the interval blocks of every meter reading into one list of
/// data blocks. Reading-type fields come from the last meter reading
/// processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElectricityInterpreter;

fn to_local(clock: &LocalTimeConverter, epoch_seconds: i64, config: &TimeConfig) -> Result<OffsetDateTime, InterpretError> {
    clock
        .convert(epoch_seconds, config)
        .ok_or(InterpretError::TimestampOutOfRange(epoch_seconds))
}

impl ElectricityInterpreter {
    fn time_config(
        &self,
        usage_point: &Entry,
        graph: &FeedGraph,
        clock: &LocalTimeConverter,
    ) -> Result<TimeConfig, InterpretError> {
        let Some(related) = graph.get_related(usage_point, "LocalTimeParameters") else {
            return Ok(TimeConfig::EDT);
        };
        let params = related
            .first()
            .and_then(Entry::local_time_parameters)
            .ok_or_else(|| InterpretError::invalid_data("Missing LocalTimeParameters content"))?;

        Ok(TimeConfig::resolve(params, clock.year())?)
    }

    fn interpret_meter_reading(
        &self,
        description: &mut DataDescription,
        latest_update: &mut OffsetDateTime,
        meter_reading: &Entry,
        graph: &FeedGraph,
        config: &TimeConfig,
        clock: &LocalTimeConverter,
    ) -> Result<(), InterpretError> {
        let reading_type = graph
            .get_related(meter_reading, "ReadingType")
            .and_then(|r| r.first())
            .and_then(Entry::reading_type)
            .ok_or_else(|| InterpretError::invalid_data("Missing ReadingType data"))?;

        description.commodity = reading_type.commodity;
        description.currency = reading_type.currency;
        description.unit_of_measure = reading_type.uom;
        description.power_of_ten_multiplier = reading_type.power_of_ten_multiplier;

        let interval_blocks = graph
            .get_related(meter_reading, "IntervalBlock")
            .map(|r| r.into_vec())
            .unwrap_or_default();

        for block_entry in interval_blocks {
            if block_entry.updated > *latest_update {
                *latest_update = block_entry.updated;
            }
            let block = block_entry
                .interval_block()
                .ok_or_else(|| InterpretError::invalid_data("Missing IntervalBlock content"))?;
            description.data_blocks.push(self.data_block(block, config, clock)?);
        }

        Ok(())
    }

    fn data_block(
        &self,
        block: &IntervalBlock,
        config: &TimeConfig,
        clock: &LocalTimeConverter,
    ) -> Result<DataBlock, InterpretError> {
        let readings = block
            .readings
            .iter()
            .map(|reading| {
                Ok(DataReading {
                    start_time: to_local(clock, reading.time_period.start, config)?,
                    duration: reading.time_period.duration,
                    value: reading.value,
                    cost: reading.cost,
                })
            })
            .collect::<Result<Vec<_>, InterpretError>>()?;

        Ok(DataBlock {
            start_time: to_local(clock, block.interval.start, config)?,
            duration: block.interval.duration,
            readings,
        })
    }
}

impl Interpreter for ElectricityInterpreter {
    fn interpret(
        &self,
        usage_point: &Entry,
        graph: &FeedGraph,
        clock: &LocalTimeConverter,
    ) -> Result<DataDescription, InterpretError> {
        let mut description = DataDescription::new(usage_point.updated);

        let meter_readings = graph
            .get_related(usage_point, "MeterReading")
            .ok_or_else(|| InterpretError::invalid_data("Missing MeterReading data"))?
            .into_vec();

        let config = self.time_config(usage_point, graph, clock)?;

        let mut latest_update = description.updated;
        for meter_reading in meter_readings {
            self.interpret_meter_reading(
                &mut description,
                &mut latest_update,
                meter_reading,
                graph,
                &config,
                clock,
            )?;
        }

        description.updated = to_local(clock, latest_update.unix_timestamp(), &config)?;

        tracing::debug!(
            self_link = %usage_point.self_link,
            blocks = description.data_blocks.len(),
            readings = description.reading_count(),
            "interpreted electricity usage point"
        );

        Ok(description)
    }
}
