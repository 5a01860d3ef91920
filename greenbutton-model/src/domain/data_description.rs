use time::OffsetDateTime;

/// Normalized description of one usage point: reading-type metadata plus
/// the interval data found under its meter readings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataDescription {
    pub custodian: Option<String>,
    pub user_id: Option<String>,
    pub commodity: Option<i32>,
    pub currency: Option<i32>,
    pub unit_of_measure: Option<i32>,
    pub power_of_ten_multiplier: Option<i32>,
    /// Local time of the most recent update seen for this usage point.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub updated: OffsetDateTime,
    pub data_blocks: Vec<DataBlock>,
}

impl DataDescription {
    pub fn new(updated: OffsetDateTime) -> Self {
        Self {
            custodian: None,
            user_id: None,
            commodity: None,
            currency: None,
            unit_of_measure: None,
            power_of_ten_multiplier: None,
            updated,
            data_blocks: Vec::new(),
        }
    }

    pub fn reading_count(&self) -> usize {
        self.data_blocks.iter().map(|b| b.readings.len()).sum()
    }
}

/// One interval block, with its start converted to local time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataBlock {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub start_time: OffsetDateTime,
    pub duration: u32,
    pub readings: Vec<DataReading>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataReading {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub start_time: OffsetDateTime,
    pub duration: u32,
    pub value: i64,
    pub cost: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn reading_count_spans_all_blocks() {
        let ts = datetime!(2024-01-01 00:00:00 UTC);
        let reading = DataReading {
            start_time: ts,
            duration: 900,
            value: 12,
            cost: None,
        };
        let mut description = DataDescription::new(ts);
        description.data_blocks.push(DataBlock {
            start_time: ts,
            duration: 3600,
            readings: vec![reading.clone(), reading.clone()],
        });
        description.data_blocks.push(DataBlock {
            start_time: ts,
            duration: 3600,
            readings: vec![reading],
        });

        assert_eq!(description.reading_count(), 3);
        assert!(description.custodian.is_none());
    }
}
