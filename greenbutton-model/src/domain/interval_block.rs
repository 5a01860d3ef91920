/// A time window: `start` in epoch seconds, `duration` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub duration: u32,
    pub start: i64,
}

/// A single measurement. Carries its window as an embedded `Interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalReading {
    pub time_period: Interval,
    pub value: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: Option<i64>,
}

/// Content of an `IntervalBlock` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalBlock {
    pub interval: Interval,
    #[cfg_attr(feature = "serde", serde(default))]
    pub readings: Vec<IntervalReading>,
}
