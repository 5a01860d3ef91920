use greenbutton_model::LocalTimeParameters;
use time::OffsetDateTime;

use crate::dst::{transition_instant, DstRuleError};

/// `LocalTimeParameters` with both DST rules resolved for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeConfig {
    pub tz_offset: i64,
    pub dst_offset: i64,
    pub dst_start: Option<OffsetDateTime>,
    pub dst_end: Option<OffsetDateTime>,
}

impl TimeConfig {
    /// Fixed EDT (UTC-4), no DST window. Used when a usage point has no
    /// `LocalTimeParameters`.
    pub const EDT: TimeConfig = TimeConfig {
        tz_offset: -14_400,
        dst_offset: 0,
        dst_start: None,
        dst_end: None,
    };

    pub fn resolve(params: &LocalTimeParameters, year: i32) -> Result<Self, DstRuleError> {
        let dst_start = match &params.dst_start_rule {
            Some(rule) => transition_instant(rule, year)?,
            None => None,
        };
        let dst_end = match &params.dst_end_rule {
            Some(rule) => transition_instant(rule, year)?,
            None => None,
        };

        Ok(Self {
            tz_offset: params.tz_offset,
            dst_offset: params.dst_offset,
            dst_start,
            dst_end,
        })
    }

    /// Whether `moment` falls inside the DST window, bounds included. An
    /// incomplete window never applies.
    pub fn dst_active_at(&self, moment: OffsetDateTime) -> bool {
        match (self.dst_start, self.dst_end) {
            (Some(start), Some(end)) => start <= moment && moment <= end,
            _ => false,
        }
    }
}

/// Converts epoch seconds to local timestamps.
///
/// DST is applied according to the evaluation moment the converter was
/// created with, not the timestamp being converted; every value converted
/// in one run gets the same DST correction.
#[derive(Debug, Clone, Copy)]
pub struct LocalTimeConverter {
    evaluated_at: OffsetDateTime,
}

impl LocalTimeConverter {
    pub fn new(evaluated_at: OffsetDateTime) -> Self {
        Self { evaluated_at }
    }

    pub fn system() -> Self {
        Self::new(OffsetDateTime::now_utc())
    }

    pub fn evaluated_at(&self) -> OffsetDateTime {
        self.evaluated_at
    }

    /// Calendar year DST rules are resolved against.
    pub fn year(&self) -> i32 {
        self.evaluated_at.year()
    }

    /// Shifted instant for `epoch_seconds`: the timezone offset, plus the
    /// DST offset when the evaluation moment is inside the DST window.
    /// `None` if the result is not representable.
    pub fn convert(&self, epoch_seconds: i64, config: &TimeConfig) -> Option<OffsetDateTime> {
        let mut local = epoch_seconds.checked_add(config.tz_offset)?;
        if config.dst_active_at(self.evaluated_at) {
            local = local.checked_add(config.dst_offset)?;
        }
        OffsetDateTime::from_unix_timestamp(local).ok()
    }
}
