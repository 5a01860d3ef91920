pub mod data_description;
pub mod entry;
pub mod interval_block;
pub mod local_time_parameters;
pub mod reading_type;
pub mod usage_point;

pub use data_description::{DataBlock, DataDescription, DataReading};
pub use entry::{entry_type_of, Entry, EntryPayload, MeterReading};
pub use interval_block::{Interval, IntervalBlock, IntervalReading};
pub use local_time_parameters::{DstRuleValue, LocalTimeParameters};
pub use reading_type::ReadingType;
pub use usage_point::{ServiceKind, UsagePoint};
