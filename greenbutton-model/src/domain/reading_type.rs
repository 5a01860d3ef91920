/// Content of a `ReadingType` entry. Values are recorded as-is; the
/// multiplier is never applied to readings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadingType {
    #[cfg_attr(feature = "serde", serde(default))]
    pub commodity: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub currency: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub uom: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub power_of_ten_multiplier: Option<i32>,
}
