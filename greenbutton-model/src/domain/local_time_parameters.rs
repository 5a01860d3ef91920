/// Packed DST rule as carried by the feed, either numeric or hex text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum DstRuleValue {
    Packed(u32),
    Hex(String),
}

impl From<u32> for DstRuleValue {
    fn from(v: u32) -> Self {
        DstRuleValue::Packed(v)
    }
}

impl From<String> for DstRuleValue {
    fn from(v: String) -> Self {
        DstRuleValue::Hex(v)
    }
}

/// Content of a `LocalTimeParameters` entry. Offsets are in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalTimeParameters {
    pub tz_offset: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dst_offset: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dst_start_rule: Option<DstRuleValue>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dst_end_rule: Option<DstRuleValue>,
}

impl LocalTimeParameters {
    /// Fixed Eastern Daylight Time, no DST rules.
    pub const EDT: LocalTimeParameters = LocalTimeParameters {
        tz_offset: -14_400,
        dst_offset: 0,
        dst_start_rule: None,
        dst_end_rule: None,
    };
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn rules_deserialize_from_number_or_hex_text() {
        let params: LocalTimeParameters = serde_json::from_str(
            r#"{"tz_offset": -18000, "dst_offset": 3600, "dst_start_rule": "360E2000", "dst_end_rule": 3020824576}"#,
        )
        .unwrap();

        assert_eq!(params.dst_start_rule, Some(DstRuleValue::Hex("360E2000".to_string())));
        assert_eq!(params.dst_end_rule, Some(DstRuleValue::Packed(0xB40E_2000)));
    }

    #[test]
    fn missing_rules_default_to_none() {
        let params: LocalTimeParameters = serde_json::from_str(r#"{"tz_offset": -14400}"#).unwrap();
        assert_eq!(params, LocalTimeParameters::EDT);
    }
}
