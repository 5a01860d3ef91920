/// Content of a `UsagePoint` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsagePoint {
    pub kind: u32,
}

/// The ESPI `ServiceKind` enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Electricity,
    Gas,
    Water,
    Time,
    Heat,
    Refuse,
    Sewerage,
    Rates,
    TvLicence,
    Internet,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 10] = [
        ServiceKind::Electricity,
        ServiceKind::Gas,
        ServiceKind::Water,
        ServiceKind::Time,
        ServiceKind::Heat,
        ServiceKind::Refuse,
        ServiceKind::Sewerage,
        ServiceKind::Rates,
        ServiceKind::TvLicence,
        ServiceKind::Internet,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Name used by the ESPI schema for this kind.
    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Electricity => "electricity",
            ServiceKind::Gas => "gas",
            ServiceKind::Water => "water",
            ServiceKind::Time => "time",
            ServiceKind::Heat => "heat",
            ServiceKind::Refuse => "refuse",
            ServiceKind::Sewerage => "sewerage",
            ServiceKind::Rates => "rates",
            ServiceKind::TvLicence => "tvLicence",
            ServiceKind::Internet => "internet",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_schema_order() {
        assert_eq!(ServiceKind::from_code(0), Some(ServiceKind::Electricity));
        assert_eq!(ServiceKind::from_code(8).map(ServiceKind::name), Some("tvLicence"));
        assert_eq!(ServiceKind::Internet.code(), 9);
        assert_eq!(ServiceKind::from_code(10), None);
    }
}
