/// Source of the third-party application information that accompanies
/// every feed, fetched independently of the feed itself.
pub trait ApplicationInformation: Send + Sync {
    fn data_custodian_id(&self) -> Option<String>;
}

/// Application information fixed at startup, typically from config.
#[derive(Debug, Clone, Default)]
pub struct StaticApplicationInformation {
    data_custodian_id: Option<String>,
}

impl StaticApplicationInformation {
    pub fn new<S: Into<String>>(data_custodian_id: S) -> Self {
        Self {
            data_custodian_id: Some(data_custodian_id.into()),
        }
    }
}

impl ApplicationInformation for StaticApplicationInformation {
    fn data_custodian_id(&self) -> Option<String> {
        self.data_custodian_id.clone()
    }
}
