use crate::domain::health::HealthStatus;
use serde::{Deserialize, Serialize};

/// 從 stdin 讀入的生命徵象資料，內容對本程式不透明，原樣轉送
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VitalsPayload(pub serde_json::Value);

impl VitalsPayload {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayOutput {
    pub result: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<HealthStatus>,
}

impl RelayOutput {
    pub fn new(result: serde_json::Value) -> Self {
        Self {
            result,
            status: None,
        }
    }
}
