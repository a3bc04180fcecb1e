use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A remote inference service reachable by a fixed endpoint id.
///
/// `call` performs exactly one logical request/response exchange; the
/// transport behind it is up to the implementation.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn call(
        &self,
        endpoint_id: &str,
        operation: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value>;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn operation(&self) -> &str;
    fn api_prefix(&self) -> &str;
    fn timeout(&self) -> Option<Duration>;
    fn user_agent(&self) -> Option<&str>;
    fn health_status(&self) -> bool;
}
