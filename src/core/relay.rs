use crate::core::output::render_line;
use crate::core::{ConfigProvider, RelayOutput, RemoteClient, VitalsPayload};
use crate::domain::health::HealthStatus;
use crate::utils::error::{RelayError, Result};
use std::io::{Read, Write};

/// stdin -> parse -> remote call -> `{"result": ...}` -> stdout
pub struct VitalsRelay<C: RemoteClient> {
    client: C,
    endpoint_id: String,
    operation: String,
    health_status: bool,
}

impl<C: RemoteClient> VitalsRelay<C> {
    pub fn new(client: C, endpoint_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_id: endpoint_id.into(),
            operation: operation.into(),
            health_status: false,
        }
    }

    pub fn from_config<P: ConfigProvider>(client: C, config: &P) -> Self {
        Self::new(client, config.endpoint(), config.operation())
            .with_health_status(config.health_status())
    }

    pub fn with_health_status(mut self, enabled: bool) -> Self {
        self.health_status = enabled;
        self
    }

    pub fn parse_input(input: &str) -> Result<VitalsPayload> {
        serde_json::from_str(input)
            .map(VitalsPayload)
            .map_err(|e| RelayError::invalid_input(format!("stdin is not valid JSON: {}", e)))
    }

    /// 解析輸入並呼叫遠端一次
    pub async fn relay(&self, input: &str) -> Result<RelayOutput> {
        let payload = Self::parse_input(input)?;

        tracing::info!("Calling {} on {}", self.operation, self.endpoint_id);
        let result = self
            .client
            .call(&self.endpoint_id, &self.operation, payload.into_inner())
            .await?;
        tracing::debug!("Remote call returned: {}", result);

        let status = match (&result, self.health_status) {
            (serde_json::Value::String(text), true) => Some(HealthStatus::parse(text)),
            (_, true) => {
                tracing::warn!("Health status parsing skipped: result is not a string");
                None
            }
            _ => None,
        };

        Ok(RelayOutput { result, status })
    }

    /// 完整流程；輸出先整行組好再寫入，失敗時不會留下部分輸出
    pub async fn run<R: Read, W: Write>(&self, mut reader: R, mut writer: W) -> Result<()> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| RelayError::invalid_input(format!("Failed to read stdin: {}", e)))?;
        let input = String::from_utf8(bytes)
            .map_err(|e| RelayError::invalid_input(format!("stdin is not valid UTF-8: {}", e)))?;

        let output = self.relay(&input).await?;
        let line = render_line(&output)?;

        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}
