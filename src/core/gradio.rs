use crate::core::{ConfigProvider, RemoteClient};
use crate::utils::error::{RelayError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_PREFIX: &str = "/gradio_api";

const DEFAULT_USER_AGENT: &str = concat!("vitals-relay/", env!("CARGO_PKG_VERSION"));

/// Gradio app 回報例外但沒有開啟 show_error 時的訊息
const UPSTREAM_ERROR_MESSAGE: &str =
    "The upstream Gradio app has raised an exception but has not enabled verbose error reporting";

/// `RemoteClient` over the Gradio HTTP call API.
///
/// A prediction is two requests: `POST {prefix}/call/{operation}` returns an
/// `event_id`, then `GET {prefix}/call/{operation}/{event_id}` streams
/// server-sent events until `complete` or `error`.
pub struct GradioClient {
    client: Client,
    api_prefix: String,
    timeout: Option<Duration>,
}

impl GradioClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent().unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .map_err(|e| RelayError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_prefix: normalize_prefix(config.api_prefix()),
            timeout: config.timeout(),
        })
    }

    pub fn with_api_prefix(mut self, api_prefix: &str) -> Self {
        self.api_prefix = normalize_prefix(api_prefix);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 將 endpoint id 轉成 base URL
    ///
    /// 完整的 http(s) URL 直接使用；`owner/name` 形式的 Space id 對應到
    /// `https://owner-name.hf.space`。
    pub fn resolve_base_url(endpoint_id: &str) -> Result<Url> {
        let endpoint_id = endpoint_id.trim();

        let lowered = endpoint_id.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return Url::parse(endpoint_id).map_err(|e| RelayError::InvalidConfigValueError {
                field: "endpoint".to_string(),
                value: endpoint_id.to_string(),
                reason: format!("Invalid URL format: {}", e),
            });
        }

        match endpoint_id.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                let subdomain = format!("{}-{}", owner, name)
                    .to_lowercase()
                    .replace(['_', '.'], "-");
                Url::parse(&format!("https://{}.hf.space", subdomain)).map_err(|e| {
                    RelayError::InvalidConfigValueError {
                        field: "endpoint".to_string(),
                        value: endpoint_id.to_string(),
                        reason: format!("Space id does not map to a valid host: {}", e),
                    }
                })
            }
            _ => Err(RelayError::InvalidConfigValueError {
                field: "endpoint".to_string(),
                value: endpoint_id.to_string(),
                reason: "Expected an http(s) URL or a Space id of the form owner/name".to_string(),
            }),
        }
    }

    fn call_url(&self, base: &Url, operation: &str) -> String {
        format!(
            "{}{}/call/{}",
            base.as_str().trim_end_matches('/'),
            self.api_prefix,
            operation.trim_start_matches('/')
        )
    }

    async fn submit(&self, url: &str, payload: Value) -> Result<String> {
        tracing::debug!("Submitting prediction request to: {}", url);

        let body = serde_json::json!({ "data": [payload] });
        let mut request = self.client.post(url).json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        tracing::debug!("Submit response status: {}", response.status());

        if !response.status().is_success() {
            return Err(RelayError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| RelayError::protocol(format!("Submit response is not JSON: {}", e)))?;

        json.get("event_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RelayError::protocol(format!("Submit response has no event_id: {}", json)))
    }

    async fn fetch_result(&self, url: &str) -> Result<Value> {
        tracing::debug!("Fetching prediction result from: {}", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        tracing::debug!("Result response status: {}", response.status());

        if !response.status().is_success() {
            return Err(RelayError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        parse_event_stream(&body)
    }
}

impl Default for GradioClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RemoteClient for GradioClient {
    async fn call(&self, endpoint_id: &str, operation: &str, payload: Value) -> Result<Value> {
        let base = Self::resolve_base_url(endpoint_id)?;
        let call_url = self.call_url(&base, operation);

        let event_id = self.submit(&call_url, payload).await?;
        tracing::debug!("Prediction queued with event_id {}", event_id);

        self.fetch_result(&format!("{}/{}", call_url, event_id)).await
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// 解析 SSE 回應，回傳 `complete` 事件的輸出
pub fn parse_event_stream(body: &str) -> Result<Value> {
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    // 補一個空行，讓最後一個事件也會被處理
    for line in body.lines().chain(std::iter::once("")) {
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            if let Some(name) = event.take() {
                let data = data_lines.join("\n");
                if let Some(result) = dispatch_event(&name, &data)? {
                    return Ok(result);
                }
            }
            data_lines.clear();
            continue;
        }

        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    Err(RelayError::protocol(
        "Event stream ended without a complete or error event",
    ))
}

fn dispatch_event(name: &str, data: &str) -> Result<Option<Value>> {
    match name {
        "complete" => {
            let outputs: Value = serde_json::from_str(data).map_err(|e| {
                RelayError::protocol(format!("Invalid data in complete event: {}", e))
            })?;
            Ok(Some(unwrap_outputs(outputs)))
        }
        "error" => {
            let message = match serde_json::from_str::<Value>(data) {
                Ok(Value::String(message)) => message,
                Ok(Value::Null) => UPSTREAM_ERROR_MESSAGE.to_string(),
                _ if data.trim().is_empty() => UPSTREAM_ERROR_MESSAGE.to_string(),
                _ => data.trim().to_string(),
            };
            Err(RelayError::remote(message))
        }
        other => {
            tracing::debug!("Skipping '{}' event", other);
            Ok(None)
        }
    }
}

/// 單一輸出時回傳該值，多個輸出則回傳整個陣列
fn unwrap_outputs(outputs: Value) -> Value {
    match outputs {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}
