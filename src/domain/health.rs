use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static CLASS_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Predicted Class ID:\s*(\d+)").expect("valid regex"));
static CLASS_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Predicted Class ID:\s*\d+\s*[-–—]\s*(.+)").expect("valid regex")
});
static ALERT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Alert:\s*(.+)").expect("valid regex"));
static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Your Health Score:\s*([\d.]+)").expect("valid regex"));
static SCORE_TRAILER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Your Health Score:\s*[\d.]+\s*(.*)").expect("valid regex")
});
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Predicted Class ID|Alert|Your Health Score):").expect("valid regex")
});
static CLASS_OR_ALERT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Predicted Class ID|Alert):").expect("valid regex"));

/// 模型預測文字的結構化結果
///
/// 預測服務回傳的是多行文字，例如：
///
/// ```text
/// Predicted Class ID: 2 — Mild Risk
/// Alert: Elevated heart rate
/// Your Health Score: 64.5
/// Please rest and re-measure in 30 minutes.
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Descp")]
    pub description: String,
    #[serde(rename = "Alert")]
    pub alert: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Message")]
    pub message: String,
}

impl HealthStatus {
    /// 解析預測文字；缺少的欄位保留預設值並記錄警告
    pub fn parse(text: &str) -> Self {
        let mut status = HealthStatus::default();
        let mut found_id = false;
        let mut found_alert = false;
        let mut found_score = false;

        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        for line in &lines {
            if let Some(caps) = CLASS_ID_RE.captures(line) {
                status.id = caps[1].parse().unwrap_or_default();
                found_id = true;
                if let Some(desc) = CLASS_DESCRIPTION_RE.captures(line) {
                    status.description = desc[1].trim().to_string();
                }
                continue;
            }

            if let Some(caps) = ALERT_RE.captures(line) {
                status.alert = caps[1].trim().to_string();
                found_alert = true;
                continue;
            }

            if let Some(caps) = SCORE_RE.captures(line) {
                status.score = parse_leading_float(&caps[1]);
                found_score = true;
                continue;
            }

            if status.message.is_empty() && !HEADER_RE.is_match(line) {
                status.message = line.to_string();
            }
        }

        match lines.last() {
            Some(last) if !HEADER_RE.is_match(last) => {
                status.message = last.to_string();
            }
            _ => {
                // 最後一行是標頭時，訊息可能接在分數後面
                if let Some(caps) = SCORE_TRAILER_RE.captures(text) {
                    let trailer = caps[1].trim();
                    if !trailer.is_empty() && !CLASS_OR_ALERT_RE.is_match(trailer) {
                        status.message = trailer.to_string();
                    }
                }
            }
        }

        if !(found_id && found_alert && found_score) || status.message.is_empty() {
            tracing::warn!(
                "Some expected fields were not found in the health status text: {:?}",
                text
            );
        }

        status
    }
}

/// `[\d.]+` 可能含多個小數點，只取第一個合法的浮點數前綴
fn parse_leading_float(raw: &str) -> f64 {
    let end = raw
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .nth(1)
        .map(|(i, _)| i)
        .unwrap_or(raw.len());

    raw[..end].parse().unwrap_or_default()
}
