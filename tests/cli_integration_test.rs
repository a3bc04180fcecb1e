use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn run_cli(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_vitals-relay"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start vitals-relay");

    // 程式可能在讀取 stdin 前就因設定錯誤結束，寫入失敗可忽略
    if let Some(mut pipe) = child.stdin.take() {
        let _ = pipe.write_all(stdin.as_bytes());
    }

    child.wait_with_output().unwrap()
}

/// 模擬 Gradio app：任何 payload 都回傳固定的結果
fn mock_prediction(server: &MockServer, outputs: serde_json::Value) {
    server.mock(|when, then| {
        when.method(POST).path("/gradio_api/call/predict");
        then.status(200).json_body(json!({ "event_id": "evt" }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/gradio_api/call/predict/evt");
        then.status(200)
            .header("Content-Type", "text/event-stream")
            .body(format!("event: complete\ndata: {}\n\n", outputs));
    });
}

#[test]
fn test_vitals_scenario_prints_result_wrapper() {
    let server = MockServer::start();
    mock_prediction(&server, json!(["normal"]));

    let output = run_cli(
        &["--endpoint", &server.base_url()],
        r#"{"heart_rate": 72, "temp": 98.6}"#,
    );

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "{\"result\": \"normal\"}\n"
    );
}

#[test]
fn test_empty_object_with_null_result() {
    let server = MockServer::start();
    mock_prediction(&server, json!([null]));

    let output = run_cli(&["--endpoint", &server.base_url()], "{}");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "{\"result\": null}\n");
}

#[test]
fn test_invalid_input_exits_non_zero_without_stdout() {
    let server = MockServer::start();
    let submit_mock = server.mock(|when, then| {
        when.method(POST).path("/gradio_api/call/predict");
        then.status(200).json_body(json!({ "event_id": "evt" }));
    });

    for input in ["", "not json"] {
        let output = run_cli(&["--endpoint", &server.base_url()], input);

        assert!(!output.status.success(), "input {:?} should fail", input);
        assert_eq!(output.status.code(), Some(65));
        assert!(output.stdout.is_empty());
        assert!(!output.stderr.is_empty());
    }

    submit_mock.assert_hits(0);
}

#[test]
fn test_remote_error_exits_non_zero_without_stdout() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/gradio_api/call/predict");
        then.status(200).json_body(json!({ "event_id": "evt" }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/gradio_api/call/predict/evt");
        then.status(200).body("event: error\ndata: null\n\n");
    });

    let output = run_cli(&["--endpoint", &server.base_url()], "[[72, 16, 98, 36.6]]");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("upstream Gradio app"));
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let server = MockServer::start();
    mock_prediction(
        &server,
        json!(["Predicted Class ID: 0 — Normal\nYour Health Score: 91.0"]),
    );

    let input = "[[72, 16, 98, 36.6], [73, 16, 98, 36.6]]";
    let first = run_cli(&["--endpoint", &server.base_url()], input);
    let second = run_cli(&["--endpoint", &server.base_url()], input);

    assert!(first.status.success());
    assert!(second.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(
        String::from_utf8(first.stdout).unwrap(),
        "{\"result\": \"Predicted Class ID: 0 \\u2014 Normal\\nYour Health Score: 91.0\"}\n"
    );
}

#[test]
fn test_config_file_and_health_status() -> Result<()> {
    let server = MockServer::start();
    mock_prediction(
        &server,
        json!(["Predicted Class ID: 2 - Mild Risk\nAlert: Elevated heart rate\nYour Health Score: 64.5\nPlease rest."]),
    );

    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("relay.toml");
    std::fs::write(
        &config_path,
        format!(
            "[remote]\nendpoint = \"{}\"\ntimeout_seconds = 10\n\n[output]\nhealth_status = true\n",
            server.base_url()
        ),
    )?;

    let output = run_cli(&["--config", &config_path.to_string_lossy()], "[]");

    assert!(output.status.success());
    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(stdout["status"]["ID"], json!(2));
    assert_eq!(stdout["status"]["Descp"], json!("Mild Risk"));
    assert_eq!(stdout["status"]["Alert"], json!("Elevated heart rate"));
    assert_eq!(stdout["status"]["Score"], json!(64.5));
    assert_eq!(stdout["status"]["Message"], json!("Please rest."));
    Ok(())
}

#[test]
fn test_invalid_configuration_exits_with_config_code() {
    let output = run_cli(&["--endpoint", "not-a-space-id"], "{}");

    assert_eq!(output.status.code(), Some(78));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_logs_never_reach_stdout() {
    let server = MockServer::start();
    mock_prediction(&server, json!(["normal"]));

    let output = run_cli(&["--endpoint", &server.base_url(), "--verbose"], "{}");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "{\"result\": \"normal\"}\n"
    );
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_json_logs_are_json_lines_on_stderr() -> Result<()> {
    let server = MockServer::start();
    mock_prediction(&server, json!(["normal"]));

    let output = run_cli(&["--endpoint", &server.base_url(), "--json-logs"], "{}");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "{\"result\": \"normal\"}\n");

    let stderr = String::from_utf8(output.stderr)?;
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty());
    for line in &lines {
        let entry: serde_json::Value = serde_json::from_str(line)?;
        assert!(entry.get("level").is_some(), "missing level in {}", line);
    }
    assert!(lines.iter().any(|l| l.contains("Calling")));
    Ok(())
}

#[test]
fn test_user_agent_flag_is_sent_on_both_requests() {
    let server = MockServer::start();
    let submit_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/gradio_api/call/predict")
            .header("user-agent", "ward-7-gateway");
        then.status(200).json_body(json!({ "event_id": "evt" }));
    });
    let result_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/gradio_api/call/predict/evt")
            .header("user-agent", "ward-7-gateway");
        then.status(200)
            .header("Content-Type", "text/event-stream")
            .body("event: complete\ndata: [\"normal\"]\n\n");
    });

    let output = run_cli(
        &["--endpoint", &server.base_url(), "--user-agent", "ward-7-gateway"],
        "{}",
    );

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "{\"result\": \"normal\"}\n"
    );
    submit_mock.assert();
    result_mock.assert();
}
