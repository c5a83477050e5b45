//! Emit command tests

use std::str::FromStr;

use super::*;

fn template(metric: Option<(String, MetricValue)>) -> Template {
    Template {
        level: LogLevel::Warn,
        category: "disk".to_string(),
        metric,
    }
}

#[test]
fn test_template_plain() {
    let msg = template(None).message("80% full");
    assert_eq!(msg, LogMessage::warn("disk", "80% full"));
    assert!(!msg.is_metric());
}

#[test]
fn test_template_metric() {
    let msg = template(Some(("%".to_string(), MetricValue::Int(80)))).message("usage");
    let metric = msg.metric().unwrap();
    assert_eq!(metric.unit, "%");
    assert_eq!(metric.value, MetricValue::Int(80));
}

#[tokio::test]
async fn test_empty_config_falls_back_to_console() {
    let router = Router::new();
    let outputs = Outputs::register(&router, &Config::default(), None)
        .await
        .unwrap();

    assert_eq!(router.providers(), vec![("console".to_string(), LevelFilter::Trace)]);
    assert_eq!(outputs.listener_count(), 0);
    outputs.close().await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_configured_providers_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("app.log");
    let socket = dir.path().join("emit.sock");

    let toml = format!(
        "[[providers]]\ntype = \"file\"\nthreshold = \"warn\"\npath = {:?}\n",
        log_path.display().to_string()
    );
    let config = Config::from_str(&toml).unwrap();

    let router = Router::new();
    let channel = socket.display().to_string();
    let outputs = Outputs::register(&router, &config, Some(&channel))
        .await
        .unwrap();

    let providers = router.providers();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].1, LevelFilter::Warn);
    assert!(providers[1].0.starts_with("broadcast:"));
    assert!(socket.exists());

    router.log(&LogMessage::error("app", "written")).unwrap();
    outputs.close().await;

    assert!(!socket.exists());
    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("error [app] written"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_wait_for_listeners_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let channel = dir.path().join("lonely.sock").display().to_string();

    let router = Router::new();
    let outputs = Outputs::register(&router, &Config::default(), Some(&channel))
        .await
        .unwrap();

    let result = outputs
        .wait_for_listeners(1, Duration::from_millis(50))
        .await;
    assert!(result.is_err());
    outputs.close().await;
}
