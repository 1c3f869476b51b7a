use api_client::error::ApiError;
use api_client::{HttpApiClient, MarketApi};
use configuration::ApiSettings;
use core_types::SymbolSelection;
use mockito::{Matcher, Server, ServerGuard};
use std::time::Duration;

fn client_for(server: &ServerGuard) -> HttpApiClient {
    let settings = ApiSettings {
        base_url: format!("{}/api/v1/", server.url()),
        timeout: Duration::from_secs(5),
    };
    HttpApiClient::new(&settings).unwrap()
}

#[tokio::test]
async fn history_drops_rows_with_bad_dates() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/market/history/ALL")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"date": "2024-01-02", "open": 10, "high": 11, "low": 9, "close": 10.5, "volume": 1000, "symbol": "ALL"},
                {"date": null, "close": 11.0, "volume": 900},
                {"date": "2024-01-03", "close": "10.8", "volume": null}
            ]"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let history = client.history(&SymbolSelection::All).await.unwrap();

    mock.assert_async().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].open, Some(10.0));
    assert_eq!(history[1].close, 10.8);
    assert_eq!(history[1].volume, 0.0);
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/market/summary")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let err = client_for(&server).market_summary().await.unwrap_err();
    match &err {
        ApiError::Status { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_a_deserialization_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/market/symbols")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let err = client_for(&server).symbols().await.unwrap_err();
    assert!(matches!(err, ApiError::Deserialization(_)));
}

#[tokio::test]
async fn consult_posts_the_symbol() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/advisor/consult")
        .match_body(Matcher::Json(serde_json::json!({"symbol": "TCB"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"symbol": "TCB", "recommendation": "BUY", "confidence": 0.72,
                "signals": {"predicted_return_21d": 0.031, "regime": 2, "direction": 1},
                "rationale": "Momentum is positive."}"#,
        )
        .create_async()
        .await;

    let report = client_for(&server).consult("TCB").await.unwrap();

    mock.assert_async().await;
    assert_eq!(report.recommendation, "BUY");
    assert_eq!(report.signals.predicted_return_21d, Some(0.031));
    assert_eq!(report.signals.predicted_volatility_21d, None);
}

#[tokio::test]
async fn training_results_normalize_time_and_require_success() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/admin/training-results")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"status": "Success", "data": [
                {"symbol": "VCB", "model": "return", "date": "2024-06-03", "true": 0.01, "pred": 0.02},
                {"symbol": "VCB", "model": "direction", "time": "2024-06-04T00:00:00", "true": 1, "pred": 0}
            ]}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/admin/training-metrics")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "No metrics found", "data": []}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let rows = client.training_results().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].date.to_string(), "2024-06-04");
    assert!(client.training_metrics().await.unwrap().is_empty());
}

#[tokio::test]
async fn retrain_returns_the_acknowledgement() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/admin/retrain-model")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "Retraining triggered", "pid": 4242}"#)
        .create_async()
        .await;

    let ack = client_for(&server).retrain_model().await.unwrap();

    mock.assert_async().await;
    assert_eq!(ack.pid, Some(4242));
    assert!(!ack.is_rejected());
}
