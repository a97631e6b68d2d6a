// Adds automatic logging to test
mod test_utils {
    use std::fs;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mock_rate_api() -> MockServer {
        let mock_server = MockServer::start().await;

        let latest_eur = r#"{
            "result": "success",
            "base_code": "EUR",
            "conversion_rates": {"JPY": 162.3, "USD": 1.08, "GBP": 0.85}
        }"#;
        Mock::given(method("GET"))
            .and(path("/test-key/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(latest_eur))
            .mount(&mock_server)
            .await;

        let pair = r#"{
            "result": "success",
            "base_code": "EUR",
            "target_code": "JPY",
            "conversion_rate": 162.3
        }"#;
        Mock::given(method("GET"))
            .and(path("/test-key/pair/EUR/JPY"))
            .respond_with(ResponseTemplate::new(200).set_body_string(pair))
            .mount(&mock_server)
            .await;

        let history = r#"{
            "result": "success",
            "base_code": "EUR",
            "conversion_rates": {"JPY": 158.7, "USD": 1.05}
        }"#;
        Mock::given(method("GET"))
            .and(path_regex(r"^/test-key/history/EUR/\d{4}/\d{2}/\d{2}$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(history))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn mock_advice_api(messages: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pipeline/evaluate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!(r#"{{"message": {messages}}}"#)),
            )
            .mount(&mock_server)
            .await;
        mock_server
    }

    pub fn write_config(rate_url: &str, advice_url: Option<&str>) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let advice_section = advice_url.map_or(String::new(), |url| {
            format!("  advice:\n    base_url: {url}\n")
        });
        let config_content = format!(
            r#"
api_key: "test-key"
base_currency: "EUR"
target_currency: "JPY"
providers:
  exchange_rate:
    base_url: {rate_url}
{advice_section}"#,
        );
        fs::write(config_file.path(), &config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_rates_flow_with_mock() {
    let mock_server = test_utils::mock_rate_api().await;
    let config_file = test_utils::write_config(&mock_server.uri(), None);

    let result = fxdash::run_command(
        fxdash::AppCommand::Rates {
            base: None,
            target: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Rates command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_with_mock_advice() {
    let mock_server = test_utils::mock_rate_api().await;
    let advice_server =
        test_utils::mock_advice_api(r#"["Rates look stable for this pair"]"#).await;
    let config_file = test_utils::write_config(&mock_server.uri(), Some(&advice_server.uri()));

    let result = fxdash::run_command(
        fxdash::AppCommand::Convert {
            amount: "250,000".to_string(),
            from: "EUR".to_string(),
            to: "JPY".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );

    // Exactly one evaluation request carrying the just-recorded trade.
    let requests = advice_server
        .received_requests()
        .await
        .expect("requests should be recorded");
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["base"], "EUR");
    assert_eq!(body["target"], "JPY");
    assert_eq!(body["tradeHistory"][0]["amount"], 250000.0);
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_without_advice_endpoint() {
    let mock_server = test_utils::mock_rate_api().await;
    let config_file = test_utils::write_config(&mock_server.uri(), None);

    let result = fxdash::run_command(
        fxdash::AppCommand::Convert {
            amount: "100".to_string(),
            from: "EUR".to_string(),
            to: "JPY".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok());
}

#[test_log::test(tokio::test)]
async fn test_chart_flow_with_mock() {
    use fxdash::core::rates::SeriesWindow;

    let mock_server = test_utils::mock_rate_api().await;
    let config_file = test_utils::write_config(&mock_server.uri(), None);

    let result = fxdash::run_command(
        fxdash::AppCommand::Chart {
            from: "EUR".to_string(),
            to: "JPY".to_string(),
            window: SeriesWindow::Daily,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Chart command failed with: {:?}",
        result.err()
    );

    // 8 daily steps, one history request each.
    let history_requests = mock_server
        .received_requests()
        .await
        .expect("requests should be recorded")
        .into_iter()
        .filter(|r| r.url.path().contains("/history/"))
        .count();
    assert_eq!(history_requests, 8);
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_survives_upstream_error() {
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Every endpoint answers with an API-level error payload.
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/test-key/.*$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"result": "error", "error-type": "invalid-key"}"#),
        )
        .mount(&mock_server)
        .await;

    let config_file = test_utils::write_config(&mock_server.uri(), None);

    // The view reports the failure instead of propagating it.
    let result = fxdash::run_command(
        fxdash::AppCommand::Convert {
            amount: "100".to_string(),
            from: "EUR".to_string(),
            to: "JPY".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok());
}
