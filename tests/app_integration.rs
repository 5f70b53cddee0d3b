use std::fs;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, mock_response: &str) -> wiremock::MockServer {
        let mock_server = wiremock::MockServer::start().await;
        let url_path = format!("/v10/finance/quoteSummary/{symbol}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// Policy matching the bear-scenario walkthrough: risk aggregates to
    /// 0.54 which reads High under a 0.5 threshold.
    pub fn bear_policy_yaml(base_url: &str) -> String {
        format!(
            r#"
ticker: "MSFT"
reference_multiple: 28.0

valuation:
  undervalued_deviation: 0.10
  overvalued_deviation: -0.10

support:
  min_revenue_growth: 0.05
  min_free_cash_flow: 0.0
  max_debt_to_equity: 150.0

risk:
  scenario: "bear"
  weights:
    capital_intensity: 0.6
    regulatory: 0.4
  thresholds:
    medium: 0.3
    high: 0.5
  scenarios:
    bull:
      capital_intensity: 0.40
    base:
      capital_intensity: 0.55
    bear:
      capital_intensity: 0.70
  sector_exposure:
    Technology: 0.30
  default_sector_exposure: 0.35

decision:
  buy_threshold: 0.10
  sell_threshold: -0.10
  risk_discounts:
    low: 1.0
    medium: 0.75
    high: 0.5
  conviction_bands:
    medium: 0.05
    high: 0.25
  support_pivot: 0.5

providers:
  yahoo:
    base_url: {base_url}
"#
        )
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_writes_sell_memo() {
    let mock_response = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "shortName": "Microsoft Corporation",
                    "regularMarketPrice": {"raw": 420.5},
                    "marketCap": {"raw": 3100000000000.0}
                },
                "summaryDetail": {
                    "trailingPE": {"raw": 35.0}
                },
                "financialData": {
                    "revenueGrowth": {"raw": 0.12},
                    "freeCashflow": {"raw": 63000000000.0},
                    "debtToEquity": {"raw": 36.5}
                },
                "assetProfile": {
                    "sector": "Technology"
                }
            }],
            "error": null
        }
    }"#;

    let mock_server = test_utils::create_mock_server("MSFT", mock_response).await;

    let policy_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        policy_file.path(),
        test_utils::bear_policy_yaml(&mock_server.uri()),
    )
    .expect("Failed to write policy file");

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let memo_path = output_dir.path().join("reports/msft_memo.txt");

    let result = thesis::run_command(
        thesis::AppCommand::Analyze {
            ticker: None,
            output: Some(memo_path.clone()),
        },
        Some(policy_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "run failed with: {:?}", result.err());

    // An overvalued multiple with full support under High risk reads SELL.
    let memo = fs::read_to_string(&memo_path).expect("Memo file should exist");
    assert!(memo.contains("Microsoft Corporation (MSFT)"));
    assert!(memo.contains("SELL"));
    assert!(memo.contains("Medium conviction"));
    assert!(memo.contains("overvalued"));
    assert!(memo.contains("Overall risk is assessed as High"));
}

#[test_log::test(tokio::test)]
async fn test_ticker_override_hits_requested_symbol() {
    let mock_response = r#"{
        "quoteSummary": {
            "result": [{
                "price": {"shortName": "Apple Inc."},
                "summaryDetail": {"trailingPE": {"raw": 20.0}},
                "financialData": {
                    "revenueGrowth": {"raw": 0.08},
                    "freeCashflow": {"raw": 90000000000.0}
                },
                "assetProfile": {"sector": "Technology"}
            }],
            "error": null
        }
    }"#;

    let mock_server = test_utils::create_mock_server("AAPL", mock_response).await;

    let policy_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        policy_file.path(),
        test_utils::bear_policy_yaml(&mock_server.uri()),
    )
    .expect("Failed to write policy file");

    // The policy names MSFT; the override must fetch AAPL instead.
    let result = thesis::run_command(
        thesis::AppCommand::Analyze {
            ticker: Some("AAPL".to_string()),
            output: None,
        },
        Some(policy_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "run failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_invalid_policy_rejected_before_any_fetch() {
    // No mock server is mounted: a policy failure must surface before the
    // provider is ever contacted.
    let policy_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let yaml = test_utils::bear_policy_yaml("http://127.0.0.1:9")
        .replace("reference_multiple: 28.0", "");
    fs::write(policy_file.path(), yaml).expect("Failed to write policy file");

    let result = thesis::run_command(
        thesis::AppCommand::Analyze {
            ticker: None,
            output: None,
        },
        Some(policy_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("missing required policy key must fail");
    assert!(format!("{err:?}").contains("reference_multiple"));
}

#[test_log::test(tokio::test)]
async fn test_negative_weight_policy_is_rejected() {
    let policy_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let yaml = test_utils::bear_policy_yaml("http://127.0.0.1:9")
        .replace("regulatory: 0.4", "regulatory: -0.4");
    fs::write(policy_file.path(), yaml).expect("Failed to write policy file");

    let result = thesis::run_command(
        thesis::AppCommand::Analyze {
            ticker: None,
            output: None,
        },
        Some(policy_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("negative weight must fail validation");
    assert!(format!("{err:?}").contains("risk.weights"));
}
