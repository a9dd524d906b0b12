//! Dhan Adapter Integration Tests
//!
//! Exercises the Dhan adapter against a mocked DhanHQ host.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use order_router::application::ports::{
    BrokerAdapter, BrokerError, BrokerOrderRequest, CredentialVault, OrderMetadata,
};
use order_router::application::services::{AuthState, TokenCache};
use order_router::domain::brokerage::BrokerAccount;
use order_router::domain::order_execution::OrderSide;
use order_router::domain::shared::{AccountId, BrokerId, BrokerOrderId, UserId};
use order_router::infrastructure::broker::{DhanAdapter, DhanConfig, RetryConfig};
use order_router::infrastructure::vault::{AccountSeed, InMemoryCredentialVault};

const ORDERS_PATH: &str = "/v2/orders";
const POSITIONS_PATH: &str = "/v2/positions";

fn seed() -> AccountSeed {
    AccountSeed {
        account: BrokerAccount {
            id: AccountId::new("dhan-1"),
            user_id: UserId::new("user-1"),
            broker_id: BrokerId::new("dhan"),
            metadata: Value::Null,
        },
        credentials: json!({"accessToken": "token-1", "clientId": 1_000_123}),
    }
}

fn adapter(server: &MockServer, tokens: &Arc<TokenCache>) -> DhanAdapter {
    let vault: Arc<dyn CredentialVault> = Arc::new(InMemoryCredentialVault::with_seeds(&[seed()]));
    let config = DhanConfig::default()
        .with_base_url(server.uri())
        .with_retry(RetryConfig {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            multiplier: 2.0,
        });
    DhanAdapter::new(&config, vault, Arc::clone(tokens)).unwrap()
}

fn account() -> AccountId {
    AccountId::new("dhan-1")
}

async fn mount_probe(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .and(header("access-token", "token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn market_sell_is_placed() {
    let server = MockServer::start().await;
    mount_probe(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(ORDERS_PATH))
        .and(header("access-token", "token-1"))
        .and(body_partial_json(json!({
            "dhanClientId": "1000123",
            "transactionType": "SELL",
            "exchangeSegment": "NSE_EQ",
            "productType": "CNC",
            "orderType": "MARKET",
            "validity": "DAY",
            "securityId": "2885",
            "quantity": 5
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"orderId": "112111182198", "orderStatus": "PENDING"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(TokenCache::new());
    let adapter = adapter(&server, &tokens);
    let metadata = OrderMetadata::from_json(Some(&json!({"productType": "CNC"})));
    let request = BrokerOrderRequest::market("2885".to_string(), OrderSide::Sell, dec!(5), metadata);

    let result = adapter.place_order(&account(), &request).await.unwrap();

    assert_eq!(result.broker_order_id.as_str(), "112111182198");
    assert_eq!(result.status, "PENDING");
    assert_eq!(
        tokens.state(&BrokerId::new("dhan"), &account()),
        AuthState::Valid
    );
}

#[tokio::test]
async fn fractional_quantity_is_a_mapping_error() {
    let server = MockServer::start().await;
    mount_probe(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = adapter(&server, &Arc::new(TokenCache::new()));
    let request = BrokerOrderRequest::market(
        "2885".to_string(),
        OrderSide::Buy,
        dec!(1.5),
        OrderMetadata::default(),
    );

    let err = adapter.place_order(&account(), &request).await.unwrap_err();
    assert!(matches!(err, BrokerError::Mapping { .. }));
}

#[tokio::test]
async fn vendor_error_body_becomes_rejection() {
    let server = MockServer::start().await;
    mount_probe(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorType": "Order_Error",
            "errorCode": "DH-906",
            "errorMessage": "Insufficient funds"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, &Arc::new(TokenCache::new()));
    let request = BrokerOrderRequest::market(
        "2885".to_string(),
        OrderSide::Buy,
        dec!(1),
        OrderMetadata::default(),
    );

    let err = adapter.place_order(&account(), &request).await.unwrap_err();
    assert_eq!(
        err,
        BrokerError::VendorRejected {
            message: "Insufficient funds".to_string()
        }
    );
}

#[tokio::test]
async fn order_post_is_never_retried() {
    let server = MockServer::start().await;
    mount_probe(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, &Arc::new(TokenCache::new()));
    let request = BrokerOrderRequest::market(
        "2885".to_string(),
        OrderSide::Buy,
        dec!(1),
        OrderMetadata::default(),
    );

    let err = adapter.place_order(&account(), &request).await.unwrap_err();
    assert!(matches!(err, BrokerError::Transport { .. }));
}

#[tokio::test]
async fn rejected_token_fails_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errorCode": "DH-901",
            "errorMessage": "Client ID or user generated access token is invalid or expired."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(TokenCache::new());
    let adapter = adapter(&server, &tokens);

    let err = adapter.authenticate(&account()).await.unwrap_err();

    assert!(matches!(err, BrokerError::AuthenticationFailed { .. }));
    assert!(tokens.get(&BrokerId::new("dhan"), &account()).is_none());
}

#[tokio::test]
async fn positions_are_normalized_and_reads_retried() {
    let server = MockServer::start().await;
    mount_probe(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "tradingSymbol": "INFY",
                "productType": "CNC",
                "netQty": 3,
                "buyAvg": 1500.5,
                "lastTradedPrice": 1510,
                "realizedProfit": 0,
                "unrealizedProfit": 28.5,
                "buyQty": 3,
                "sellQty": 0
            },
            {"tradingSymbol": "SBIN", "netQty": 0, "buyAvg": 600}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, &Arc::new(TokenCache::new()));

    let positions = adapter.get_positions(&account()).await.unwrap();

    assert_eq!(positions.len(), 1);
    let infy = &positions[0];
    assert_eq!(infy.symbol, "INFY");
    assert_eq!(infy.product_type, "CNC");
    assert_eq!(infy.net_qty, dec!(3));
    assert_eq!(infy.avg_price, dec!(1500.5));
    assert_eq!(infy.ltp, dec!(1510));
    assert_eq!(infy.pnl, dec!(28.5));
}

#[tokio::test]
async fn cancel_sends_delete_for_order() {
    let server = MockServer::start().await;
    mount_probe(&server, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/v2/orders/112111182198"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"orderId": "112111182198", "orderStatus": "CANCELLED"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, &Arc::new(TokenCache::new()));

    adapter
        .cancel_order(&account(), &BrokerOrderId::new("112111182198"))
        .await
        .unwrap();
}

#[tokio::test]
async fn history_is_not_supported() {
    let server = MockServer::start().await;
    let adapter = adapter(&server, &Arc::new(TokenCache::new()));

    let err = adapter
        .get_historical_data(
            &account(),
            "2885",
            order_router::domain::brokerage::CandleInterval::FiveMinutes,
            chrono::Utc::now() - chrono::Duration::days(1),
            chrono::Utc::now(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, BrokerError::Unsupported { .. }));
}

#[tokio::test]
async fn credential_probe_reports_validity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .and(header("access-token", "good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .and(header("access-token", "bad"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let adapter = adapter(&server, &Arc::new(TokenCache::new()));

    assert!(
        adapter
            .validate_credentials(&json!({"accessToken": "good", "clientId": "1"}))
            .await
    );
    assert!(
        !adapter
            .validate_credentials(&json!({"accessToken": "bad", "clientId": "1"}))
            .await
    );
    assert!(!adapter.validate_credentials(&json!({"clientId": "1"})).await);
}
