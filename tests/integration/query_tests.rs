use super::*;
use dealbot::models::{AuthType, Price};
use dealbot::querier::DealQuery;
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer, name: &str, auth_type: AuthType) -> Source {
    Source::new(name, format!("{}/deals", server.uri()), auth_type)
}

#[tokio::test]
async fn test_items_layout_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deals"))
        .and(query_param("q", "laptop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"title": "Laptop", "price": {"value": 499}, "link": "https://shop.test/1"},
                {"price": {}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let querier = create_test_querier(secrets(&[]));
    let deals = querier
        .fetch(&source(&server, "Ebay", AuthType::None), "laptop")
        .await
        .unwrap();

    assert_eq!(deals.len(), 2);
    assert_eq!(deals[0].to_string(), "💸 Laptop - $499 → [Link](https://shop.test/1)");
    assert_eq!(deals[1].price, Price::Unknown);
    assert_eq!(deals[1].to_string(), "💸 Unknown Item - $Unknown Price → [Link](#)");
}

#[tokio::test]
async fn test_results_layout_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "TV", "price": "149.99", "url": "https://shop.test/tv"}]
        })))
        .mount(&server)
        .await;

    let querier = create_test_querier(secrets(&[]));
    let deals = querier
        .fetch(&source(&server, "Woot", AuthType::None), "tv")
        .await
        .unwrap();

    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].to_string(), "💸 TV - $149.99 → [Link](https://shop.test/tv)");
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("apikey", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let querier = create_test_querier(secrets(&[("BESTBUY_API_KEY", "secret-key")]));
    let deals = querier
        .fetch(&source(&server, "BestBuy", AuthType::Key), "phone")
        .await
        .unwrap();

    assert!(deals.is_empty());
}

#[tokio::test]
async fn test_missing_api_key_sends_no_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("apikey"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"title": "x"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let querier = create_test_querier(secrets(&[]));
    let deals = querier
        .fetch(&source(&server, "BestBuy", AuthType::Key), "phone")
        .await
        .unwrap();

    assert_eq!(deals.len(), 1);
}

#[tokio::test]
async fn test_bearer_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let querier = create_test_querier(secrets(&[("WALMART_TOKEN", "abc")]));
    querier
        .fetch(&source(&server, "Walmart", AuthType::Bearer), "tv")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_server_error_yields_no_deals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let querier = create_test_querier(secrets(&[]));
    let source = source(&server, "Ebay", AuthType::None);

    assert!(querier.fetch(&source, "tv").await.is_err());
    assert!(querier.query(&source, "tv").await.is_empty());
}

#[tokio::test]
async fn test_malformed_json_yields_no_deals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let querier = create_test_querier(secrets(&[]));
    let source = source(&server, "Ebay", AuthType::None);

    assert!(querier.fetch(&source, "tv").await.is_err());
    assert!(querier.query(&source, "tv").await.is_empty());
}

#[tokio::test]
async fn test_unknown_layout_yields_no_deals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": [{"title": "x"}]})))
        .mount(&server)
        .await;

    let querier = create_test_querier(secrets(&[]));
    let deals = querier
        .fetch(&source(&server, "Ebay", AuthType::None), "tv")
        .await
        .unwrap();

    assert!(deals.is_empty());
}

#[tokio::test]
async fn test_oauth2_token_is_used_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-123",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deals"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"title": "Echo", "price": {"value": 29}, "link": "https://a.test/echo"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token_url = format!("{}/oauth/token", server.uri());
    let querier = create_test_querier(secrets(&[
        ("AMAZON_CLIENT_ID", "id"),
        ("AMAZON_CLIENT_SECRET", "secret"),
        ("AMAZON_TOKEN_URL", &token_url),
    ]));
    let deals = querier
        .fetch(&source(&server, "Amazon", AuthType::OAuth2), "echo")
        .await
        .unwrap();

    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].title, "Echo");
}

#[tokio::test]
async fn test_oauth2_failure_proceeds_without_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deals"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"title": "x"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let token_url = format!("{}/oauth/token", server.uri());
    let querier = create_test_querier(secrets(&[
        ("TARGET_CLIENT_ID", "id"),
        ("TARGET_CLIENT_SECRET", "wrong"),
        ("TARGET_TOKEN_URL", &token_url),
    ]));
    let deals = querier
        .fetch(&source(&server, "Target", AuthType::OAuth2), "tv")
        .await
        .unwrap();

    assert_eq!(deals.len(), 1);
}
