//! HTTP collaborator clients against a mock server.

use serde_json::json;
use std::time::Duration;
use synthesis::retrieval::market::HttpMarketData;
use synthesis::retrieval::proprietary::HttpProprietaryCorpus;
use synthesis::retrieval::{MarketData, ProprietaryCorpus};
use synthesis::types::{AppError, Timeframe};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_market_data_price_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/quotes/TSLA"))
        .and(query_param("range", "1y"))
        .and(header("authorization", "Bearer quotes-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": [
                {"timestamp": "2024-10-03T00:00:00Z", "close": 240.7, "volume": 9000000},
                {"timestamp": "2024-10-01T00:00:00Z", "close": 258.0, "volume": 8000000}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        HttpMarketData::new(server.uri(), Some("quotes-key".to_string()), TIMEOUT).unwrap();
    let points = client.price_history("TSLA", Timeframe::PastYear).await.unwrap();

    assert_eq!(points.len(), 2);
    // time-ordered regardless of the feed's order
    assert_eq!(points[0].close, 258.0);
    assert_eq!(points[1].close, 240.7);
}

#[tokio::test]
async fn test_market_data_unknown_symbol_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/quotes/ZZZZ"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = HttpMarketData::new(server.uri(), None, TIMEOUT).unwrap();
    assert!(client.price_history("ZZZZ", Timeframe::PastMonth).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_market_data_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = HttpMarketData::new(server.uri(), None, TIMEOUT).unwrap();
    let err = client.price_history("TSLA", Timeframe::PastMonth).await.unwrap_err();
    assert!(
        matches!(err, AppError::Retrieval { ref collaborator, .. } if collaborator == "market-data")
    );
}

#[tokio::test]
async fn test_proprietary_search_caps_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(body_json(json!({"query": "Tesla", "limit": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                {"title": "Board deck", "url": "internal://deck/7", "content": "Capacity", "score": 0.9},
                {"title": "Memo", "url": "internal://memo/1", "score": 0.4},
                {"title": "Extra", "url": "internal://x", "score": 0.1}
            ],
            "confidence": 0.77
        })))
        .expect(1)
        .mount(&server)
        .await;

    let corpus = HttpProprietaryCorpus::new(format!("{}/", server.uri()), None, TIMEOUT)
        .unwrap()
        .with_max_documents(2);
    let matches = corpus.search("Tesla", 10).await.unwrap();

    assert_eq!(matches.documents.len(), 2);
    assert_eq!(matches.documents[0].snippet, "Capacity");
    assert_eq!(matches.documents[0].relevance, 0.9);
    assert_eq!(matches.confidence, Some(0.77));
}

#[tokio::test]
async fn test_proprietary_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let corpus = HttpProprietaryCorpus::new(server.uri(), None, TIMEOUT).unwrap();
    let err = corpus.search("Tesla", 5).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Retrieval { ref collaborator, .. } if collaborator == "proprietary-corpus"
    ));
}
