//! HTTP surface tests

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::Fixture;
use geonimbus::web::WebServer;
use serde_json::{Value, json};

fn server(fixture: &Fixture) -> TestServer {
    TestServer::new(WebServer::create_router(fixture.app_state())).unwrap()
}

#[tokio::test]
async fn test_get_by_id_found_and_missing() {
    let fixture = Fixture::new().await;
    let seeded = fixture.seed("1", 10.0, 20.0).await;
    let server = server(&fixture);

    let response = server.get(&format!("/geocode/id/{}", seeded.id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], seeded.id);
    assert_eq!(body["data"]["zipcode"], "62701");

    server
        .get("/geocode/id/4242")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_geocode_defaults_country() {
    let fixture = Fixture::new().await;
    let seeded = fixture.seed("7", 39.78, -89.65).await;
    let server = server(&fixture);

    let response = server
        .get("/geocode/geocode")
        .add_query_param("zipcode", "62701")
        .add_query_param("number", "7")
        .add_query_param("street", "Main St")
        .add_query_param("city", "Springfield")
        .add_query_param("state", "IL")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["id"], seeded.id);
}

#[tokio::test]
async fn test_reverse_geocode_and_nearest() {
    let fixture = Fixture::new().await;
    let seeded = fixture.seed("1", 39.78, -89.65).await;
    let server = server(&fixture);

    // Nothing cached yet
    server
        .get("/geocode/nearest")
        .add_query_param("latitude", 0.0)
        .add_query_param("longitude", 0.0)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .get("/geocode/reverse-geocode")
        .add_query_param("latitude", 39.78)
        .add_query_param("longitude", -89.65)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["id"], seeded.id);

    let nearest = server
        .get("/geocode/nearest")
        .add_query_param("latitude", 0.0)
        .add_query_param("longitude", 0.0)
        .await;
    nearest.assert_status_ok();
    assert_eq!(nearest.json::<Value>()["data"]["id"], seeded.id);
}

#[tokio::test]
async fn test_reverse_geocode_rejects_non_finite_input() {
    let fixture = Fixture::new().await;
    let server = server(&fixture);

    server
        .get("/geocode/reverse-geocode")
        .add_query_param("latitude", "NaN")
        .add_query_param("longitude", 1.0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_reverse_geocode_skips_misses() {
    let fixture = Fixture::new().await;
    fixture.seed("1", 10.0, 20.0).await;
    fixture.seed("2", 30.0, 40.0).await;
    let server = server(&fixture);

    let response = server
        .post("/geocode/reverse-geocode/batch")
        .json(&json!([
            { "latitude": 10.0, "longitude": 20.0 },
            { "latitude": -50.0, "longitude": -50.0 },
            { "latitude": 30.0, "longitude": 40.0 }
        ]))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_bbox_and_radius_return_lists() {
    let fixture = Fixture::new().await;
    fixture.seed("1", 10.0, 20.0).await;
    let server = server(&fixture);

    let bbox = server
        .get("/geocode/bbox")
        .add_query_param("minLat", 9.0)
        .add_query_param("maxLat", 11.0)
        .add_query_param("minLon", 19.0)
        .add_query_param("maxLon", 21.0)
        .await;
    bbox.assert_status_ok();
    assert_eq!(bbox.json::<Value>()["data"].as_array().map(Vec::len), Some(1));

    let empty = server
        .get("/geocode/radius")
        .add_query_param("latitude", -40.0)
        .add_query_param("longitude", -40.0)
        .add_query_param("radius", 5.0)
        .await;
    empty.assert_status_ok();
    assert_eq!(empty.json::<Value>()["data"], json!([]));

    server
        .get("/geocode/bbox")
        .add_query_param("minLat", 11.0)
        .add_query_param("maxLat", 9.0)
        .add_query_param("minLon", 19.0)
        .add_query_param("maxLon", 21.0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_geohash_endpoints() {
    let fixture = Fixture::new().await;
    let seeded = fixture.seed("1", 42.6, -5.6).await;
    let geohash = seeded.geohash.clone().unwrap();
    let server = server(&fixture);

    let exact = server
        .get("/geocode/geohash")
        .add_query_param("geohash", &geohash)
        .await;
    exact.assert_status_ok();
    assert_eq!(exact.json::<Value>()["data"]["id"], seeded.id);

    server
        .get("/geocode/geohash")
        .add_query_param("geohash", "not-a-hash")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .get("/geocode/geohash-prefix")
        .add_query_param("geohashPrefix", "ezs42")
        .await
        .assert_status_ok();

    // Empty prefix results are a 404, unlike bbox/radius
    server
        .get("/geocode/geohash-prefix")
        .add_query_param("geohashPrefix", "zzzz")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_encode_and_decode() {
    let fixture = Fixture::new().await;
    let server = server(&fixture);

    let encoded = server
        .get("/api/encode")
        .add_query_param("latitude", 42.6)
        .add_query_param("longitude", -5.6)
        .add_query_param("precision", 5)
        .await;
    encoded.assert_status_ok();
    assert_eq!(encoded.json::<Value>()["data"], "ezs42");

    let default_precision = server
        .get("/api/encode")
        .add_query_param("latitude", 42.6)
        .add_query_param("longitude", -5.6)
        .await;
    assert_eq!(
        default_precision.json::<Value>()["data"].as_str().map(str::len),
        Some(8)
    );

    let decoded = server
        .get("/api/decode")
        .add_query_param("geohash", "ezs42")
        .await;
    decoded.assert_status_ok();
    let location = decoded.json::<Value>();
    let latitude = location["data"]["latitude"].as_f64().unwrap();
    assert!((latitude - 42.605).abs() < 0.01);

    server
        .get("/api/encode")
        .add_query_param("latitude", 42.6)
        .add_query_param("longitude", -5.6)
        .add_query_param("precision", 13)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_stats_and_preload() {
    let fixture = Fixture::new().await;
    let seeded = fixture.seed("1", 42.6, -5.6).await;
    let server = server(&fixture);

    let health = server.get("/api/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["data"]["database"], "connected");

    let preload = server
        .post("/api/cache/preload")
        .json(&json!([seeded.geohash.clone().unwrap(), "s0000000"]))
        .await;
    preload.assert_status_ok();
    let body = preload.json::<Value>();
    assert_eq!(body["data"]["requested"], 2);
    assert_eq!(body["data"]["resolved"], 1);

    let stats = server.get("/api/cache/stats").await;
    stats.assert_status_ok();
    assert_eq!(stats.json::<Value>()["data"]["entries"], 1);
}
