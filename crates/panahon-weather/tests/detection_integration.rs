//! Auto-detection: device position, reverse geocoding, catalog match.

use std::time::Duration;

use panahon_weather::location::DEFAULT_POSITION_TIMEOUT;
use panahon_weather::{
    detect_municipality, Catalog, Coordinates, GeocodingClient, IpLocator, LookupFailure,
    PositionSource,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG: &str = "Municipalities,Population,Province\n\
    Quezon City,\"2,960,048\",Metro Manila\n\
    Makati (NCR),\"629,616\",Metro Manila\n\
    Baguio,\"366,358\",Benguet\n";

fn geocoder(server: &MockServer) -> GeocodingClient {
    GeocodingClient::new(&server.uri(), "Philippines", "panahon-test/1.0", Duration::from_secs(5))
        .unwrap()
}

fn here() -> PositionSource {
    PositionSource::Fixed(Coordinates::new(14.5547, 121.0244))
}

async fn reverse_returns(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_detects_normalized_match() {
    let server = MockServer::start().await;
    reverse_returns(
        &server,
        serde_json::json!({ "address": { "city": "City of Makati", "state": "Metro Manila" } }),
    )
    .await;

    let catalog = Catalog::parse(CATALOG);
    let found = detect_municipality(&here(), DEFAULT_POSITION_TIMEOUT, &geocoder(&server), &catalog)
        .await
        .unwrap();

    assert_eq!(found.name, "Makati (NCR)");
}

#[tokio::test]
async fn test_city_not_in_catalog() {
    let server = MockServer::start().await;
    reverse_returns(&server, serde_json::json!({ "address": { "town": "Sagada" } })).await;

    let catalog = Catalog::parse(CATALOG);
    let result =
        detect_municipality(&here(), DEFAULT_POSITION_TIMEOUT, &geocoder(&server), &catalog).await;

    assert_eq!(result, Err(LookupFailure::NotInCatalog("Sagada".into())));
}

#[tokio::test]
async fn test_no_city_field() {
    let server = MockServer::start().await;
    reverse_returns(
        &server,
        serde_json::json!({ "address": { "state": "Benguet", "country": "Philippines" } }),
    )
    .await;

    let catalog = Catalog::parse(CATALOG);
    let result =
        detect_municipality(&here(), DEFAULT_POSITION_TIMEOUT, &geocoder(&server), &catalog).await;

    assert_eq!(result, Err(LookupFailure::CityUndetected));
}

#[tokio::test]
async fn test_reverse_failure_is_location_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let catalog = Catalog::parse(CATALOG);
    let result =
        detect_municipality(&here(), DEFAULT_POSITION_TIMEOUT, &geocoder(&server), &catalog).await;

    assert_eq!(result, Err(LookupFailure::LocationUnavailable));
}

#[tokio::test]
async fn test_unsupported_source_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = Catalog::parse(CATALOG);
    let result = detect_municipality(
        &PositionSource::Unsupported,
        DEFAULT_POSITION_TIMEOUT,
        &geocoder(&server),
        &catalog,
    )
    .await;

    assert_eq!(result, Err(LookupFailure::GeolocationUnsupported));
}

fn ip_source(server: &MockServer) -> PositionSource {
    let locator =
        IpLocator::new(&server.uri(), "panahon-test/1.0", Duration::from_secs(5)).unwrap();
    PositionSource::from_config(None, Some(locator))
}

#[tokio::test]
async fn test_ip_position_detects_without_user_input() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "city": "Baguio", "latitude": 16.412, "longitude": 120.593 }),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "16.412"))
        .and(query_param("lon", "120.593"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "address": { "city": "Baguio" } }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = Catalog::parse(CATALOG);
    let found = detect_municipality(
        &ip_source(&server),
        DEFAULT_POSITION_TIMEOUT,
        &geocoder(&server),
        &catalog,
    )
    .await
    .unwrap();

    assert_eq!(found.name, "Baguio");
}

#[tokio::test]
async fn test_slow_position_is_location_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "latitude": 16.412, "longitude": 120.593 }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = Catalog::parse(CATALOG);
    let result = detect_municipality(
        &ip_source(&server),
        Duration::from_millis(200),
        &geocoder(&server),
        &catalog,
    )
    .await;

    assert_eq!(result, Err(LookupFailure::LocationUnavailable));
}

#[tokio::test]
async fn test_position_service_errors_are_location_unavailable() {
    for response in [
        ResponseTemplate::new(403),
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(response)
            .mount(&server)
            .await;

        let catalog = Catalog::parse(CATALOG);
        let result = detect_municipality(
            &ip_source(&server),
            DEFAULT_POSITION_TIMEOUT,
            &geocoder(&server),
            &catalog,
        )
        .await;

        assert_eq!(result, Err(LookupFailure::LocationUnavailable));
    }
}
