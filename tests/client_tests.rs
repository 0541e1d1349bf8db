//! HTTP client behaviour against a mock Overseerr server.

use overseerr_bridge::clients::{ClientError, OverseerrClient, RequestListQuery, UpstreamSource};
use overseerr_bridge::config::OverseerrConfig;
use overseerr_bridge::domain::{RequestFilter, RequestSort};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";

fn client_for(server: &MockServer) -> OverseerrClient {
    let config = OverseerrConfig {
        url: format!("{}/", server.uri()),
        api_key: API_KEY.to_string(),
        ..Default::default()
    };
    OverseerrClient::new(&config)
}

#[tokio::test]
async fn sends_api_key_and_parses_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .and(header("X-Api-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.33.2",
            "commitTag": "v1.33.2",
            "updateAvailable": false,
            "commitsBehind": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client_for(&server).status().await.unwrap();

    assert_eq!(status.version, "1.33.2");
    assert_eq!(status.update_available, Some(false));
}

#[tokio::test]
async fn request_listing_forwards_paging_and_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/request"))
        .and(query_param("take", "10"))
        .and(query_param("skip", "20"))
        .and(query_param("filter", "processing"))
        .and(query_param("sort", "modified"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pageInfo": { "pages": 3, "pageSize": 10, "results": 21, "page": 3 },
            "results": [{
                "id": 21,
                "status": 2,
                "createdAt": "2024-03-01T12:00:00.000Z",
                "updatedAt": "2024-03-02T12:00:00.000Z",
                "type": "movie",
                "media": { "id": 5, "tmdbId": 603, "status": 3, "mediaType": "movie" }
            }]
        })))
        .mount(&server)
        .await;

    let query = RequestListQuery {
        take: 10,
        skip: 20,
        filter: RequestFilter::Processing,
        sort: RequestSort::Modified,
    };
    let page = client_for(&server).requests(&query).await.unwrap();

    assert_eq!(page.page_info.results, 21);
    let (requests, rejected) = page.into_requests();
    assert!(rejected.is_empty());
    assert_eq!(requests[0].id, 21);
    assert_eq!(requests[0].media.as_ref().unwrap().status, 3);
}

#[tokio::test]
async fn listing_survives_a_record_with_a_null_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pageInfo": { "pages": 1, "pageSize": 20, "results": 2, "page": 1 },
            "results": [
                {
                    "id": 1,
                    "status": 2,
                    "createdAt": "2024-03-01T12:00:00.000Z",
                    "type": "movie",
                    "media": { "id": 5, "tmdbId": 603, "status": 5, "mediaType": "movie" }
                },
                {
                    "id": 2,
                    "status": 2,
                    "createdAt": "2024-03-02T12:00:00.000Z",
                    "type": "movie",
                    "media": { "id": 6, "tmdbId": 550, "status": null, "mediaType": "movie" }
                }
            ]
        })))
        .mount(&server)
        .await;

    let query = RequestListQuery {
        take: 20,
        skip: 0,
        filter: RequestFilter::All,
        sort: RequestSort::Added,
    };
    let page = client_for(&server).requests(&query).await.unwrap();
    let (requests, rejected) = page.into_requests();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].id, 1);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].request_id, Some(2));
}

#[tokio::test]
async fn error_envelope_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/movie/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Unable to retrieve movie."
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).movie(1).await.unwrap_err();

    let ClientError::Upstream(upstream) = err else {
        panic!("expected upstream error, got {err:?}");
    };
    assert_eq!(upstream.status, 404);
    assert_eq!(upstream.message, "Unable to retrieve movie.");
}

#[tokio::test]
async fn plain_error_body_becomes_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tv/1399/season/1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden by policy"))
        .mount(&server)
        .await;

    let err = client_for(&server).season(1399, 1).await.unwrap_err();

    let ClientError::Upstream(upstream) = err else {
        panic!("expected upstream error, got {err:?}");
    };
    assert_eq!(upstream.status, 403);
    assert_eq!(upstream.message, "Forbidden by policy");
}

#[tokio::test]
async fn parses_tv_detail_with_media_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tv/1399"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1399,
            "name": "Game of Thrones",
            "seasons": [
                { "id": 3624, "seasonNumber": 1, "episodeCount": 10 },
                { "id": 3625, "seasonNumber": 2, "episodeCount": 10 }
            ],
            "mediaInfo": {
                "status": 4,
                "seasons": [
                    { "seasonNumber": 1, "status": 5 },
                    { "seasonNumber": 2, "status": 3 }
                ]
            }
        })))
        .mount(&server)
        .await;

    let show = client_for(&server).tv(1399).await.unwrap();

    assert_eq!(show.name.as_deref(), Some("Game of Thrones"));
    assert_eq!(show.seasons.len(), 2);
    assert_eq!(show.media_info.unwrap().seasons[1].status, 3);
}
