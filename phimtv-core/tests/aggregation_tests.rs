//! Integration tests for the aggregation and sync layers
//!
//! Drives the real provider adapters against wiremock upstreams and the
//! HTTP history store against a wiremock backend.
//!
//! Run with: cargo test --test aggregation_tests

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use phimtv_core::config::{ProviderEndpoint, ProvidersConfig, SyncConfig};
use phimtv_core::models::SessionContext;
use phimtv_core::provider::{
    Catalog, ContentProvider, KkPhimProvider, NguonCProvider, OPhimProvider,
};
use phimtv_core::service::{
    CatalogAggregator, HistoryStore, HttpHistoryStore, ProgressSyncClient,
};

fn endpoint(server: &MockServer) -> ProviderEndpoint {
    ProviderEndpoint {
        base_url: server.uri(),
        image_base: "https://phimimg.com/".to_string(),
    }
}

fn aggregator_config() -> ProvidersConfig {
    ProvidersConfig {
        request_timeout_seconds: 1,
        ..ProvidersConfig::default()
    }
}

fn kkphim_detail_body() -> serde_json::Value {
    json!({
        "status": true,
        "msg": "",
        "movie": {
            "_id": "kk-1",
            "name": "Tây Du Ký",
            "slug": "tay-du-ky",
            "origin_name": "Journey to the West",
            "content": "Bốn thầy trò sang Tây Thiên thỉnh kinh.",
            "year": 1986,
            "quality": "FHD",
            "lang": "Vietsub",
            "time": "45 phút/tập",
            "thumb_url": "upload/tay-du-ky-thumb.jpg",
            "poster_url": "https://phimimg.com/upload/tay-du-ky-poster.jpg",
            "episode_current": "Hoàn tất (25/25)",
            "episode_total": "25",
            "category": [{"id": "1", "name": "Cổ Trang", "slug": "co-trang"}],
            "country": [{"id": "2", "name": "Trung Quốc", "slug": "trung-quoc"}]
        },
        "episodes": [
            {"server_name": "Vietsub #1", "server_data": [
                {"name": "Tập 01", "slug": "tap-01", "filename": "", "link_embed": "https://e/kk/1", "link_m3u8": "https://m/kk/1.m3u8"},
                {"name": "Tập 02", "slug": "tap-02", "filename": "", "link_embed": "https://e/kk/2", "link_m3u8": "https://m/kk/2.m3u8"}
            ]},
            {"server_name": "Lồng Tiếng #1", "server_data": [
                {"name": "Tập 01", "slug": "tap-01", "filename": "", "link_embed": "https://e/kk/lt1", "link_m3u8": "https://m/kk/lt1.m3u8"}
            ]}
        ]
    })
}

fn ophim_detail_body() -> serde_json::Value {
    json!({
        "status": true,
        "msg": "",
        "movie": {
            "_id": "op-9",
            "name": "Tây Du Ký (OPhim)",
            "slug": "tay-du-ky",
            "origin_name": "Journey to the West",
            "content": "Bản mô tả khác.",
            "year": 1986,
            "quality": "HD",
            "lang": "Vietsub",
            "time": "45 phút/tập",
            "thumb_url": "tay-du-ky-thumb.jpg",
            "poster_url": "tay-du-ky-poster.jpg",
            "episode_current": "Hoàn tất (25/25)",
            "episode_total": "25",
            "category": [],
            "country": []
        },
        "episodes": [
            {"server_name": "Vietsub #1", "server_data": [
                {"name": "Tập 01", "slug": "tap-01", "filename": "", "link_embed": "https://e/op/1", "link_m3u8": "https://m/op/1.m3u8"}
            ]}
        ]
    })
}

async fn mount_detail(server: &MockServer, url_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Providers in priority order against three mock upstreams.
async fn build_aggregator(
    kkphim: &MockServer,
    ophim: &MockServer,
    nguonc: &MockServer,
) -> CatalogAggregator {
    let providers: Vec<Arc<dyn ContentProvider>> = vec![
        Arc::new(KkPhimProvider::new(&endpoint(kkphim))),
        Arc::new(OPhimProvider::new(&endpoint(ophim))),
        Arc::new(NguonCProvider::new(&ProviderEndpoint {
            base_url: nguonc.uri(),
            image_base: String::new(),
        })),
    ];
    CatalogAggregator::new(providers, &aggregator_config())
}

#[tokio::test]
async fn test_detail_merges_servers_from_all_responsive_providers() {
    let kkphim = MockServer::start().await;
    let ophim = MockServer::start().await;
    let nguonc = MockServer::start().await;

    mount_detail(&kkphim, "/phim/tay-du-ky", kkphim_detail_body()).await;
    mount_detail(&ophim, "/phim/tay-du-ky", ophim_detail_body()).await;
    // NguonC knows nothing about this movie
    Mock::given(method("GET"))
        .and(path("/film/tay-du-ky"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&nguonc)
        .await;

    let aggregator = build_aggregator(&kkphim, &ophim, &nguonc).await;
    let detail = aggregator
        .movie_detail("tay-du-ky")
        .await
        .expect("two providers responded");

    // base metadata from the highest-priority provider
    assert_eq!(detail.movie.name, "Tây Du Ký");
    assert_eq!(detail.movie.id, "kk-1");
    // relative thumb resolved against the provider image base
    assert_eq!(
        detail.movie.thumb_url,
        "https://phimimg.com/upload/tay-du-ky-thumb.jpg"
    );

    // merge, don't choose: 2 groups from KKPhim + 1 from OPhim
    assert_eq!(detail.servers.len(), 3);
    let tags: Vec<String> = detail.servers.iter().map(|s| s.provider_tag.clone()).collect();
    assert_eq!(tags, vec!["KKPhim #1", "KKPhim #2", "OPhim #1"]);

    // provider tags keep identically-named servers distinguishable
    let tagged: std::collections::HashSet<String> =
        detail.servers.iter().map(|s| s.tagged_name()).collect();
    assert_eq!(tagged.len(), 3);
}

#[tokio::test]
async fn test_detail_returns_none_when_every_provider_fails() {
    let kkphim = MockServer::start().await;
    let ophim = MockServer::start().await;
    let nguonc = MockServer::start().await;

    for server in [&kkphim, &ophim, &nguonc] {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;
    }

    let aggregator = build_aggregator(&kkphim, &ophim, &nguonc).await;
    assert!(aggregator.movie_detail("tay-du-ky").await.is_none());
}

#[tokio::test]
async fn test_slow_provider_is_dropped_not_fatal() {
    let kkphim = MockServer::start().await;
    let ophim = MockServer::start().await;
    let nguonc = MockServer::start().await;

    mount_detail(&kkphim, "/phim/tay-du-ky", kkphim_detail_body()).await;
    // OPhim stalls past the per-provider timeout
    Mock::given(method("GET"))
        .and(path("/phim/tay-du-ky"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ophim_detail_body())
                .set_delay(Duration::from_millis(2_500)),
        )
        .mount(&ophim)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&nguonc)
        .await;

    let aggregator = build_aggregator(&kkphim, &ophim, &nguonc).await;
    let detail = aggregator
        .movie_detail("tay-du-ky")
        .await
        .expect("fast provider still answers");
    assert_eq!(detail.servers.len(), 2);
    assert!(detail.servers.iter().all(|s| s.provider_tag.starts_with("KKPhim")));
}

#[tokio::test]
async fn test_list_dedupes_by_slug_with_priority_order() {
    let kkphim = MockServer::start().await;
    let ophim = MockServer::start().await;
    let nguonc = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/danh-sach/phim-le"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "items": [
                {"_id": "a", "name": "Phim A (KK)", "slug": "phim-a", "thumb_url": "a.jpg", "poster_url": "a.jpg"},
                {"_id": "b", "name": "Phim B", "slug": "phim-b", "thumb_url": "b.jpg", "poster_url": "b.jpg"}
            ],
            "pathImage": "https://phimimg.com/"
        })))
        .mount(&kkphim)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/api/danh-sach/phim-le"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "items": [
                    {"_id": "a2", "name": "Phim A (OP)", "slug": "phim-a", "thumb_url": "a.jpg", "poster_url": "a.jpg"},
                    {"_id": "c", "name": "Phim C", "slug": "phim-c", "thumb_url": "c.jpg", "poster_url": "c.jpg"}
                ],
                "APP_DOMAIN_CDN_IMAGE": "https://img.ophim.live/uploads/movies",
                "params": {"pagination": {"currentPage": 1, "totalPages": 1}}
            }
        })))
        .mount(&ophim)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&nguonc)
        .await;

    let aggregator = build_aggregator(&kkphim, &ophim, &nguonc).await;
    let movies = aggregator
        .movie_list(&Catalog::List("phim-le".to_string()), 1, 24)
        .await;

    let slugs: Vec<&str> = movies.iter().map(|m| m.slug.as_str()).collect();
    assert_eq!(slugs, vec!["phim-a", "phim-b", "phim-c"]);
    // the earlier-priority provider's record wins the collision
    assert_eq!(movies[0].name, "Phim A (KK)");
    // OPhim's relative image resolved against its advertised base
    assert_eq!(
        movies[2].thumb_url,
        "https://img.ophim.live/uploads/movies/c.jpg"
    );
}

#[tokio::test]
async fn test_nguonc_shape_contributes_server_groups() {
    let kkphim = MockServer::start().await;
    let ophim = MockServer::start().await;
    let nguonc = MockServer::start().await;

    for server in [&kkphim, &ophim] {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;
    }
    mount_detail(
        &nguonc,
        "/film/tay-du-ky",
        json!({
            "status": "success",
            "movie": {
                "id": "ng-3",
                "name": "Tây Du Ký",
                "slug": "tay-du-ky",
                "original_name": "Journey to the West",
                "description": "Mô tả.",
                "thumb_url": "https://img.nguonc.com/tay-du-ky.jpg",
                "poster_url": "https://img.nguonc.com/tay-du-ky-poster.jpg",
                "quality": "HD",
                "language": "Vietsub",
                "current_episode": "25",
                "total_episodes": 25,
                "category": {
                    "2": {"group": {"name": "Thể loại"}, "list": [{"name": "Cổ Trang"}]},
                    "3": {"group": {"name": "Quốc gia"}, "list": [{"name": "Trung Quốc"}]}
                },
                "episodes": [
                    {"server_name": "Thuyết Minh #1", "items": [
                        {"name": "Tập 01", "slug": "tap-01", "embed": "https://e/ng/1", "m3u8": "https://m/ng/1.m3u8"}
                    ]}
                ]
            }
        }),
    )
    .await;

    let aggregator = build_aggregator(&kkphim, &ophim, &nguonc).await;
    let detail = aggregator.movie_detail("tay-du-ky").await.expect("nguonc responded");

    assert_eq!(detail.movie.id, "ng-3");
    assert_eq!(detail.movie.categories[0].name, "Cổ Trang");
    assert_eq!(detail.movie.countries[0].slug, "trung-quốc");
    assert_eq!(detail.servers.len(), 1);
    assert_eq!(detail.servers[0].provider_tag, "NguonC #1");
    assert_eq!(
        detail.servers[0].episodes[0].stream_url_hls.as_deref(),
        Some("https://m/ng/1.m3u8")
    );
}

#[tokio::test]
async fn test_http_history_round_trip_and_resume() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/history"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "history": [{
                "movieSlug": "tay-du-ky",
                "episodeSlug": "tap-03",
                "episode_name": "Tập 03",
                "progress": 5,
                "currentTime": 120,
                "duration": 2400,
                "timestamp": 1754600000000i64
            }]
        })))
        .mount(&backend)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/user/history"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_partial_json(json!({
            "movieSlug": "tay-du-ky",
            "episodeSlug": "tap-03",
            "progress": 130,
            "duration": 2400
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&backend)
        .await;

    let ctx = SessionContext::authenticated("u1", "tok-123");
    let store = Arc::new(
        HttpHistoryStore::new(backend.uri(), Duration::from_secs(2), ctx.clone())
            .expect("client builds"),
    );

    let sync = ProgressSyncClient::new(store.clone(), ctx, &SyncConfig::default());

    // resume comes back in milliseconds from the stored seconds
    assert_eq!(
        sync.resolve_resume_position("tay-du-ky", "tap-03").await,
        120_000
    );
    // the current entry belongs to another episode: start from zero
    assert_eq!(sync.resolve_resume_position("tay-du-ky", "tap-04").await, 0);

    // teardown flush posts the final position
    sync.flush("tay-du-ky", "tap-03", 130_000, 2_400_000).await;
}

#[tokio::test]
async fn test_http_history_unauthorized_degrades() {
    let backend = MockServer::start().await;
    let store = HttpHistoryStore::new(
        backend.uri(),
        Duration::from_secs(2),
        SessionContext::anonymous(),
    )
    .expect("client builds");

    let err = store
        .upsert("u1", phimtv_core::models::WatchHistoryEntry::new("m", "e", 1, 2))
        .await
        .expect_err("no token");
    assert!(matches!(err, phimtv_core::Error::Unauthorized));

    // and resume resolution treats that as "start at zero"
    let sync = ProgressSyncClient::new(
        Arc::new(store),
        SessionContext::anonymous(),
        &SyncConfig::default(),
    );
    assert_eq!(sync.resolve_resume_position("m", "e").await, 0);
}
