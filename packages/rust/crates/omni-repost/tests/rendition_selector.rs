#![allow(missing_docs)]

mod support;

use axum::Router;
use axum::routing::get;
use omni_repost::{HttpMetadataProbe, MetadataProbe, ProbeError, RenditionSelector, VideoCatalog};

use support::{StaticProbe, spawn_test_server};

const CEILING: u64 = 20_000_000;

fn catalog() -> VideoCatalog {
    VideoCatalog::from_files([
        ("mp4_240", "https://v/240"),
        ("mp4_1080", "https://v/1080"),
        ("mp4_480", "https://v/480"),
        ("mp4_720", "https://v/720"),
        ("hls", "https://v/hls"),
    ])
}

#[tokio::test]
async fn picks_highest_quality_under_ceiling() {
    let probe = StaticProbe::new([
        ("https://v/1080", 90_000_000),
        ("https://v/720", 45_000_000),
        ("https://v/480", 19_000_000),
        ("https://v/240", 5_000_000),
    ]);
    let selected = RenditionSelector::new(&probe, CEILING)
        .select(&catalog())
        .await
        .unwrap();

    assert_eq!(selected.url(), "https://v/480");
    assert!(!selected.exceeded_size);
    assert_eq!(selected.rendition.byte_size, Some(19_000_000));
    // Probing stops at the first fit.
    assert_eq!(
        probe.probed(),
        vec!["https://v/1080", "https://v/720", "https://v/480"]
    );
}

#[tokio::test]
async fn falls_back_to_lowest_quality_when_all_exceed() {
    let probe = StaticProbe::new([
        ("https://v/1080", 90_000_000),
        ("https://v/720", 60_000_000),
        ("https://v/480", 40_000_000),
        ("https://v/240", 25_000_000),
    ]);
    let selected = RenditionSelector::new(&probe, CEILING)
        .select(&catalog())
        .await
        .unwrap();

    assert_eq!(selected.url(), "https://v/240");
    assert!(selected.exceeded_size);
}

#[tokio::test]
async fn probe_failure_counts_as_fitting() {
    let probe = StaticProbe::new([("https://v/720", 1)]);
    let selected = RenditionSelector::new(&probe, CEILING)
        .select(&catalog())
        .await
        .unwrap();

    assert_eq!(selected.url(), "https://v/1080");
    assert!(!selected.exceeded_size);
}

#[tokio::test]
async fn empty_catalog_selects_nothing() {
    let probe = StaticProbe::default();
    let empty = VideoCatalog::from_files([("hls", "https://v/hls")]);
    assert!(
        RenditionSelector::new(&probe, CEILING)
            .select(&empty)
            .await
            .is_none()
    );
    assert!(probe.probed().is_empty());
}

#[tokio::test]
async fn head_request_reads_content_length() -> anyhow::Result<()> {
    let app = Router::new().route("/v/480.mp4", get(|| async { vec![0_u8; 1_234] }));
    let Some((base_url, (), handle)) = spawn_test_server(
        app,
        (),
        "skipping content length test: local socket bind is not permitted",
    )
    .await?
    else {
        return Ok(());
    };
    let probe = HttpMetadataProbe::new();

    assert_eq!(probe.byte_size(&format!("{base_url}/v/480.mp4")).await?, 1_234);
    assert!(matches!(
        probe.byte_size(&format!("{base_url}/v/missing.mp4")).await,
        Err(ProbeError::Status(status)) if status == reqwest::StatusCode::NOT_FOUND
    ));

    handle.abort();
    Ok(())
}
