#![allow(missing_docs)]

mod support;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use omni_repost::{
    DeliveryChannel, DeliveryError, Document, MediaItem, MediaKind, SendStep, TelegramChannel,
};
use tokio::sync::Mutex;

use support::spawn_test_server;

const SKIP_MESSAGE: &str = "skipping telegram mock api tests: local socket bind is not permitted";

#[derive(Clone, Debug)]
struct JsonCall {
    method: String,
    payload: serde_json::Value,
}

#[derive(Clone, Default)]
struct MockTelegramState {
    calls: Arc<Mutex<Vec<JsonCall>>>,
    /// Scripted error replies consumed before answering `ok`.
    failures: Arc<Mutex<VecDeque<(StatusCode, serde_json::Value)>>>,
}

async fn handle_json_method(
    Path(method): Path<String>,
    State(state): State<MockTelegramState>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.calls.lock().await.push(JsonCall { method, payload });
    if let Some((status, body)) = state.failures.lock().await.pop_front() {
        return (status, Json(body));
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({"ok": true, "result": {"message_id": 1}})),
    )
}

async fn spawn_mock_telegram_api(
    failures: Vec<(StatusCode, serde_json::Value)>,
) -> Result<Option<(String, MockTelegramState, tokio::task::JoinHandle<()>)>> {
    let state = MockTelegramState {
        calls: Arc::new(Mutex::new(Vec::new())),
        failures: Arc::new(Mutex::new(failures.into())),
    };
    let app = Router::new()
        .route("/botfake-token/{method}", post(handle_json_method))
        .with_state(state.clone());
    spawn_test_server(app, state, SKIP_MESSAGE).await
}

#[derive(Clone, Debug)]
struct UploadCall {
    method: String,
    field_names: Vec<String>,
    file_names: Vec<String>,
    media_json: Option<serde_json::Value>,
}

#[derive(Clone, Default)]
struct MockTelegramUploadState {
    calls: Arc<Mutex<Vec<UploadCall>>>,
}

async fn handle_upload(
    Path(method): Path<String>,
    State(state): State<MockTelegramUploadState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut field_names = Vec::new();
    let mut file_names = Vec::new();
    let mut media_json = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if let Some(file_name) = field.file_name() {
            file_names.push(file_name.to_string());
        }
        if name == "media"
            && let Ok(value) = field.text().await
        {
            media_json = serde_json::from_str::<serde_json::Value>(&value).ok();
        }
        field_names.push(name);
    }

    state.calls.lock().await.push(UploadCall {
        method,
        field_names,
        file_names,
        media_json,
    });
    (
        StatusCode::OK,
        Json(serde_json::json!({"ok": true, "result": {"message_id": 1}})),
    )
}

async fn spawn_mock_telegram_upload_api()
-> Result<Option<(String, MockTelegramUploadState, tokio::task::JoinHandle<()>)>> {
    let state = MockTelegramUploadState::default();
    let app = Router::new()
        .route("/botfake-token/{method}", post(handle_upload))
        .with_state(state.clone());
    spawn_test_server(app, state, SKIP_MESSAGE).await
}

fn channel(base_url: &str) -> TelegramChannel {
    TelegramChannel::new_with_base_url("fake-token", "@news", base_url)
}

#[test]
fn telegram_channel_name() {
    let channel = TelegramChannel::new("fake-token", "@news");
    assert_eq!(channel.name(), "telegram");
    assert_eq!(channel.chat_id(), "@news");
}

#[tokio::test]
async fn text_message_uses_html_parse_mode() -> Result<()> {
    let Some((base_url, state, handle)) = spawn_mock_telegram_api(Vec::new()).await? else {
        return Ok(());
    };

    channel(&base_url)
        .send_step(&SendStep::text("<b>hi</b>"))
        .await?;

    let calls = state.calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "sendMessage");
    assert_eq!(calls[0].payload["chat_id"], "@news");
    assert_eq!(calls[0].payload["text"], "<b>hi</b>");
    assert_eq!(calls[0].payload["parse_mode"], "HTML");

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn single_media_steps_map_to_photo_and_video_methods() -> Result<()> {
    let Some((base_url, state, handle)) = spawn_mock_telegram_api(Vec::new()).await? else {
        return Ok(());
    };
    let channel = channel(&base_url);

    channel
        .send_step(&SendStep::SinglePhoto {
            url: "https://img/1.jpg".to_string(),
            caption: Some("caption".to_string()),
        })
        .await?;
    channel
        .send_step(&SendStep::SingleVideo {
            url: "https://v/1.mp4".to_string(),
            caption: None,
        })
        .await?;

    let calls = state.calls.lock().await;
    assert_eq!(calls[0].method, "sendPhoto");
    assert_eq!(calls[0].payload["photo"], "https://img/1.jpg");
    assert_eq!(calls[0].payload["caption"], "caption");
    assert_eq!(calls[0].payload["parse_mode"], "HTML");
    assert_eq!(calls[1].method, "sendVideo");
    assert_eq!(calls[1].payload["video"], "https://v/1.mp4");
    assert!(calls[1].payload.get("caption").is_none());

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn media_group_captions_first_item_only() -> Result<()> {
    let Some((base_url, state, handle)) = spawn_mock_telegram_api(Vec::new()).await? else {
        return Ok(());
    };
    let mut first = MediaItem::new(MediaKind::Photo, "https://img/1.jpg");
    first.caption = Some("group caption".to_string());
    let step = SendStep::MediaGroup {
        items: vec![first, MediaItem::new(MediaKind::Video, "https://v/2.mp4")],
    };

    channel(&base_url).send_step(&step).await?;

    let calls = state.calls.lock().await;
    assert_eq!(calls[0].method, "sendMediaGroup");
    let media = calls[0].payload["media"].as_array().unwrap();
    assert_eq!(media.len(), 2);
    assert_eq!(media[0]["type"], "photo");
    assert_eq!(media[0]["caption"], "group caption");
    assert_eq!(media[0]["parse_mode"], "HTML");
    assert_eq!(media[1]["type"], "video");
    assert!(media[1].get("caption").is_none());

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn rate_limit_maps_to_retry_after() -> Result<()> {
    let failures = vec![(
        StatusCode::TOO_MANY_REQUESTS,
        serde_json::json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 12",
            "parameters": {"retry_after": 12}
        }),
    )];
    let Some((base_url, _state, handle)) = spawn_mock_telegram_api(failures).await? else {
        return Ok(());
    };

    let error = channel(&base_url)
        .send_step(&SendStep::text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DeliveryError::RateLimited { retry_after, .. } if retry_after == Duration::from_secs(12)
    ));

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn bad_request_is_transient_and_forbidden_is_permanent() -> Result<()> {
    let failures = vec![
        (
            StatusCode::BAD_REQUEST,
            serde_json::json!({"ok": false, "error_code": 400, "description": "Bad Request: wrong file"}),
        ),
        (
            StatusCode::FORBIDDEN,
            serde_json::json!({"ok": false, "error_code": 403, "description": "Forbidden: bot was kicked"}),
        ),
    ];
    let Some((base_url, _state, handle)) = spawn_mock_telegram_api(failures).await? else {
        return Ok(());
    };
    let channel = channel(&base_url);

    let first = channel.send_step(&SendStep::text("a")).await.unwrap_err();
    assert!(matches!(first, DeliveryError::Transient(ref detail) if detail.contains("wrong file")));
    let second = channel.send_step(&SendStep::text("b")).await.unwrap_err();
    assert!(matches!(second, DeliveryError::Permanent(_)));
    assert!(channel.send_step(&SendStep::text("c")).await.is_ok());

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn document_group_uploads_attach_parts() -> Result<()> {
    let Some((base_url, state, handle)) = spawn_mock_telegram_upload_api().await? else {
        return Ok(());
    };
    let dir = tempfile::tempdir()?;
    let first = dir.path().join("report.pdf");
    let second = dir.path().join("slides.pptx");
    std::fs::write(&first, b"pdf")?;
    std::fs::write(&second, b"pptx")?;

    channel(&base_url)
        .send_step(&SendStep::DocumentGroup {
            items: vec![
                Document {
                    title: "report".to_string(),
                    local_path: first,
                },
                Document {
                    title: "slides".to_string(),
                    local_path: second,
                },
            ],
        })
        .await?;

    let calls = state.calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "sendMediaGroup");
    assert_eq!(calls[0].field_names, vec!["chat_id", "media", "file0", "file1"]);
    assert_eq!(calls[0].file_names, vec!["report.pdf", "slides.pptx"]);
    let media = calls[0].media_json.as_ref().unwrap().as_array().unwrap();
    assert_eq!(media[0]["type"], "document");
    assert_eq!(media[0]["media"], "attach://file0");
    assert_eq!(media[1]["media"], "attach://file1");

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn single_document_uses_send_document() -> Result<()> {
    let Some((base_url, state, handle)) = spawn_mock_telegram_upload_api().await? else {
        return Ok(());
    };
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"notes")?;

    channel(&base_url)
        .send_step(&SendStep::DocumentGroup {
            items: vec![Document {
                title: "notes".to_string(),
                local_path: path,
            }],
        })
        .await?;

    let calls = state.calls.lock().await;
    assert_eq!(calls[0].method, "sendDocument");
    assert_eq!(calls[0].field_names, vec!["chat_id", "document"]);

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn unreadable_document_is_permanent() {
    let channel = TelegramChannel::new_with_base_url("fake-token", "@news", "http://127.0.0.1:9");
    let error = channel
        .send_step(&SendStep::DocumentGroup {
            items: vec![Document {
                title: "gone".to_string(),
                local_path: "/definitely/not/here.pdf".into(),
            }],
        })
        .await
        .unwrap_err();
    assert!(matches!(error, DeliveryError::Permanent(_)));
}
