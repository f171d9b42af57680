use super::*;
use crate::config::AppConfig;
use crate::pipeline::{PipelineError, TranslationPipeline, TranslationResult};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "translanova-test-boundary";

// 测试用翻译管道：把结果写进输出目录，"ur" 一律失败
struct FakePipeline {
    output_dir: PathBuf,
    runs: AtomicUsize,
}

#[async_trait]
impl TranslationPipeline for FakePipeline {
    async fn translate(&self, input_path: &Path, target_lang: &str) -> Result<TranslationResult, PipelineError> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst);
        if target_lang == "ur" {
            return Err(PipelineError::ExternalProcessFailed {
                exit_code: 1,
                stderr: "model missing".to_string(),
            });
        }

        let output = format!("translated_audio_{}.mp3", run);
        let bytes = tokio::fs::read(input_path).await?;
        tokio::fs::write(self.output_dir.join(&output), bytes).await?;

        Ok(serde_json::from_value(json!({
            "success": true,
            "audio_file": output,
            "original_transcript": "hello",
            "whisper_english": "hello",
            "final_translation": format!("hello in {}", target_lang),
            "translation_time": 1.5,
            "accuracy": { "overall": 91.0 }
        }))
        .map_err(|e| PipelineError::MalformedResult(e.to_string()))?)
    }
}

async fn setup_test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        upload_dir: dir.path().join("uploads"),
        output_dir: dir.path().join("translated_files"),
        upload_rate_per_minute: 0,
        ..AppConfig::default()
    };
    let pipeline = Arc::new(FakePipeline {
        output_dir: config.output_dir.clone(),
        runs: AtomicUsize::new(0),
    });

    let ctx = AppContext::build(config, pipeline).await.unwrap();
    (router(Arc::new(ctx)), dir)
}

fn multipart_body(file: Option<(&str, &[u8])>, target_lang: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(lang) = target_lang {
        body.extend_from_slice(format!(
            "--{}\r\nContent-Disposition: form-data; name=\"target_lang\"\r\n\r\n{}\r\n",
            BOUNDARY, lang
        ).as_bytes());
    }
    if let Some((name, bytes)) = file {
        body.extend_from_slice(format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: audio/mpeg\r\n\r\n",
            BOUNDARY, name
        ).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_health_and_languages() {
    let (app, _dir) = setup_test_app().await;

    let (status, body) = send(&app, get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Translation server is running");
    assert_eq!(body["languages_available"], 23);

    let (status, body) = send(&app, get_request("/languages", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_object().unwrap().len(), 23);
    assert_eq!(body["Bhojpuri"], "bho");
    assert_eq!(body["Chinese (Simplified)"], "zh-CN");
}

#[tokio::test]
async fn test_cors_headers() {
    let (app, _dir) = setup_test_app().await;

    let req = Request::builder()
        .uri("/languages")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/upload")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(preflight).await.unwrap();
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_upload_without_file() {
    let (app, dir) = setup_test_app().await;

    let (status, body) = send(&app, upload_request(multipart_body(None, Some("ta")), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No file uploaded" }));
    assert_eq!(count_files(&dir.path().join("uploads")), 0);
}

#[tokio::test]
async fn test_upload_translates_and_serves_output() {
    let (app, dir) = setup_test_app().await;

    let (status, body) = send(&app, upload_request(multipart_body(Some(("clip.mp3", b"ID3 audio")), None), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["final_translation"], "hello in hi");
    assert_eq!(body["accuracy"]["overall"], 91.0);
    assert!(body.get("translation_id").is_none());
    assert_eq!(count_files(&dir.path().join("uploads")), 1);

    let output = body["audio_file"].as_str().unwrap();
    let resp = app.clone().oneshot(get_request(&format!("/download/{}", output), None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        format!("inline; filename=\"{}\"", output).as_str()
    );
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ID3 audio");
}

#[tokio::test]
async fn test_upload_failure_removes_file() {
    let (app, dir) = setup_test_app().await;

    let body = multipart_body(Some(("clip.mp3", b"audio")), Some("ur"));
    let (status, body) = send(&app, upload_request(body, None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Translation failed", "details": "model missing" }));
    assert_eq!(count_files(&dir.path().join("uploads")), 0);

    let body = multipart_body(Some(("clip.mp3", b"audio")), Some("tlh"));
    let (status, body) = send(&app, upload_request(body, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported target language: tlh");
    assert_eq!(count_files(&dir.path().join("uploads")), 0);
}

#[tokio::test]
async fn test_download_rejects_unknown_and_traversal() {
    let (app, dir) = setup_test_app().await;
    std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();

    for uri in ["/download/missing.mp4", "/download/..%2Fsecret.txt", "/download/.."] {
        let (status, body) = send(&app, get_request(uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, json!({ "error": "File not found" }));
    }
}

#[tokio::test]
async fn test_account_and_history_flow() {
    let (app, _dir) = setup_test_app().await;

    // 注册
    let register = json!({ "username": "meera", "email": "meera@example.com", "password": "s3cret" });
    let (status, body) = send(&app, json_request("POST", "/api/auth/register", register.clone(), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "meera");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = send(&app, json_request("POST", "/api/auth/register", register, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");

    // 登录
    let login = json!({ "email": "meera@example.com", "password": "s3cret" });
    let (status, body) = send(&app, json_request("POST", "/api/auth/login", login, None)).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let bad_login = json!({ "email": "meera@example.com", "password": "wrong" });
    let (status, body) = send(&app, json_request("POST", "/api/auth/login", bad_login, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    // 个人资料
    let (status, body) = send(&app, get_request("/api/user/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Please authenticate");

    let (status, body) = send(&app, get_request("/api/user/profile", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let update = json!({ "username": "meera_s" });
    let (status, body) = send(&app, json_request("PUT", "/api/user/profile", update, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "meera_s");

    let (_, body) = send(&app, get_request("/api/user/profile", Some(&token))).await;
    assert_eq!(body["username"], "meera_s");
    assert_eq!(body["email"], "meera@example.com");

    // 翻译记录
    let (status, _) = send(&app, json_request("POST", "/api/translations", json!({ "originalFile": "a.mp3" }), Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let manual = json!({
        "originalFile": "song.mp3",
        "translatedFile": "translated_audio_manual.mp3",
        "targetLanguage": "fr"
    });
    let (status, body) = send(&app, json_request("POST", "/api/translations", manual, Some(&token))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["targetLanguage"], "fr");

    let upload = multipart_body(Some(("talk.mp3", b"audio")), Some("ta"));
    let (status, body) = send(&app, upload_request(upload, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let translation_id = body["translation_id"].as_str().unwrap().to_string();

    // an invalid token does not block an upload
    let upload = multipart_body(Some(("talk.mp3", b"audio")), Some("ta"));
    let (status, body) = send(&app, upload_request(upload, Some("garbage"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("translation_id").is_none());

    let (status, body) = send(&app, get_request("/api/translations", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let translations = body["translations"].as_array().unwrap();
    assert_eq!(translations.len(), 2);
    assert_eq!(translations[0]["id"], translation_id.as_str());
    assert_eq!(translations[0]["originalFile"], "talk.mp3");
    assert_eq!(translations[0]["targetLanguage"], "ta");

    let (_, body) = send(&app, get_request("/api/translations?index=2&size=1", Some(&token))).await;
    assert_eq!(body["translations"][0]["originalFile"], "song.mp3");

    // an out-of-range page falls back to the first one
    let uri = format!("/api/translations?index={}&size=100", u64::MAX);
    let (status, body) = send(&app, get_request(&uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["translations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_over_http() {
    let (app, _dir) = setup_test_app().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let part = reqwest::multipart::Part::bytes(b"RIFF wav data".to_vec())
        .file_name("lecture.wav")
        .mime_str("audio/wav")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .part("file", part)
        .text("target_lang", "bn");

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{}/upload", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["final_translation"], "hello in bn");

    let download = client
        .get(format!("http://{}/download/{}", addr, body["audio_file"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(download.status(), reqwest::StatusCode::OK);
    assert_eq!(download.bytes().await.unwrap().as_ref(), b"RIFF wav data");
}
