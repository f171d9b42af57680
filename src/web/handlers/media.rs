use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, Path, State},
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::{fs::File, io::AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use crate::languages;
use crate::media::{content_type_for, MediaError, MediaStore, UploadGuard};
use crate::pipeline::TranslationResult;
use crate::relay::{RelayError, UploadRequest};
use crate::AppContext;

pub fn media_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/download/:filename", get(download))
        .with_state(ctx)
}

/// Multipart fields collected so far. The stored file is removed if the
/// form is dropped before it reaches the relay.
#[derive(Default)]
struct UploadForm {
    file: Option<(UploadGuard, Option<String>, Option<String>)>,
    target_lang: Option<String>,
}

async fn upload(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<TranslationResult>, RelayError> {
    ctx.relay.admit()?;

    let media = ctx.relay.media();
    let mut form = UploadForm::default();
    read_form(media, &mut multipart, &mut form).await?;

    let Some((upload, original_name, content_type)) = form.file else {
        // a lone target_lang field with no file
        return Err(RelayError::NoFileProvided);
    };
    let target_lang = languages::resolve_target(form.target_lang.as_deref()).to_string();

    // an invalid token never blocks the upload
    let user = match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(header) => match ctx.auth.authenticate(Some(header)).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring credentials on upload: {}", e);
                None
            }
        },
        None => None,
    };

    // the relay owns cleanup from here on
    let request = UploadRequest {
        original_name,
        content_type,
        stored: upload.keep(),
        target_lang,
    };
    let mut result = ctx.relay.translate(request.clone()).await?;

    if let Some(user) = user {
        match ctx.history.record_upload(&user.id, &request, &result).await {
            Ok(Some(record)) => result.insert("translation_id", Value::String(record.id)),
            Ok(None) => {}
            Err(e) => warn!("Failed to record translation for {}: {}", user.id, e),
        }
    }

    Ok(Json(result))
}

async fn read_form(
    media: &MediaStore,
    multipart: &mut Multipart,
    form: &mut UploadForm,
) -> Result<(), RelayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::Multipart(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") if form.file.is_none() => {
                let original_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let (stored, file) = media.create_upload(original_name.as_deref()).await?;
                form.file = Some((UploadGuard::new(stored.clone()), original_name, content_type));

                let size = write_field(field, file).await?;
                info!("Stored upload {} ({} bytes)", stored.name, size);
            }
            Some("target_lang") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| RelayError::Multipart(e.to_string()))?;
                form.target_lang = Some(value);
            }
            _ => {}
        }
    }
    Ok(())
}

async fn write_field(mut field: Field<'_>, mut file: File) -> Result<u64, RelayError> {
    let mut written = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| RelayError::Multipart(e.to_string()))?
    {
        file.write_all(&chunk).await.map_err(MediaError::from)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(MediaError::from)?;
    Ok(written)
}

async fn download(
    State(ctx): State<Arc<AppContext>>,
    Path(filename): Path<String>,
) -> Result<Response, MediaError> {
    let path = ctx.relay.media().resolve_output(&filename).await?;
    let file = File::open(&path)
        .await
        .map_err(|_| MediaError::FileNotFound(filename.clone()))?;

    info!("Serving {}", path.display());
    let headers = [
        (CONTENT_TYPE, content_type_for(&path).to_string()),
        (CONTENT_DISPOSITION, format!("inline; filename=\"{}\"", filename)),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
