use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tracing::{info, warn};

const MAX_NAME_ATTEMPTS: usize = 16;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not find a free upload name after {0} attempts")]
    NameExhausted(usize),

    #[error("file not found: {0}")]
    FileNotFound(String),
}

/// An upload persisted under the uploads directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
}

/// The two directories the relay works with: incoming uploads and the
/// script's translated outputs.
#[derive(Debug, Clone)]
pub struct MediaStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl MediaStore {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn ensure_dirs(&self) -> Result<(), MediaError> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Creates a new, empty upload file named `<millis>-<random>.<ext>`.
    ///
    /// The file is opened with create-new semantics, so two uploads landing
    /// in the same millisecond with the same random draw still get
    /// different names.
    pub async fn create_upload(&self, original_name: Option<&str>) -> Result<(StoredFile, File), MediaError> {
        fs::create_dir_all(&self.upload_dir).await?;
        let extension = original_name.and_then(extension_of);

        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = generate_upload_name(extension.as_deref());
            let path = self.upload_dir.join(&name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((StoredFile { name, path }, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(MediaError::NameExhausted(MAX_NAME_ATTEMPTS))
    }

    /// Resolves a download name inside the output directory. Only a single
    /// plain file name is accepted; separators, `..` and absolute paths are
    /// treated as missing files.
    pub async fn resolve_output(&self, filename: &str) -> Result<PathBuf, MediaError> {
        if !is_plain_file_name(filename) {
            warn!("Rejected download name {:?}", filename);
            return Err(MediaError::FileNotFound(filename.to_string()));
        }

        let path = self.output_dir.join(filename);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(MediaError::FileNotFound(filename.to_string())),
        }
    }
}

/// Deletes an upload when dropped, unless `keep` was called first. This
/// also covers request futures that are dropped halfway through.
#[derive(Debug)]
pub struct UploadGuard {
    stored: StoredFile,
    armed: bool,
}

impl UploadGuard {
    pub fn new(stored: StoredFile) -> Self {
        Self { stored, armed: true }
    }

    pub fn stored(&self) -> &StoredFile {
        &self.stored
    }

    pub fn keep(mut self) -> StoredFile {
        self.armed = false;
        self.stored.clone()
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.stored.path) {
            Ok(()) => info!("Removed upload {}", self.stored.name),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove upload {}: {}", self.stored.path.display(), e),
        }
    }
}

fn generate_upload_name(extension: Option<&str>) -> String {
    let millis = Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    match extension {
        Some(ext) => format!("{}-{}.{}", millis, random, ext),
        None => format!("{}-{}", millis, random),
    }
}

fn extension_of(original_name: &str) -> Option<String> {
    // browsers may send a full client path
    let base = original_name.rsplit(|c: char| c == '/' || c == '\\').next()?;
    Path::new(base)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
}

fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains('\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Content type for a translated output, by extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
