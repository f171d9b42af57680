use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{extract_result, PipelineError, ProcessInvocation, TranslationPipeline, TranslationResult};
use crate::config::AppConfig;

/// Runs `<interpreter> <script> <input> <lang>` and scrapes its stdout.
#[derive(Debug, Clone)]
pub struct SubprocessPipeline {
    interpreter: String,
    script: String,
    working_dir: PathBuf,
    timeout: Duration,
}

impl SubprocessPipeline {
    pub fn new(
        interpreter: impl Into<String>,
        script: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            working_dir: working_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.interpreter.clone(),
            config.script.clone(),
            config.working_dir.clone(),
            config.job_timeout,
        )
    }

    fn invocation(&self, input_path: &Path, target_lang: &str) -> ProcessInvocation {
        ProcessInvocation::new(self.interpreter.clone(), self.working_dir.clone())
            .arg(self.script.clone())
            .arg(input_path.to_string_lossy())
            .arg(target_lang)
    }
}

#[async_trait]
impl TranslationPipeline for SubprocessPipeline {
    async fn translate(
        &self,
        input_path: &Path,
        target_lang: &str,
    ) -> Result<TranslationResult, PipelineError> {
        // the script resolves paths against its own working directory
        let input_path = std::path::absolute(input_path)?;
        info!("Translating {} to {}", input_path.display(), target_lang);

        let outcome = self.invocation(&input_path, target_lang).run(self.timeout).await?;
        if outcome.exit_code != 0 {
            warn!(
                "Translation script exited with code {}: {}",
                outcome.exit_code,
                outcome.stderr.trim_end()
            );
        }

        extract_result(&outcome)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    fn fake_script(dir: &Path, body: &str) -> String {
        let path = dir.join("translate_file.sh");
        fs::write(&path, body).unwrap();
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_translates_with_fake_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_script(
            dir.path(),
            r#"echo "Processing: $1"
echo "Target language: $2"
echo "Loading model..." >&2
printf '{"success": true, "audio_file": "translated_audio_ab12cd34.mp3", "target_language": "%s"}\n' "$2"
"#,
        );

        let pipeline = SubprocessPipeline::new("sh", script, dir.path(), Duration::from_secs(10));
        let result = pipeline
            .translate(Path::new("uploads/1700000000000-42.mp3"), "ta")
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.output_file(), Some("translated_audio_ab12cd34.mp3"));
        assert_eq!(result.fields()["target_language"], "ta");
    }

    #[tokio::test]
    async fn test_relative_input_outside_working_dir() {
        // upload dir relative to the server cwd, script running elsewhere
        let uploads = tempfile::tempdir_in(".").unwrap();
        let relative = uploads.path().strip_prefix(".").unwrap_or(uploads.path()).join("clip.mp3");
        assert!(relative.is_relative());
        fs::write(&relative, b"audio").unwrap();

        let workdir = tempfile::tempdir().unwrap();
        let script = fake_script(
            workdir.path(),
            r#"test -f "$1" || { echo "missing $1" >&2; exit 1; }
printf '{"success": true, "input": "%s"}\n' "$1"
"#,
        );

        let pipeline = SubprocessPipeline::new("sh", script, workdir.path(), Duration::from_secs(10));
        let result = pipeline.translate(&relative, "hi").await.unwrap();

        assert!(result.success());
        let input = result.fields()["input"].as_str().unwrap();
        assert!(Path::new(input).is_absolute());
        assert!(input.ends_with("clip.mp3"));
    }

    #[tokio::test]
    async fn test_failed_script_surfaces_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_script(dir.path(), "echo 'File not found: x' >&2\nexit 1\n");

        let pipeline = SubprocessPipeline::new("sh", script, dir.path(), Duration::from_secs(10));
        let err = pipeline.translate(Path::new("x"), "hi").await.unwrap_err();

        match err {
            PipelineError::ExternalProcessFailed { exit_code, stderr } => {
                assert_eq!(exit_code, 1);
                assert!(stderr.contains("File not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pretty_printed_json_is_not_a_result_line() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_script(dir.path(), "printf '{\\n  \"success\": true\\n}\\n'\n");

        let pipeline = SubprocessPipeline::new("sh", script, dir.path(), Duration::from_secs(10));
        let err = pipeline.translate(Path::new("x"), "hi").await.unwrap_err();
        assert!(matches!(err, PipelineError::NoResultFound));
    }
}
