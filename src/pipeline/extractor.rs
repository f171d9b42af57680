use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::PipelineError;
use super::invoker::ProcessOutcome;
use super::result::TranslationResult;

const SUCCESS_MARKER: &str = "\"success\"";

/// Turns a finished run into a result.
///
/// The script may interleave log lines with its JSON, so the last stdout
/// line mentioning `"success"` next to a `{` is taken as the result, and
/// anything outside its outermost braces is dropped.
pub fn extract_result(outcome: &ProcessOutcome) -> Result<TranslationResult, PipelineError> {
    if outcome.exit_code != 0 {
        return Err(PipelineError::ExternalProcessFailed {
            exit_code: outcome.exit_code,
            stderr: outcome.stderr.clone(),
        });
    }

    let line = find_result_line(&outcome.stdout).ok_or_else(|| {
        warn!("No result line in translation output ({} bytes)", outcome.stdout.len());
        PipelineError::NoResultFound
    })?;

    let json = trim_to_object(line).ok_or_else(|| {
        PipelineError::MalformedResult(format!("unbalanced braces in result line: {}", line))
    })?;
    debug!("Parsing translation result: {}", json);

    let fields: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| PipelineError::MalformedResult(e.to_string()))?;

    Ok(TranslationResult::new(fields))
}

fn find_result_line(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .rev()
        .find(|line| line.contains(SUCCESS_MARKER) && line.contains('{'))
}

fn trim_to_object(line: &str) -> Option<&str> {
    let start = line.find('{')?;
    let end = line.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&line[start..=end])
}
