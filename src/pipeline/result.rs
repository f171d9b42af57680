use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JSON object printed by the translation script, kept verbatim.
///
/// Its shape belongs to the script, so only JSON syntax is checked when it
/// is parsed. The accessors below read the fields the service itself cares
/// about (history records, logging) and tolerate both snake and camel case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationResult(Map<String, Value>);

impl TranslationResult {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn success(&self) -> bool {
        self.0.get("success").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn output_file(&self) -> Option<&str> {
        self.first_str(&["audio_file", "audioFile", "video_file", "videoFile"])
    }

    pub fn is_video(&self) -> bool {
        self.first_str(&["video_file", "videoFile"]).is_some()
    }

    pub fn original_transcript(&self) -> Option<&str> {
        self.first_str(&["original_transcript", "originalTranscript"])
    }

    pub fn english_translation(&self) -> Option<&str> {
        self.first_str(&["whisper_english", "english_translation", "englishTranslation"])
    }

    pub fn final_translation(&self) -> Option<&str> {
        self.first_str(&["final_translation", "finalTranslation"])
    }

    pub fn translation_time(&self) -> Option<f64> {
        ["translation_time", "translationTime"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_f64))
    }

    pub fn overall_accuracy(&self) -> Option<f64> {
        self.0
            .get("accuracy")
            .and_then(|accuracy| accuracy.get("overall"))
            .and_then(Value::as_f64)
    }

    fn first_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.0.get(*key).and_then(Value::as_str))
    }
}
