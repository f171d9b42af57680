use once_cell::sync::Lazy;
use serde_json::{Map, Value};

pub const DEFAULT_TARGET_LANG: &str = "hi";

/// Display name to language code, as offered to clients.
pub const LANGUAGES: [(&str, &str); 23] = [
    ("English", "en"),
    ("Hindi", "hi"),
    ("Bengali", "bn"),
    ("Tamil", "ta"),
    ("Telugu", "te"),
    ("Marathi", "mr"),
    ("Gujarati", "gu"),
    ("Kannada", "kn"),
    ("Malayalam", "ml"),
    ("Punjabi", "pa"),
    ("Urdu", "ur"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Japanese", "ja"),
    ("Arabic", "ar"),
    ("Italian", "it"),
    ("Nepali", "ne"),
    ("Portuguese", "pt"),
    ("Russian", "ru"),
    ("Bhojpuri", "bho"),
    ("Chinese (Simplified)", "zh-CN"),
    ("Chinese (Traditional)", "zh-TW"),
];

pub static LANGUAGE_MAP: Lazy<Map<String, Value>> = Lazy::new(|| {
    LANGUAGES
        .iter()
        .map(|(name, code)| (name.to_string(), Value::String(code.to_string())))
        .collect()
});

pub fn is_supported(code: &str) -> bool {
    LANGUAGES.iter().any(|(_, c)| *c == code)
}

/// Empty or missing codes fall back to Hindi.
pub fn resolve_target(code: Option<&str>) -> &str {
    match code.map(str::trim) {
        Some(code) if !code.is_empty() => code,
        _ => DEFAULT_TARGET_LANG,
    }
}
