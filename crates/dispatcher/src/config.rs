use std::{collections::HashMap, fs, path::Path, time::Duration};

pub const DEFAULT_CHORD_MM: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherSettings {
    pub remote_url: String,
    /// Applied to each channel attempt separately. `None` waits indefinitely.
    pub channel_deadline: Option<Duration>,
    pub default_chord_mm: f64,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            remote_url: "http://127.0.0.1:8000".into(),
            channel_deadline: None,
            default_chord_mm: DEFAULT_CHORD_MM,
        }
    }
}

pub fn load_settings() -> DispatcherSettings {
    load_settings_from(Path::new("dispatcher.toml"), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> DispatcherSettings {
    let mut settings = DispatcherSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            if let Some(v) = file_cfg.get("remote_url").and_then(toml::Value::as_str) {
                settings.remote_url = v.to_string();
            }
            if let Some(v) = file_cfg
                .get("channel_deadline_ms")
                .and_then(toml::Value::as_integer)
            {
                settings.channel_deadline = deadline_from_millis(v);
            }
            if let Some(v) = file_cfg.get("default_chord_mm").and_then(as_float) {
                settings.default_chord_mm = v;
            }
        }
    }

    if let Some(v) = env("REMOTE_URL") {
        settings.remote_url = v;
    }
    if let Some(v) = env("APP__REMOTE_URL") {
        settings.remote_url = v;
    }

    if let Some(v) = env("APP__CHANNEL_DEADLINE_MS") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.channel_deadline = deadline_from_millis(parsed);
        }
    }

    if let Some(v) = env("APP__DEFAULT_CHORD_MM") {
        if let Ok(parsed) = v.parse::<f64>() {
            settings.default_chord_mm = parsed;
        }
    }

    settings
}

/// Zero or negative disables the deadline.
fn deadline_from_millis(millis: i64) -> Option<Duration> {
    u64::try_from(millis)
        .ok()
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis)
}

fn as_float(value: &toml::Value) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|v| v as f64))
}
