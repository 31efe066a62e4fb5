use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use server_api::{ApiContext, DrcRules, PropulsionCatalog};
use shared::geometry::DEFAULT_SAMPLES;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub propulsion_catalog: PathBuf,
    pub drc_rules: PathBuf,
    pub airfoil_samples: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            propulsion_catalog: "data/propulsion_catalog.json".into(),
            drc_rules: "data/drc_rules.json".into(),
            airfoil_samples: DEFAULT_SAMPLES,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new("server.toml"), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(file: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
                settings.server_bind = v.to_string();
            }
            if let Some(v) = file_cfg
                .get("propulsion_catalog")
                .and_then(toml::Value::as_str)
            {
                settings.propulsion_catalog = v.into();
            }
            if let Some(v) = file_cfg.get("drc_rules").and_then(toml::Value::as_str) {
                settings.drc_rules = v.into();
            }
            if let Some(v) = file_cfg
                .get("airfoil_samples")
                .and_then(toml::Value::as_integer)
                .and_then(|v| usize::try_from(v).ok())
            {
                settings.airfoil_samples = v;
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__PROPULSION_CATALOG") {
        settings.propulsion_catalog = v.into();
    }
    if let Some(v) = env("APP__DRC_RULES") {
        settings.drc_rules = v.into();
    }

    if let Some(v) = env("APP__AIRFOIL_SAMPLES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.airfoil_samples = parsed;
        }
    }

    settings
}

pub fn build_context(settings: &Settings) -> anyhow::Result<ApiContext> {
    let catalog = PropulsionCatalog::load(&settings.propulsion_catalog)
        .context("loading propulsion catalog")?;
    let drc_rules = DrcRules::load(&settings.drc_rules).context("loading DRC rules")?;
    Ok(ApiContext {
        catalog,
        drc_rules,
        airfoil_samples: settings.airfoil_samples.max(1),
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
