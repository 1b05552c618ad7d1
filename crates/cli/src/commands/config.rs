use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use shelfwise_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let limits = &config.limits;
    let entries = [
        (
            "engine.backend_url",
            config.engine.backend_url.clone(),
            &["SHELFWISE_ENGINE_BACKEND_URL", "BACKEND_URL"][..],
        ),
        ("limits.personalized", limits.personalized.to_string(), &["SHELFWISE_LIMITS_PERSONALIZED"][..]),
        ("limits.similar", limits.similar.to_string(), &["SHELFWISE_LIMITS_SIMILAR"][..]),
        ("limits.also_bought", limits.also_bought.to_string(), &["SHELFWISE_LIMITS_ALSO_BOUGHT"][..]),
        ("limits.trending", limits.trending.to_string(), &["SHELFWISE_LIMITS_TRENDING"][..]),
        ("limits.combined", limits.combined.to_string(), &["SHELFWISE_LIMITS_COMBINED"][..]),
        (
            "logging.level",
            config.logging.level.clone(),
            &["SHELFWISE_LOGGING_LEVEL", "SHELFWISE_LOG_LEVEL"][..],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["SHELFWISE_LOGGING_FORMAT", "SHELFWISE_LOG_FORMAT"][..],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(
        entries
            .iter()
            .map(|(key, value, env_keys)| render_line(key, value, source(key, env_keys))),
    );
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("shelfwise.toml"), PathBuf::from("config/shelfwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let active_env_key = env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = active_env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_keys_are_found_in_toml_documents() {
        let doc: Value = "[limits]\ntrending = 4\n".parse().expect("toml");
        assert!(contains_path(&doc, "limits.trending"));
        assert!(!contains_path(&doc, "limits.similar"));
        assert!(!contains_path(&doc, "engine.backend_url"));
    }

    #[test]
    fn file_source_is_reported_with_its_path() {
        let doc: Value = "[engine]\nbackend_url = \"http://catalog:8080\"\n".parse().expect("toml");
        let source = field_source(
            "engine.backend_url",
            &[],
            Some(&doc),
            Some(Path::new("config/shelfwise.toml")),
        );
        assert_eq!(source, "file (config/shelfwise.toml)");
        assert_eq!(field_source("limits.combined", &[], Some(&doc), None), "default");
    }
}
