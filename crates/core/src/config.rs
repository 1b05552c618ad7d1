use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommend::{
    DEFAULT_ALSO_BOUGHT_LIMIT, DEFAULT_COMBINED_LIMIT, DEFAULT_PERSONALIZED_LIMIT,
    DEFAULT_SIMILAR_LIMIT, DEFAULT_TRENDING_LIMIT, MAX_DEFAULT_LIMIT,
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Catalog backend the payloads originate from. Diagnostics only.
    pub backend_url: String,
}

/// Result sizes used when a request does not carry its own limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitsConfig {
    pub personalized: usize,
    pub similar: usize,
    pub also_bought: usize,
    pub trending: usize,
    pub combined: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            personalized: DEFAULT_PERSONALIZED_LIMIT,
            similar: DEFAULT_SIMILAR_LIMIT,
            also_bought: DEFAULT_ALSO_BOUGHT_LIMIT,
            trending: DEFAULT_TRENDING_LIMIT,
            combined: DEFAULT_COMBINED_LIMIT,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig { backend_url: "http://localhost:8080".to_string() },
            limits: LimitsConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("shelfwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(engine) = patch.engine {
            if let Some(backend_url) = engine.backend_url {
                self.engine.backend_url = backend_url;
            }
        }

        if let Some(limits) = patch.limits {
            if let Some(personalized) = limits.personalized {
                self.limits.personalized = personalized;
            }
            if let Some(similar) = limits.similar {
                self.limits.similar = similar;
            }
            if let Some(also_bought) = limits.also_bought {
                self.limits.also_bought = also_bought;
            }
            if let Some(trending) = limits.trending {
                self.limits.trending = trending;
            }
            if let Some(combined) = limits.combined {
                self.limits.combined = combined;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let backend_url =
            read_env("SHELFWISE_ENGINE_BACKEND_URL").or_else(|| read_env("BACKEND_URL"));
        if let Some(value) = backend_url {
            self.engine.backend_url = value;
        }

        if let Some(value) = read_env("SHELFWISE_LIMITS_PERSONALIZED") {
            self.limits.personalized = parse_usize("SHELFWISE_LIMITS_PERSONALIZED", &value)?;
        }
        if let Some(value) = read_env("SHELFWISE_LIMITS_SIMILAR") {
            self.limits.similar = parse_usize("SHELFWISE_LIMITS_SIMILAR", &value)?;
        }
        if let Some(value) = read_env("SHELFWISE_LIMITS_ALSO_BOUGHT") {
            self.limits.also_bought = parse_usize("SHELFWISE_LIMITS_ALSO_BOUGHT", &value)?;
        }
        if let Some(value) = read_env("SHELFWISE_LIMITS_TRENDING") {
            self.limits.trending = parse_usize("SHELFWISE_LIMITS_TRENDING", &value)?;
        }
        if let Some(value) = read_env("SHELFWISE_LIMITS_COMBINED") {
            self.limits.combined = parse_usize("SHELFWISE_LIMITS_COMBINED", &value)?;
        }

        let log_level =
            read_env("SHELFWISE_LOGGING_LEVEL").or_else(|| read_env("SHELFWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHELFWISE_LOGGING_FORMAT").or_else(|| read_env("SHELFWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(backend_url) = overrides.backend_url {
            self.engine.backend_url = backend_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_engine(&self.engine)?;
        validate_limits(&self.limits)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("shelfwise.toml"), PathBuf::from("config/shelfwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    let url = engine.backend_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "engine.backend_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_limits(limits: &LimitsConfig) -> Result<(), ConfigError> {
    let entries = [
        ("limits.personalized", limits.personalized),
        ("limits.similar", limits.similar),
        ("limits.also_bought", limits.also_bought),
        ("limits.trending", limits.trending),
        ("limits.combined", limits.combined),
    ];

    for (key, value) in entries {
        if value == 0 || value > MAX_DEFAULT_LIMIT {
            return Err(ConfigError::Validation(format!(
                "{key} must be in range 1..={MAX_DEFAULT_LIMIT}"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    engine: Option<EnginePatch>,
    limits: Option<LimitsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    backend_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitsPatch {
    personalized: Option<usize>,
    similar: Option<usize>,
    also_bought: Option<usize>,
    trending: Option<usize>,
    combined: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ALL_VARS: &[&str] = &[
        "SHELFWISE_ENGINE_BACKEND_URL",
        "BACKEND_URL",
        "SHELFWISE_LIMITS_PERSONALIZED",
        "SHELFWISE_LIMITS_SIMILAR",
        "SHELFWISE_LIMITS_ALSO_BOUGHT",
        "SHELFWISE_LIMITS_TRENDING",
        "SHELFWISE_LIMITS_COMBINED",
        "SHELFWISE_LOGGING_LEVEL",
        "SHELFWISE_LOG_LEVEL",
        "SHELFWISE_LOGGING_FORMAT",
        "SHELFWISE_LOG_FORMAT",
        "TEST_SHELFWISE_BACKEND_HOST",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_documented_limits() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.engine.backend_url == "http://localhost:8080", "default backend url")?;
        ensure(config.limits.personalized == 10, "personalized default limit is 10")?;
        ensure(config.limits.similar == 6, "similar default limit is 6")?;
        ensure(config.limits.also_bought == 6, "also-bought default limit is 6")?;
        ensure(config.limits.trending == 10, "trending default limit is 10")?;
        ensure(config.limits.combined == 10, "combined default limit is 10")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("TEST_SHELFWISE_BACKEND_HOST", "catalog.internal:9090");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shelfwise.toml");
            fs::write(
                &path,
                r#"
[engine]
backend_url = "http://${TEST_SHELFWISE_BACKEND_HOST}"

[limits]
similar = 4
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.engine.backend_url == "http://catalog.internal:9090",
                "backend url should be interpolated from environment",
            )?;
            ensure(config.limits.similar == 4, "file limit should replace the default")?;
            ensure(config.limits.trending == 10, "untouched limits keep their defaults")?;
            Ok(())
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn logging_and_backend_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("BACKEND_URL", "https://shop.example.com");
        env::set_var("SHELFWISE_LOG_LEVEL", "warn");
        env::set_var("SHELFWISE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.engine.backend_url == "https://shop.example.com",
                "BACKEND_URL alias should set the backend url",
            )?;
            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("SHELFWISE_ENGINE_BACKEND_URL", "http://from-env:8080");
        env::set_var("SHELFWISE_LIMITS_TRENDING", "25");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shelfwise.toml");
            fs::write(
                &path,
                r#"
[engine]
backend_url = "http://from-file:8080"

[limits]
trending = 12
combined = 8

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    backend_url: Some("http://from-override:8080".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.engine.backend_url == "http://from-override:8080",
                "override backend url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.limits.trending == 25, "env limit should win over file")?;
            ensure(config.limits.combined == 8, "file limit should win over default")?;
            Ok(())
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("SHELFWISE_LIMITS_SIMILAR", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("limits.similar")
            );
            ensure(has_message, "validation failure should mention limits.similar")
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn non_numeric_limit_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        env::set_var("SHELFWISE_LIMITS_COMBINED", "ten");

        let result = (|| -> Result<(), String> {
            let error = AppConfig::load(LoadOptions::default())
                .err()
                .ok_or_else(|| "expected invalid override failure".to_string())?;
            ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "SHELFWISE_LIMITS_COMBINED"),
                "error should name the offending variable",
            )
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn backend_url_must_be_http() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                backend_url: Some("ftp://catalog".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("engine.backend_url")),
            "non-http backend url should fail validation",
        )
    }
}
