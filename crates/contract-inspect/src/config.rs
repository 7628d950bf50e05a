use std::path::PathBuf;

use serde::Deserialize;

/// Environment variable that overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "CONTRACT_ENGINE_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Pretty-print `--json` output.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: "console".to_string(),
            },
            output: OutputConfig { pretty: true },
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        match self.logging.level.to_lowercase().trim() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(format!(
                    "logging.level must be one of trace, debug, info, warn, error (got {other:?})"
                ))
            }
        }
        match self.logging.format.to_lowercase().trim() {
            "console" | "json" => {}
            other => {
                return Err(format!(
                    "logging.format must be one of console, json (got {other:?})"
                ))
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    logging: PartialLoggingConfig,
    #[serde(default)]
    output: PartialOutputConfig,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLoggingConfig {
    #[serde(default)]
    level: String,
    #[serde(default)]
    format: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialOutputConfig {
    #[serde(default)]
    pretty: Option<bool>,
}

/// Environment inputs to config loading, captured once so loading itself is
/// a pure function of its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    pub xdg_config_home: Option<String>,
    pub home: Option<String>,
    /// Value of `CONTRACT_ENGINE_LOG`.
    pub log_level: Option<String>,
}

impl ConfigEnv {
    pub fn from_process() -> Self {
        Self {
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
            home: std::env::var("HOME").ok(),
            log_level: std::env::var(ENV_LOG_LEVEL).ok(),
        }
    }

    fn default_config_path(&self) -> Option<PathBuf> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
        };
        non_blank(&self.xdg_config_home)
            .or_else(|| non_blank(&self.home).map(|home| home.join(".config")))
            .map(|dir| dir.join("contract-engine").join("config.yaml"))
    }

    fn log_level(&self) -> Option<&str> {
        self.log_level
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Load config with precedence defaults < config file < environment, then
/// validate the result.
///
/// A missing default file is skipped; an explicit path that cannot be read
/// is an error. Returns the file that was applied, if any.
pub fn load_config(
    config_file: Option<&str>,
    env: &ConfigEnv,
) -> Result<(Config, Option<PathBuf>), String> {
    let mut cfg = Config::default();

    let used = match read_file_layer(config_file, env)? {
        Some((path, partial)) => {
            apply_partial(&mut cfg, partial);
            Some(path)
        }
        None => None,
    };
    if let Some(level) = env.log_level() {
        cfg.logging.level = level.to_string();
    }

    cfg.validate()?;
    Ok((cfg, used))
}

fn read_file_layer(
    config_file: Option<&str>,
    env: &ConfigEnv,
) -> Result<Option<(PathBuf, PartialConfig)>, String> {
    let explicit = config_file.map(str::trim).filter(|s| !s.is_empty());
    let (path, text) = match explicit {
        Some(path) => {
            let path = PathBuf::from(path);
            let text = std::fs::read_to_string(&path)
                .map_err(|err| format!("failed to load config file: {err}"))?;
            (path, text)
        }
        None => {
            let Some(path) = env.default_config_path() else {
                return Ok(None);
            };
            match std::fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(_) => return Ok(None),
            }
        }
    };
    Ok(Some((path, parse_partial(&text)?)))
}

fn parse_partial(text: &str) -> Result<PartialConfig, String> {
    if text.trim().is_empty() {
        return Ok(PartialConfig::default());
    }
    serde_yaml::from_str(text).map_err(|err| format!("parse config: {err}"))
}

fn apply_partial(cfg: &mut Config, partial: PartialConfig) {
    if !partial.logging.level.trim().is_empty() {
        cfg.logging.level = partial.logging.level.trim().to_string();
    }
    if !partial.logging.format.trim().is_empty() {
        cfg.logging.format = partial.logging.format.trim().to_string();
    }
    if let Some(pretty) = partial.output.pretty {
        cfg.output.pretty = pretty;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.logging.format, "console");
        assert!(cfg.output.pretty);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let mut cfg = Config::default();
        let partial = parse_partial("logging:\n  format: json\noutput:\n  pretty: false\n").unwrap();
        apply_partial(&mut cfg, partial);
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.logging.format, "json");
        assert!(!cfg.output.pretty);
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let mut cfg = Config::default();
        apply_partial(&mut cfg, parse_partial("   \n").unwrap());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn validate_names_the_offending_key() {
        let mut cfg = Config::default();
        cfg.logging.level = "loud".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.starts_with("logging.level"), "{err}");

        let mut cfg = Config::default();
        cfg.logging.format = "xml".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.starts_with("logging.format"), "{err}");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = parse_partial("logging: [unclosed").unwrap_err();
        assert!(err.starts_with("parse config:"), "{err}");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config(
            Some("/nonexistent/contract-engine/config.yaml"),
            &ConfigEnv::default(),
        )
        .unwrap_err();
        assert!(err.contains("failed to load config file"), "{err}");
    }

    #[test]
    fn env_level_beats_file_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logging:\n  level: error\n  format: json\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let (cfg, used) = load_config(Some(&path), &ConfigEnv::default()).unwrap();
        assert_eq!(cfg.logging.level, "error");
        assert_eq!(used.as_deref(), Some(std::path::Path::new(&path)));

        let env = ConfigEnv {
            log_level: Some(" debug ".to_string()),
            ..ConfigEnv::default()
        };
        let (cfg, _) = load_config(Some(&path), &env).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, "json");
    }

    #[test]
    fn invalid_env_level_is_rejected() {
        let env = ConfigEnv {
            log_level: Some("loud".to_string()),
            ..ConfigEnv::default()
        };
        let err = load_config(None, &env).unwrap_err();
        assert!(err.starts_with("logging.level"), "{err}");
    }

    #[test]
    fn default_path_comes_from_xdg_then_home() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("contract-engine");
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.yaml"), "output:\n  pretty: false\n").unwrap();
        let root = dir.path().to_string_lossy().into_owned();

        let env = ConfigEnv {
            xdg_config_home: Some(root.clone()),
            home: Some("/nonexistent-home".to_string()),
            ..ConfigEnv::default()
        };
        let (cfg, used) = load_config(None, &env).unwrap();
        assert!(!cfg.output.pretty);
        assert_eq!(used, Some(app_dir.join("config.yaml")));

        let env = ConfigEnv {
            home: Some(root),
            ..ConfigEnv::default()
        };
        let (cfg, used) = load_config(None, &env).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(used.is_none());
    }

    #[test]
    fn empty_env_uses_defaults_only() {
        let (cfg, used) = load_config(None, &ConfigEnv::default()).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(used.is_none());
    }
}
