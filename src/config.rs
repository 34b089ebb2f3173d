use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Dossier";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const ENV_PREFIX: &str = "DOSSIER_";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_FRAUD_THRESHOLD: u8 = 85;
const DEFAULT_MAX_UPLOAD_MB: u64 = 100;
const DEFAULT_OCR_LANG: &str = "eng";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine home directory; set DOSSIER_DATA_DIR")]
    NoHomeDir,

    #[error("Invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{0} requires an API key; set DOSSIER_LLM_API_KEY or OPENAI_API_KEY")]
    MissingApiKey(&'static str),
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,dossier_lib=debug"
    } else {
        "info"
    }
}

/// The three storage areas plus the record database.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageLayout {
    pub uploads_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub merged_dir: PathBuf,
    pub database_path: PathBuf,
}

impl StorageLayout {
    /// Standard layout under one data directory.
    pub fn under(data_dir: PathBuf) -> Self {
        Self {
            uploads_dir: data_dir.join("uploads"),
            generated_dir: data_dir.join("generated"),
            merged_dir: data_dir.join("merged"),
            database_path: data_dir.join("dossier.db"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    OpenAi,
}

impl LlmProvider {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage: StorageLayout,
    pub bind_addr: SocketAddr,
    pub llm: LlmSettings,
    pub fraud_threshold: u8,
    pub max_upload_bytes: u64,
    pub tessdata_dir: PathBuf,
    pub ocr_lang: String,
}

impl AppConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_dir = match get("DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(APP_NAME),
        };
        let defaults = StorageLayout::under(data_dir.clone());
        let storage = StorageLayout {
            uploads_dir: get("UPLOADS_DIR").map(PathBuf::from).unwrap_or(defaults.uploads_dir),
            generated_dir: get("GENERATED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.generated_dir),
            merged_dir: get("MERGED_DIR").map(PathBuf::from).unwrap_or(defaults.merged_dir),
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDR", &bind_raw, e))?;

        let provider = match get("LLM_PROVIDER") {
            Some(raw) => LlmProvider::parse(&raw)
                .ok_or_else(|| invalid("LLM_PROVIDER", &raw, "expected ollama or openai"))?,
            None => LlmProvider::Ollama,
        };
        let (default_url, default_model) = match provider {
            LlmProvider::Ollama => (DEFAULT_OLLAMA_URL, DEFAULT_OLLAMA_MODEL),
            LlmProvider::OpenAi => (DEFAULT_OPENAI_URL, DEFAULT_OPENAI_MODEL),
        };
        let api_key = get("LLM_API_KEY").or_else(|| {
            lookup("OPENAI_API_KEY")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        });
        if provider == LlmProvider::OpenAi && api_key.is_none() {
            return Err(ConfigError::MissingApiKey("openai"));
        }

        let llm = LlmSettings {
            provider,
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| default_url.to_string()),
            model: get("LLM_MODEL").unwrap_or_else(|| default_model.to_string()),
            api_key,
            timeout_secs: parse_number(&get, "LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
        };
        if llm.timeout_secs == 0 {
            return Err(invalid("LLM_TIMEOUT_SECS", "0", "must be positive"));
        }

        let fraud_threshold: u8 = parse_number(&get, "FRAUD_THRESHOLD", DEFAULT_FRAUD_THRESHOLD)?;
        if !(DEFAULT_FRAUD_THRESHOLD..=100).contains(&fraud_threshold) {
            return Err(invalid(
                "FRAUD_THRESHOLD",
                &fraud_threshold.to_string(),
                "must be between 85 and 100",
            ));
        }

        let max_upload_mb: u64 = parse_number(&get, "MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?;
        if max_upload_mb == 0 {
            return Err(invalid("MAX_UPLOAD_MB", "0", "must be positive"));
        }

        Ok(Self {
            storage,
            bind_addr,
            llm,
            fraud_threshold,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            tessdata_dir: get("TESSDATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("tessdata")),
            ocr_lang: get("OCR_LANG").unwrap_or_else(|| DEFAULT_OCR_LANG.to_string()),
        })
    }
}

fn parse_number<T, G>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw.parse::<T>().map_err(|e| invalid(name, &raw, e)),
        None => Ok(default),
    }
}

fn invalid(name: &str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{ENV_PREFIX}{name}"),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_under_data_dir() {
        let config = config_from(&[("DOSSIER_DATA_DIR", "/srv/dossier")]).unwrap();
        assert_eq!(config.storage, StorageLayout::under(PathBuf::from("/srv/dossier")));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.fraud_threshold, 85);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.ocr_lang, "eng");
    }

    #[test]
    fn default_data_dir_under_home() {
        let config = config_from(&[]).unwrap();
        let home = dirs::home_dir().unwrap();
        assert!(config.storage.uploads_dir.starts_with(home.join("Dossier")));
    }

    #[test]
    fn explicit_areas_override_layout() {
        let config = config_from(&[
            ("DOSSIER_DATA_DIR", "/data"),
            ("DOSSIER_MERGED_DIR", "/bundles"),
        ])
        .unwrap();
        assert_eq!(config.storage.merged_dir, PathBuf::from("/bundles"));
        assert_eq!(config.storage.uploads_dir, PathBuf::from("/data/uploads"));
    }

    #[test]
    fn openai_requires_key_and_falls_back_to_openai_env() {
        let err = config_from(&[("DOSSIER_DATA_DIR", "/d"), ("DOSSIER_LLM_PROVIDER", "openai")]);
        assert!(matches!(err, Err(ConfigError::MissingApiKey(_))));

        let config = config_from(&[
            ("DOSSIER_DATA_DIR", "/d"),
            ("DOSSIER_LLM_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "sk-test"),
        ])
        .unwrap();
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.base_url, DEFAULT_OPENAI_URL);
    }

    #[test]
    fn fraud_threshold_below_floor_rejected() {
        let err = config_from(&[("DOSSIER_DATA_DIR", "/d"), ("DOSSIER_FRAUD_THRESHOLD", "70")]);
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
        let ok = config_from(&[("DOSSIER_DATA_DIR", "/d"), ("DOSSIER_FRAUD_THRESHOLD", "92")]).unwrap();
        assert_eq!(ok.fraud_threshold, 92);
    }

    #[test]
    fn malformed_values_rejected() {
        for (key, value) in [
            ("DOSSIER_BIND_ADDR", "nowhere"),
            ("DOSSIER_LLM_PROVIDER", "gemini"),
            ("DOSSIER_LLM_TIMEOUT_SECS", "soon"),
            ("DOSSIER_MAX_UPLOAD_MB", "0"),
        ] {
            let result = config_from(&[("DOSSIER_DATA_DIR", "/d"), (key, value)]);
            assert!(matches!(result, Err(ConfigError::InvalidValue { .. })), "{key}");
        }
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("DOSSIER_DATA_DIR", "/d"), ("DOSSIER_LLM_MODEL", "  ")]).unwrap();
        assert_eq!(config.llm.model, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
