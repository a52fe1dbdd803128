use crate::core::delimited::{DelimitedCodec, DelimitedLayout, DEFAULT_COOKBOOK_NAME};
use crate::core::structured::{MissingFavorite, StructuredCodec};
use crate::core::DecodeOptions;
use crate::utils::error::{CookbookError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CookbookConfig {
    pub storage: StorageConfig,
    pub structured: StructuredConfig,
    pub delimited: DelimitedConfig,
    pub decode: DecodeOptions,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub base_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredConfig {
    pub missing_favorite: MissingFavorite,
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedConfig {
    pub layout: DelimitedLayout,
    pub cookbook_name: String,
    pub reject_lossy: bool,
}

impl Default for DelimitedConfig {
    fn default() -> Self {
        Self {
            layout: DelimitedLayout::default(),
            cookbook_name: DEFAULT_COOKBOOK_NAME.to_string(),
            reject_lossy: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl CookbookConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CookbookError::io(path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CookbookError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COOKBOOK_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CookbookError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn structured_codec(&self) -> StructuredCodec {
        StructuredCodec::new()
            .with_missing_favorite(self.structured.missing_favorite)
            .with_pretty(self.structured.pretty)
            .with_options(self.decode)
    }

    pub fn delimited_codec(&self) -> DelimitedCodec {
        DelimitedCodec::new()
            .with_layout(self.delimited.layout)
            .with_cookbook_name(self.delimited.cookbook_name.clone())
            .with_reject_lossy(self.delimited.reject_lossy)
            .with_options(self.decode)
    }
}

impl Validate for CookbookConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("storage.base_path", &self.storage.base_path)?;
        validation::validate_non_empty_string(
            "delimited.cookbook_name",
            &self.delimited.cookbook_name,
        )?;
        validation::validate_one_of(
            "logging.level",
            &self.logging.level,
            &["trace", "debug", "info", "warn", "error"],
        )?;
        Ok(())
    }
}
