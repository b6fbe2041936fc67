//! Runtime configuration read from the environment

use std::path::PathBuf;

use crate::repository::LocaleProvider;

const DEFAULT_COUNTRY: &str = "US";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_PAGE_SIZE: u32 = 20;
/// The catalog rejects larger limits
const MAX_PAGE_SIZE: u32 = 50;
const DEFAULT_LOG_DIR: &str = ".logs";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("MUSIFY_COUNTRY must be a two-letter country code, got {0:?}")]
    InvalidCountry(String),
    #[error("MUSIFY_LANGUAGE must be a two-letter language code, got {0:?}")]
    InvalidLanguage(String),
    #[error("MUSIFY_PAGE_SIZE must be a number between 1 and {MAX_PAGE_SIZE}, got {0:?}")]
    InvalidPageSize(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub country_code: String,
    pub language_code: String,
    pub page_size: u32,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY.to_string(),
            language_code: DEFAULT_LANGUAGE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let country_code = match lookup("MUSIFY_COUNTRY") {
            Some(code) if is_alpha_code(&code) => code.to_ascii_uppercase(),
            Some(code) => return Err(ConfigError::InvalidCountry(code)),
            None => defaults.country_code,
        };

        let language_code = match lookup("MUSIFY_LANGUAGE") {
            Some(code) if is_alpha_code(&code) => code.to_ascii_lowercase(),
            Some(code) => return Err(ConfigError::InvalidLanguage(code)),
            None => defaults.language_code,
        };

        let page_size = match lookup("MUSIFY_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
                .ok_or(ConfigError::InvalidPageSize(raw))?,
            None => defaults.page_size,
        };

        let log_dir = lookup("MUSIFY_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        Ok(Self {
            country_code,
            language_code,
            page_size,
            log_dir,
        })
    }
}

fn is_alpha_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

impl LocaleProvider for AppConfig {
    fn country_code(&self) -> String {
        self.country_code.clone()
    }

    fn language_code(&self) -> String {
        self.language_code.clone()
    }
}
