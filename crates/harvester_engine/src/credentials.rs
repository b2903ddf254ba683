use std::env;

/// Environment variable holding the catalog API key.
pub const API_KEY_VAR: &str = "TMDB_API_KEY";

/// Environment variable enabling adult content by default.
pub const INCLUDE_ADULT_VAR: &str = "TMDB_INCLUDE_ADULT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TMDB_API_KEY not set; add your API key to the environment or a .env file")]
    MissingApiKey,
}

/// API credential for the remote catalog.
#[derive(Debug, Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Reads the key from the environment. A `.env` file is honored when
    /// the caller ran [`load_dotenv`] first.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Masked rendering for display: first eight and last four characters
    /// kept, everything in between starred out.
    pub fn masked(&self) -> String {
        let key = &self.api_key;
        if key.is_ascii() && key.len() > 12 {
            format!(
                "{}{}{}",
                &key[..8],
                "*".repeat(key.len() - 12),
                &key[key.len() - 4..]
            )
        } else {
            "*".repeat(key.chars().count())
        }
    }
}

/// Loads a `.env` file from the working directory if one exists.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Reads a boolean environment flag. Accepts 1/0, true/false, yes/no, on.
/// An unset variable yields `default`; a set-but-falsy value yields false.
pub fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        Err(_) => default,
    }
}
