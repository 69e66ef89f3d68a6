use anyhow::{anyhow, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::lens::ip::IPINFO_API;
use crate::lens::report::DEFAULT_REFERENCE_COUNTRY;

pub struct IpCheckConfig {
    /// Access token for the geolocation API; anonymous requests when unset
    pub token: Option<String>,

    /// Base URL of the geolocation API
    pub api_url: String,

    /// Country code lookups are compared against (default: US)
    pub reference_country: String,
}

const EMPTY_CONFIG: &str = r#"### ipcheck configuration file

### ipinfo.io access token (can also be set with IPCHECK_TOKEN)
# token = "REPLACE_THIS"

### geolocation API endpoint
# api_url = "https://ipinfo.io"

### country code each lookup is compared against
# reference_country = "US"
"#;

impl Default for IpCheckConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: IPINFO_API.to_string(),
            reference_country: DEFAULT_REFERENCE_COUNTRY.to_string(),
        }
    }
}

impl IpCheckConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<IpCheckConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => {
                // By default use $HOME/.ipcheck/ipcheck.toml as the configuration file path
                let ipcheck_dir = Self::config_dir()?;
                std::fs::create_dir_all(ipcheck_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create ipcheck directory: {}", e))?;
                PathBuf::from(format!("{}/ipcheck.toml", ipcheck_dir.as_str()))
            }
        };
        builder = add_file_source(builder, &config_path)?;

        // Add in settings from the environment (with a prefix of IPCHECK)
        // E.g., `IPCHECK_TOKEN=abc123 ./ipcheck` would set the access token
        builder = builder.add_source(config::Environment::with_prefix("IPCHECK"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Ok(Self::from_map(&config))
    }

    fn from_map(config: &HashMap<String, String>) -> IpCheckConfig {
        let defaults = IpCheckConfig::default();

        let token = config
            .get("token")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let api_url = config
            .get("api_url")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_url);

        let reference_country = config
            .get("reference_country")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.reference_country);

        IpCheckConfig {
            token,
            api_url,
            reference_country,
        }
    }

    /// Override the token, e.g. from a command-line flag
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.token = token;
        }
        self
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let token = match &self.token {
            Some(t) => mask_token(t),
            None => "(not set)".to_string(),
        };
        [
            format!("Config File:        {}", Self::config_file_path()),
            format!("API URL:            {}", self.api_url),
            format!("API Token:          {}", token),
            format!("Reference Country:  {}", self.reference_country),
        ]
        .join("\n")
    }

    /// Get the default config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.ipcheck/ipcheck.toml", home_dir)
    }

    fn config_dir() -> Result<String> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();
        Ok(format!("{}/.ipcheck", home_dir))
    }
}

/// Read settings from `path` if it exists, otherwise leave a commented template there
fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>> {
    if path.exists() {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert path to string"))?;
        return Ok(builder.add_source(config::File::with_name(path_str)));
    }

    std::fs::write(path, EMPTY_CONFIG)
        .map_err(|e| anyhow!("Unable to create config file {}: {}", path.display(), e))?;
    Ok(builder)
}

/// Keep the last four characters of a token visible
fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
