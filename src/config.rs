use crate::error::{PitchWatchError, Result};
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    pub openweathermap: OpenWeatherMapConfig,
    #[serde(default)]
    pub rules: Option<RulesConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// Seconds between evaluation cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound on concurrently running per-pitch pipelines.
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
}

fn default_interval_secs() -> u64 {
    30
}

fn default_max_concurrent_checks() -> usize {
    8
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_concurrent_checks: default_max_concurrent_checks(),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Optional startup overrides for the turf tolerance tables. Absent fields
/// keep their built-in defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RulesConfig {
    pub drying_time_hours: Option<TurfHoursConfig>,
    pub rain_tolerance_hours: Option<TurfHoursConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TurfHoursConfig {
    pub natural: Option<u32>,
    pub hybrid: Option<u32>,
    pub artificial: Option<u32>,
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(PitchWatchError::Config(format!(
                "Config file not found at {:?}. Run `pitchwatch init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| PitchWatchError::Config(format!("Failed to read config: {}", e)))?;

        // Substitute environment variables
        let config_str = Self::substitute_env_vars(&config_str);

        let config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| PitchWatchError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("pitchwatch").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        // Return XDG path as the default (will trigger "not found" in load)
        let default_path = dirs::config_dir()
            .ok_or_else(|| PitchWatchError::Config("Cannot determine config directory".into()))?
            .join("pitchwatch")
            .join("config.yaml");
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/pitchwatch/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PitchWatchError::Config("Cannot determine config directory".into()))?
            .join("pitchwatch");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up PitchWatch!");
        println!();

        // --- OpenWeatherMap ---
        println!("OpenWeatherMap (leave API key blank to run without live weather)");
        let owm_api_key: String = Input::new()
            .with_prompt("  API key")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PitchWatchError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- Monitor cadence ---
        println!("Monitor");
        let interval_secs: u64 = Input::new()
            .with_prompt("  Seconds between evaluation cycles")
            .default(default_interval_secs())
            .interact_text()
            .map_err(|e| PitchWatchError::Config(format!("Input error: {}", e)))?;

        let max_concurrent_checks: usize = Input::new()
            .with_prompt("  Max concurrent pitch checks")
            .default(default_max_concurrent_checks())
            .interact_text()
            .map_err(|e| PitchWatchError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            monitor: MonitorConfig {
                interval_secs,
                max_concurrent_checks,
            },
            openweathermap: OpenWeatherMapConfig {
                enabled: !owm_api_key.is_empty(),
                api_key: owm_api_key,
            },
            rules: None,
        };

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| PitchWatchError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# PitchWatch Configuration\n# Generated by `pitchwatch init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("PITCHWATCH_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| PitchWatchError::Config("Cannot determine data directory".into()))?
            .join("pitchwatch");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("pitchwatch.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            openweathermap: OpenWeatherMapConfig {
                api_key: "".into(),
                enabled: false,
            },
            rules: None,
        }
    }
}
