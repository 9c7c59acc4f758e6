//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde_json::Value;
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["concierge.toml", ".concierge.toml"];
const ENV_PREFIX: &str = "CONCIERGE_";

/// Variables recognized for compatibility with existing deployments
const LEGACY_ENV: [(&str, &str); 3] = [
    ("GEMINI_API_KEY", "model.api_key"),
    ("GEMINI_MODEL", "model.model"),
    ("MCP_BASE_URL", "server.endpoint"),
];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CONCIERGE_*` environment variables
    /// 2. Legacy environment variables
    /// 3. Explicit config path (if provided)
    /// 4. Project root: `./concierge.toml` or `./.concierge.toml`
    /// 5. XDG config: `$XDG_CONFIG_HOME/tool-concierge/config.toml`
    /// 6. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(project_path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&project_path));
        }

        Self::finish(figment, config_path.map(PathBuf::as_path), std::env::vars())
    }

    /// Load from defaults, an optional explicit file and the given variables,
    /// ignoring global and project files.
    pub fn load_with_env(
        config_path: Option<&Path>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        let figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        Self::finish(figment, config_path, vars)
    }

    fn finish(
        mut figment: Figment,
        config_path: Option<&Path>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        // Explicit config path (highest priority for files)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        let (legacy, prefixed) = Self::env_overrides(vars);
        for (key, value) in legacy.into_iter().chain(prefixed) {
            figment = figment.merge(Serialized::default(&key, value));
        }

        figment.extract().map_err(Box::new)
    }

    /// Split environment variables into legacy and `CONCIERGE_*` overrides,
    /// each as `(dotted.key, value)`.
    fn env_overrides(
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> (Vec<(String, Value)>, Vec<(String, Value)>) {
        let mut legacy = Vec::new();
        let mut prefixed = Vec::new();

        for (name, raw) in vars {
            if let Some((_, key)) = LEGACY_ENV.iter().find(|(var, _)| *var == name) {
                legacy.push((key.to_string(), env_value(&raw)));
            } else if let Some(rest) = name.strip_prefix(ENV_PREFIX) {
                let key = rest.to_lowercase().replace("__", ".");
                if !key.is_empty() {
                    prefixed.push((key, env_value(&raw)));
                }
            }
        }

        (legacy, prefixed)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/tool-concierge/config.toml if set,
    /// otherwise falls back to ~/.config/tool-concierge/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tool-concierge").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");

        for (var, _) in LEGACY_ENV {
            let marker = if std::env::var_os(var).is_some() { "SET  " } else { "     " };
            println!("  [{}] Env:     {}", marker, var);
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./concierge.toml or ./.concierge.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

/// Environment values are JSON scalars when they parse as one, otherwise strings.
fn env_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}
