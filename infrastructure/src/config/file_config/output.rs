//! `[output]` section: how results are printed

use concierge_domain::OutputFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Default format when `--output` is not given
    pub format: Option<OutputFormat>,
    /// ANSI colors; the `NO_COLOR` environment variable also turns them off
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// The `--output` flag wins over the configured format.
    pub fn effective_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.format).unwrap_or_default()
    }

    pub fn colors_enabled(&self) -> bool {
        self.color && std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
    }
}
