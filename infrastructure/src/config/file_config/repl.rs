//! `[repl]` section: interactive chat settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Print turn stages (selecting, invoking, composing) while a turn runs
    pub show_progress: bool,
    /// Where chat input history is kept; `~/` is the home directory
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

impl FileReplConfig {
    /// Progress output is off when configured off or when `--quiet` is given.
    pub fn progress_enabled(&self, quiet: bool) -> bool {
        self.show_progress && !quiet
    }

    /// Configured history path. `None` (also for blank values) leaves the
    /// choice to the REPL's default location.
    pub fn history_path(&self) -> Option<PathBuf> {
        let raw = self.history_file.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(raw)),
        }
    }
}
