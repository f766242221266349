use anyhow::Result;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "bondcollect";

/// Config directory override from `BONDCOLLECT_CONFIG_DIR`, if set
pub fn config_dir_override() -> Option<PathBuf> {
    std::env::var("BONDCOLLECT_CONFIG_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = match config_dir_override() {
            Some(dir) => dir,
            None => dirs::config_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
                .join(APP_DIR),
        };

        Ok(Self::with_base(base_dir))
    }

    pub fn with_base(base_dir: PathBuf) -> Self {
        Self {
            log_dir: base_dir.join("logs"),
            config_dir: base_dir,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("bondcollect.log")
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // Fall back to a relative directory when the platform has no config dir
        Self::new().unwrap_or_else(|_| Self::with_base(PathBuf::from(".").join(APP_DIR)))
    }
}
