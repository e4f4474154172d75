use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use log::debug;
use teizan_core::config::{SiteConfig, load_site_config};

pub const CONFIG_FILE: &str = "teizan.yaml";

/// An explicit `--config` must exist; otherwise `teizan.yaml` in `root` is
/// used when present and the defaults when not.
pub fn load_config(explicit: Option<&Path>, root: &Path) -> Result<SiteConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        return load_site_config(path);
    }
    let config_path: PathBuf = root.join(CONFIG_FILE);
    if config_path.exists() {
        load_site_config(&config_path)
    } else {
        debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
        Ok(SiteConfig::default())
    }
}
