use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entity::MAX_BLOB_SIZE;
use crate::error::Result;
use crate::present::Catalog;
use crate::query::{IdeaOrder, IdeaView};

pub const CONFIG_FILE: &str = "config.yaml";

/// Project settings kept in `.ideabox/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Order used by `idea list` when none is given.
    pub default_order: IdeaOrder,
    pub default_view: IdeaView,
    /// Distinct vetters needed before a submitted idea becomes vetted.
    pub vettings_required: u32,
    /// Largest accepted stored file, in bytes.
    pub max_file_size: usize,
    /// Optional YAML message catalog, relative to the project directory.
    pub translations: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_order: IdeaOrder::default(),
            default_view: IdeaView::default(),
            vettings_required: 1,
            max_file_size: MAX_BLOB_SIZE,
            translations: None,
        }
    }
}

impl Config {
    /// Load `config.yaml` from `dir`, falling back to defaults when absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let source = fs::read_to_string(&path)?;
        let mut config: Config = serde_yaml::from_str(&source)?;
        config.max_file_size = config.max_file_size.min(MAX_BLOB_SIZE);
        config.vettings_required = config.vettings_required.max(1);
        Ok(config)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join(CONFIG_FILE), serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Build the message catalog named by `translations`, or an empty one.
    pub fn catalog(&self, dir: &Path) -> Result<Catalog> {
        match &self.translations {
            Some(file) => Catalog::from_yaml_file(&dir.join(file)),
            None => Ok(Catalog::new()),
        }
    }
}
