use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stratus_batch::ExecutorConfig;
use stratus_listing::ListerConfig;

use crate::cli::{BatchOptions, LsArgs};

/// Settings file layout.
///
/// ```toml
/// [batch]
/// max_batch_size = 25
/// backoff_base_ms = 100
/// track_consumed_capacity = true
///
/// [listing]
/// page_size = 1000
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StratusConfig {
    pub batch: ExecutorConfig,
    pub listing: ListerConfig,
}

impl StratusConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Executor settings for a run against `target`, with flags applied.
    pub fn executor_for(&self, target: &str, opts: &BatchOptions) -> ExecutorConfig {
        let mut config = self.batch.clone();
        if config.target.is_empty() {
            config.target = target.to_string();
        }
        if let Some(size) = opts.batch_size {
            config.max_batch_size = size;
        }
        if let Some(ms) = opts.backoff_ms {
            config.backoff_base_ms = ms;
        }
        if opts.no_capacity {
            config.track_consumed_capacity = false;
        }
        config
    }

    pub fn lister_for(&self, args: &LsArgs) -> ListerConfig {
        match args.page_size {
            Some(size) => self.listing.clone().with_page_size(size),
            None => self.listing.clone(),
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("cannot serialize configuration")
    }
}
