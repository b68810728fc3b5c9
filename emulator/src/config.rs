use crate::context::ContextSchema;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const CONFIG_ENV: &str = "ZKHOST_CONFIG";
pub const PHANTOM_ENV: &str = "PHANTOM";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Context slots read and written per segment position.
    pub context_schema: ContextSchema,
    /// Regular expressions selecting the phantom functions of a guest.
    pub phantom_functions: Vec<String>,
}

impl RuntimeConfig {
    pub fn new(context_schema: ContextSchema, phantom_functions: Vec<String>) -> Self {
        Self {
            context_schema,
            phantom_functions,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(
            File::open(path).with_context(|| format!("cannot open config {}", path.display()))?,
        );
        let config = serde_json::from_reader(reader)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Loads `ZKHOST_CONFIG` when set, then appends the whitespace separated
    /// patterns of `PHANTOM`.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(patterns) = env::var(PHANTOM_ENV) {
            config
                .phantom_functions
                .extend(patterns.split_whitespace().map(String::from));
        }
        log::debug!("runtime config: {:?}", config);
        Ok(config)
    }
}
