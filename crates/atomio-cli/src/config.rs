use crate::cli::{IndexingFlags, WriteArgs};
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const DEFAULT_OVERWRITE: bool = false;
const DEFAULT_NO_INDEXING: bool = true;
const DEFAULT_SCALE_FACTOR: f64 = 1.0;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    overwrite: Option<bool>,
    #[serde(rename = "no-indexing")]
    no_indexing: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSe3Config {
    #[serde(rename = "scale-factor")]
    scale_factor: Option<f64>,
}

/// Settings read from the optional TOML file; every field may be absent.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    output: Option<PartialOutputConfig>,
    se3: Option<PartialSe3Config>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSettings {
    pub overwrite: bool,
    pub no_indexing: bool,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// CLI flags win over the file, the file wins over the defaults.
    pub fn merge_output(&self, args: &WriteArgs) -> OutputSettings {
        let file = self.output.as_ref();
        let overwrite = args.overwrite
            || file
                .and_then(|o| o.overwrite)
                .unwrap_or(DEFAULT_OVERWRITE);
        let no_indexing =
            Self::merge_indexing(args.indexing, file.and_then(|o| o.no_indexing));
        OutputSettings {
            overwrite,
            no_indexing,
        }
    }

    fn merge_indexing(cli_flags: IndexingFlags, file_val: Option<bool>) -> bool {
        if cli_flags.indexed {
            false
        } else if cli_flags.no_indexing {
            true
        } else {
            file_val.unwrap_or(DEFAULT_NO_INDEXING)
        }
    }

    pub fn merge_scale_factor(&self, cli_val: Option<f64>) -> Result<f64> {
        let scale_factor = cli_val
            .or(self.se3.as_ref().and_then(|s| s.scale_factor))
            .unwrap_or(DEFAULT_SCALE_FACTOR);
        if !scale_factor.is_finite() {
            return Err(CliError::Config(format!(
                "`se3.scale-factor` must be a finite number, got {}",
                scale_factor
            )));
        }
        Ok(scale_factor)
    }
}
