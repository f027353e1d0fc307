use std::path::Path;

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::parser::tokens::DEFAULT_FIELD_SEPARATOR;

pub const ENV_PREFIX: &str = "VOCAB";
pub const DEFAULT_FILE: &str = "vocab";

/// What to do with a page that has no numbered entries at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPages {
    #[default]
    Fail,
    Skip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Running header repeated on every page; rows with exactly this word are dropped.
    pub header: Option<String>,
    /// Column gap between word and meaning in the extracted text.
    pub separator: String,
    pub empty_pages: EmptyPages,
    pub normalize: bool,
    /// Articles stripped by the normalizer, e.g. `(de)` / `(het)`.
    pub articles: Vec<String>,
    pub format: OutputFormat,
    pub delimiter: String,
    pub bom: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            header: None,
            separator: DEFAULT_FIELD_SEPARATOR.to_string(),
            empty_pages: EmptyPages::Fail,
            normalize: false,
            articles: vec!["de".to_string(), "het".to_string()],
            format: OutputFormat::Csv,
            delimiter: ";".to_string(),
            bom: true,
        }
    }
}

impl Settings {
    /// Defaults, then `file` (or an optional `vocab.*` in the working
    /// directory), then `VOCAB_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::build(file, environment())
    }

    fn build(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let builder = match file {
            Some(path) => Config::builder().add_source(File::from(path)),
            None => Config::builder().add_source(File::with_name(DEFAULT_FILE).required(false)),
        };
        builder.add_source(env).build()?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("articles")
}
