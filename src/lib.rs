pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{
    cli::{LocalStorage, StdoutClipboard},
    toml_config::TomlConfig,
    CliConfig,
};
pub use core::{
    etl::{DocumentEngine, RunOutcome},
    pipeline::FilePipeline,
};
pub use utils::error::{DocgenError, Result};
