pub mod doc_number;
pub mod etl;
pub mod export;
pub mod form;
pub mod format;
pub mod ingest;
pub mod pipeline;
pub mod template;

pub use crate::domain::model::{GeneratedDocument, IngestResult, RawRecord, ScalarContext};
pub use crate::domain::ports::{Clipboard, ConfigProvider, OutputFormat, Pipeline, Storage};
pub use crate::utils::error::Result;
