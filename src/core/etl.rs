use crate::core::format::{TableView, TableViewOptions};
use crate::core::Pipeline;
use crate::domain::model::{GeneratedDocument, IngestResult, SessionStatus};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub ingested_rows: usize,
    pub document: GeneratedDocument,
    pub saved: Vec<String>,
}

/// Drives one session through ingest, generate and export.
pub struct DocumentEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DocumentEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs every stage. The status carries the user-facing error message when
    /// a stage fails and is never left processing.
    pub async fn run(&self, status: &mut SessionStatus) -> Result<RunOutcome> {
        status.begin();
        let start = Instant::now();

        let result = self.run_stages().await;

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    "✅ Generated {} rows in {:.2?}",
                    outcome.document.row_count(),
                    start.elapsed()
                );
            }
            Err(e) => {
                tracing::error!("❌ {} ({:?}/{:?})", e, e.category(), e.severity());
                status.fail(e.user_friendly_message());
            }
        }

        status.finish();
        result
    }

    async fn run_stages(&self) -> Result<RunOutcome> {
        tracing::info!("📥 Ingesting source file...");
        let ingested = self.pipeline.ingest().await?;
        let ingested_rows = ingested.rows().len();
        if ingested.is_passthrough() {
            tracing::warn!("Source is not a table of records, no rows will be generated");
        } else {
            tracing::info!(
                "Ingested {} rows from {} ({} columns)",
                ingested_rows,
                ingested.source_kind(),
                ingested.headers().len()
            );
        }

        self.pipeline.context().validate()?;

        tracing::info!("🧩 Generating {}...", self.pipeline.context().template_name);
        let document = self.pipeline.generate(&ingested).await?;

        tracing::info!("📁 Exporting...");
        let saved = self.pipeline.export(&ingested, &document).await?;
        for path in &saved {
            tracing::info!("Output saved to: {}", path);
        }

        Ok(RunOutcome {
            ingested_rows,
            document,
            saved,
        })
    }

    /// Ingests only, for showing the table before generating.
    pub async fn preview(&self, options: &TableViewOptions) -> Result<(IngestResult, TableView)> {
        let ingested = self.pipeline.ingest().await?;
        let view = TableView::new(ingested.rows(), options);
        Ok((ingested, view))
    }
}
