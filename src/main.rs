use clap::Parser;
use fast_docgen::core::doc_number::generate_doc_no_app;
use fast_docgen::core::export::copy_to_clipboard;
use fast_docgen::core::format::{TableView, TableViewOptions};
use fast_docgen::domain::model::{RawRecord, SessionStatus};
use fast_docgen::utils::error::{DocgenError, ErrorSeverity};
use fast_docgen::utils::{logger, validation::Validate};
use fast_docgen::{CliConfig, DocumentEngine, FilePipeline, LocalStorage, StdoutClipboard};

const PREVIEW_ROWS: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting fast-docgen");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let settings = match config.load_settings() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    if config.generate_doc_no_app {
        println!("{}", generate_doc_no_app(&settings.generation.doc_no_app_prefix));
        return Ok(());
    }

    // 表單欄位全部檢查後一次列出錯誤
    let mut form = config.document_form();
    if !form.validate_all() {
        for (label, message) in form.errors.failures() {
            tracing::error!("❌ {}: {}", label, message);
            eprintln!("❌ {}: {}", label, message);
        }
        std::process::exit(1);
    }
    let context = form.freeze();

    let source = LocalStorage::new(".".to_string());
    let storage = LocalStorage::new(settings.export.output_path.clone());
    let pipeline = FilePipeline::new(
        source,
        storage,
        settings,
        config.input.clone(),
        config.file_type.clone(),
        context,
    );
    let engine = DocumentEngine::new(pipeline);

    if config.preview {
        match engine.preview(&TableViewOptions::default()).await {
            Ok((ingested, view)) => print_preview(&view, ingested.rows()),
            Err(e) => exit_with(&e),
        }
    }

    let mut status = SessionStatus::default();
    match engine.run(&mut status).await {
        Ok(outcome) => {
            let template = outcome
                .document
                .template_name()
                .map(|t| t.to_string())
                .unwrap_or_default();
            println!(
                "✅ Generated {} with {} rows",
                template,
                outcome.document.row_count()
            );
            for path in &outcome.saved {
                println!("📁 Output saved to: {}", path);
            }

            if config.copy {
                copy_to_clipboard(&StdoutClipboard, &outcome.document, &mut status);
                if let Some(copy_status) = &status.copy_status {
                    eprintln!("📋 {}", copy_status);
                }
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn print_preview(view: &TableView, rows: &[RawRecord]) {
    println!("{}", view.headers.join(" | "));
    for row in rows.iter().take(PREVIEW_ROWS) {
        let cells: Vec<String> = view
            .raw_keys
            .iter()
            .map(|key| match row.get(key) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
    if view.row_count > PREVIEW_ROWS {
        println!("... {} more rows", view.row_count - PREVIEW_ROWS);
    }
    println!("({} rows)", view.row_count);
}

fn exit_with(e: &DocgenError) -> ! {
    tracing::error!(
        "❌ fast-docgen failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
