//! # Legal Document Analyzer CLI
//!
//! ## Purpose
//! Thin command-line driver around the analysis library for local use:
//! analyze one document file, or compare two documents for similarity, and
//! print the resulting record as JSON.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, document file path(s), CLI flags
//! - **Output**: `AnalysisResult` or `SimilarityVerdict` as pretty JSON on
//!   stdout
//!
//! The library owns no protocol or CLI of its own; this binary is just a
//! local consumer, the same way the surrounding web application consumes the
//! engine from its upload handlers.

use clap::{Arg, ArgAction, Command};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use legal_doc_analysis::{
    comparator::{DocumentComparator, PlaceholderModel},
    config::Config,
    errors::{AnalysisError, Result},
    DocumentAnalyzer, FileMetadata,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("legal-doc-analyzer")
        .version("0.1.0")
        .author("Legal Analysis Team")
        .about("Heuristic legal document analysis: classification, section resolution and similarity detection")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("file")
                .value_name("DOCUMENT")
                .help("Document file to analyze")
                .required_unless_present("compare"),
        )
        .arg(
            Arg::new("compare")
                .long("compare")
                .value_names(["ORIGINAL", "CANDIDATE"])
                .num_args(2)
                .help("Compare two document files for similarity instead of analyzing"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print the JSON output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").expect("has default");
    let config = Arc::new(Config::from_file(config_path)?);

    init_logging(&config)?;
    info!("Configuration loaded from: {}", config_path);

    let pretty = matches.get_flag("pretty");

    if let Some(mut paths) = matches.get_many::<String>("compare") {
        let original_path = paths.next().expect("clap enforces two values");
        let candidate_path = paths.next().expect("clap enforces two values");

        let original = std::fs::read_to_string(original_path)?;
        let candidate = std::fs::read_to_string(candidate_path)?;

        let comparator = DocumentComparator::new(
            &config.normalizer,
            &config.comparator,
            Arc::new(PlaceholderModel),
        );
        let verdict = comparator.compare(&original, &candidate);

        print_json(&verdict, pretty)?;
        return Ok(());
    }

    let path = matches.get_one::<String>("file").expect("required by clap");
    let text = std::fs::read_to_string(path)?;

    let analyzer = DocumentAnalyzer::new(config)?;
    let metadata = FileMetadata {
        name: path.clone(),
        mime_type: "text/plain".to_string(),
    };
    let result = analyzer.analyze(&text, metadata).await?;

    print_json(&result, pretty)?;
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let log_level: tracing::Level =
        config
            .logging
            .level
            .parse()
            .map_err(|_| AnalysisError::Config {
                message: format!("Invalid log level: {}", config.logging.level),
            })?;
    let filter = tracing_subscriber::filter::LevelFilter::from_level(log_level);

    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(layer.json().with_filter(filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .init();
    }

    Ok(())
}

/// Serialize a record to stdout
fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}
