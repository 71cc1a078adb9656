//! Operator tool for checking folio's external collaborators.
//!
//! ```text
//! folio-probe                     # ask the generation backend one question
//! folio-probe --health            # check the model endpoint without generating
//! folio-probe --url <URL>         # extract metadata and analyze one page
//! folio-probe --url <URL> --json  # same, printing the result as JSON
//! ```
//!
//! Configuration comes from the environment (and `.env`), see
//! `InferenceConfig::from_env`, `MetadataConfig::from_env` and
//! `AnalyzerConfig::from_env`.

use std::env;

use anyhow::Context;
use serde_json::json;
use tracing::info;
use tracing_subscriber::prelude::*;

use folio_inference::{check_health, probe, InferenceConfig};
use folio_pipeline::{
    AnalysisPipeline, AnalyzerConfig, ContentAnalyzer, MetadataConfig, MetadataExtractor,
    PipelineConfig, RunOutcome,
};

#[derive(Debug, Default)]
struct Args {
    url: Option<String>,
    health: bool,
    json: bool,
}

fn print_help() {
    println!("folio-probe: check the metadata lookup and generation backend");
    println!();
    println!("USAGE:");
    println!("    folio-probe [--health | --url <URL>] [--json]");
    println!();
    println!("OPTIONS:");
    println!("    -u, --url <URL>   Run extraction and analysis for one page");
    println!("        --health      Check the model endpoint without generating");
    println!("    -j, --json        Print machine-readable output");
    println!("    -h, --help        Show this help");
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().collect();
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--url" | "-u" => {
                i += 1;
                let url = args.get(i).context("--url needs a value")?;
                result.url = Some(url.clone());
            }
            "--health" => {
                result.health = true;
            }
            "--json" | "-j" => {
                result.json = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("Unknown argument: {} (see --help)", other),
        }
        i += 1;
    }

    Ok(result)
}

/// Initialize tracing.
///
/// | Variable | Default |
/// |----------|---------|
/// | `LOG_FORMAT` | `text` (`json` for structured output) |
/// | `LOG_FILE` | unset (stderr); daily-rotated file when set |
/// | `LOG_ANSI` | auto |
/// | `RUST_LOG` | `folio_pipeline=info,folio_inference=info` |
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = env::var("LOG_FILE").ok();
    let log_ansi = env::var("LOG_ANSI").ok().map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "folio_pipeline=info,folio_inference=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let dir = path.parent().unwrap_or(std::path::Path::new("."));
        let name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("folio-probe.log");
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(log_ansi.unwrap_or(false)),
                )
                .init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();
    let args = parse_args()?;

    let backend = InferenceConfig::from_env()?.build_backend()?;
    info!(model = backend.model_name(), "Generation backend configured");

    if args.health {
        let report = check_health(backend.as_ref()).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            let status = if report.healthy { "healthy" } else { "unreachable" };
            println!("{}: {}", report.model, status);
        }
        if !report.healthy {
            anyhow::bail!("Backend {} is not healthy", report.model);
        }
        return Ok(());
    }

    let Some(url) = args.url else {
        let report = probe(backend.as_ref()).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", report.message);
            println!("{}", report.response);
        }
        return Ok(());
    };

    let extractor = MetadataExtractor::from_config(&MetadataConfig::from_env()?)?;
    let analyzer = ContentAnalyzer::with_config(backend, AnalyzerConfig::from_env());
    let pipeline = AnalysisPipeline::new(extractor, analyzer, PipelineConfig::from_env());

    let outcome = pipeline.run_now(&url).await;
    let snapshot = pipeline.snapshot().await;

    match outcome {
        RunOutcome::Completed(outcome) => {
            if args.json {
                let output = json!({
                    "draft": snapshot.draft,
                    "analysis": outcome.result,
                    "source": outcome.source,
                    "reason": outcome.reason,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Title:       {}", snapshot.draft.title);
                println!("Description: {}", snapshot.draft.description);
                if let Some(thumbnail) = snapshot.draft.thumbnail_url.as_deref() {
                    println!("Thumbnail:   {}", thumbnail);
                }
                println!();
                if let Some(reason) = outcome.reason.as_deref() {
                    println!("(fallback analysis: {})", reason);
                }
                println!("{}", serde_json::to_string_pretty(&outcome.result)?);
            }
            Ok(())
        }
        RunOutcome::Failed(message) => anyhow::bail!("{}", message),
        RunOutcome::Ignored => anyhow::bail!("Not an absolute URL: {}", url),
        RunOutcome::Superseded => anyhow::bail!("Run was superseded"),
    }
}
