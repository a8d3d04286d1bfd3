use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use brave_common::observability::{LogConfig, init_logging};
use brave_config::{BraveConfig, BraveConfigLoader};
use brave_search::app::{BlockDescriptor, CONFIG_FIELDS, INSTALLATION_INSTRUCTIONS, NAME};
use brave_search::{ApiSettings, BraveSearchApp, blocks, probe};
use clap::{Parser, Subcommand};
use host::{StdoutSink, settings_from};

mod host;

/// Run Brave Search blocks from the command line.
#[derive(Parser)]
#[command(name = "brave-search")]
#[command(version)]
struct Cli {
    /// Config file path (optional; `BRAVE__*` env vars win)
    #[arg(short, long, default_value = "brave.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the configured API key works
    Sync,

    /// Invoke one block and print its event as a JSON line
    Run {
        /// Block id: webSearch, newsSearch or summarizerSearch
        block: String,

        /// Block input as a JSON object
        #[arg(short, long)]
        input: String,
    },

    /// Print app metadata and block schemas
    Schema {
        /// Only this block
        block: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg: BraveConfig = BraveConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // 2) Logging from the `logging` section
    let log_path = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
        ..Default::default()
    })?;
    tracing::debug!(log_path = %log_path.display(), config = ?cfg, "app.start");

    let mut out = std::io::stdout();
    if !dispatch(cli.command, settings_from(&cfg), &mut out).await? {
        std::process::exit(1);
    }
    Ok(())
}

/// Execute one subcommand. Returns `false` when `sync` reports a failed
/// configuration. Only `run` builds a client, so `schema` and `sync` work
/// with any configured key.
async fn dispatch<W: Write>(command: Commands, settings: ApiSettings, out: &mut W) -> Result<bool> {
    match command {
        Commands::Sync => {
            let status = probe(&settings).await;
            writeln!(out, "{}", serde_json::to_string(&status)?)?;
            Ok(status.is_ready())
        }
        Commands::Run { block, input } => {
            let input: serde_json::Value =
                serde_json::from_str(&input).context("--input must be valid JSON")?;
            let app = BraveSearchApp::new(settings)?;
            app.invoke(&block, &input, &StdoutSink).await?;
            Ok(true)
        }
        Commands::Schema { block: Some(id) } => {
            let Some(block) = blocks::all().into_iter().find(|b| b.id() == id) else {
                bail!("unknown block: {id}");
            };
            writeln!(
                out,
                "{}",
                serde_json::to_string_pretty(&BlockDescriptor::of(block.as_ref()))?
            )?;
            Ok(true)
        }
        Commands::Schema { block: None } => {
            let described: Vec<BlockDescriptor> = blocks::all()
                .iter()
                .map(|b| BlockDescriptor::of(b.as_ref()))
                .collect();
            let doc = serde_json::json!({
                "name": NAME,
                "installationInstructions": INSTALLATION_INSTRUCTIONS.trim(),
                "config": CONFIG_FIELDS,
                "blocks": described,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    // Rejected as an HTTP header value, so no client can be built from it.
    const UNUSABLE_KEY: &str = "bad\nkey";

    async fn run(command: Commands, settings: ApiSettings) -> (bool, String) {
        let mut out = Vec::new();
        let ok = dispatch(command, settings, &mut out).await.unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn sync_reports_unusable_key_as_failed_status() {
        let (ok, printed) = run(Commands::Sync, ApiSettings::new(UNUSABLE_KEY)).await;
        assert!(!ok);
        let status: Value = serde_json::from_str(printed.trim()).unwrap();
        assert_eq!(status["status"], "failed");
        assert!(
            status["reason"]
                .as_str()
                .unwrap()
                .starts_with("Invalid API configuration")
        );
    }

    #[tokio::test]
    async fn sync_without_key_needs_no_network() {
        let (ok, printed) = run(Commands::Sync, ApiSettings::new("")).await;
        assert!(!ok);
        assert_eq!(
            printed.trim(),
            r#"{"status":"failed","reason":"API Key is required"}"#
        );
    }

    #[tokio::test]
    async fn schema_ignores_credentials() {
        let (ok, printed) = run(
            Commands::Schema { block: None },
            ApiSettings::new(UNUSABLE_KEY),
        )
        .await;
        assert!(ok);
        let doc: Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(doc["name"], NAME);
        let ids: Vec<&str> = doc["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["webSearch", "summarizerSearch", "newsSearch"]);

        let (_, printed) = run(
            Commands::Schema {
                block: Some("newsSearch".into()),
            },
            ApiSettings::new(""),
        )
        .await;
        let news: Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(news["outputs"][1]["items"]["type"], "object");
    }

    #[tokio::test]
    async fn unknown_block_schema_is_an_error() {
        let mut out = Vec::new();
        let err = dispatch(
            Commands::Schema {
                block: Some("imageSearch".into()),
            },
            ApiSettings::new(""),
            &mut out,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "unknown block: imageSearch");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn run_rejects_malformed_input_before_building_a_client() {
        let mut out = Vec::new();
        let err = dispatch(
            Commands::Run {
                block: "webSearch".into(),
                input: "{not json".into(),
            },
            ApiSettings::new(UNUSABLE_KEY),
            &mut out,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "--input must be valid JSON");
    }
}
