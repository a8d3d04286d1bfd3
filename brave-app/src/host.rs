use std::io::Write;

use async_trait::async_trait;
use brave_config::BraveConfig;
use brave_search::{ApiSettings, BlockError, BlockEvent, EventSink};

/// Writes each emitted event to stdout as one JSON line.
pub struct StdoutSink;

#[async_trait]
impl EventSink for StdoutSink {
    async fn emit(&self, event: BlockEvent) -> Result<(), BlockError> {
        let line = serde_json::to_string(&event).map_err(|e| BlockError::Emit(e.to_string()))?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}").map_err(|e| BlockError::Emit(e.to_string()))
    }
}

pub fn settings_from(cfg: &BraveConfig) -> ApiSettings {
    ApiSettings::new(cfg.api_key.clone())
        .with_base_url(cfg.base_url.clone())
        .with_timeout(cfg.timeout())
}
