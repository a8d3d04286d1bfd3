//! The callable-unit contract shared by every search block.
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::SearchApi;
use crate::error::BlockError;
use crate::schema::{FieldSpec, OutputField};
use crate::types::BlockEvent;

pub const CATEGORY: &str = "Search";

/// Receives the one event a successful invocation produces.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: BlockEvent) -> Result<(), BlockError>;
}

/// What a block needs from its host for a single invocation.
#[derive(Clone, Copy)]
pub struct BlockContext<'a> {
    pub api: &'a dyn SearchApi,
    pub sink: &'a dyn EventSink,
}

#[async_trait]
pub trait Block: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    fn category(&self) -> &'static str {
        CATEGORY
    }

    /// Declared input fields; also the table the input is validated against.
    fn input_schema(&self) -> &'static [FieldSpec];

    fn output_schema(&self) -> &'static [OutputField];

    /// Validate `input`, run the search and emit exactly one event.
    /// On error nothing is emitted.
    async fn on_event(&self, ctx: BlockContext<'_>, input: &Value) -> Result<(), BlockError>;
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<BlockEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BlockEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn emit(&self, event: BlockEvent) -> Result<(), BlockError> {
        self.events
            .lock()
            .map_err(|e| BlockError::Emit(e.to_string()))?
            .push(event);
        Ok(())
    }
}
