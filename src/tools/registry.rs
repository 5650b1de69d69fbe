//! Registry of locally implemented tools.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Once};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{info, warn};

use super::{html_preview, ToolDefinition, ToolResponse};

pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<ToolDefinition>>>,
    init: Once,
    public_dir: PathBuf,
}

impl ToolRegistry {
    /// `public_dir` is where file-writing tools put their output.
    pub fn new(public_dir: PathBuf) -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            init: Once::new(),
            public_dir,
        }
    }

    /// Register the built-in tool set on first call; later calls do nothing.
    pub fn ensure_registered(&self) {
        self.init.call_once(|| {
            self.register(html_preview::definition(&self.public_dir));
            info!(count = self.len(), "Custom tools registered");
        });
    }

    /// Add or replace a tool.
    pub fn register(&self, def: ToolDefinition) {
        self.tools.write().insert(def.slug.clone(), Arc::new(def));
    }

    pub fn get(&self, slug: &str) -> Option<Arc<ToolDefinition>> {
        self.tools.read().get(slug).cloned()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.tools.read().contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    /// Validate `input` and, if it passes, run the tool.
    ///
    /// Unknown slugs and validation errors come back as failed responses.
    pub async fn execute(&self, slug: &str, input: Value) -> ToolResponse {
        let Some(def) = self.get(slug) else {
            return ToolResponse::failure(format!("Unknown tool: {}", slug));
        };

        if let Err(e) = def.handler.validate(&input) {
            warn!(tool = %slug, error = %e, "Tool input rejected");
            return ToolResponse::failure(format!("Invalid input for {}: {}", slug, e));
        }

        def.handler.execute(input).await
    }
}
