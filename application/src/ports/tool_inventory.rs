//! Tool inventory port
//!
//! Persists the last detection outcome per tool so a fresh process can
//! route intents before its first scan completes.

use actiongate_domain::ToolInfo;
use async_trait::async_trait;

#[async_trait]
pub trait ToolInventoryStore: Send + Sync {
    /// Insert or replace one row per tool, keyed by tool id.
    async fn upsert_tools(&self, tools: &[ToolInfo]) -> Result<(), String>;

    async fn load_tools(&self) -> Result<Vec<ToolInfo>, String>;
}
