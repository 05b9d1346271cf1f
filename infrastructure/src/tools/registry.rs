//! Tool Registry
//!
//! The [`ToolRegistry`] owns every [`DomainOrchestrator`], keeps the last
//! detection outcome per tool in a side table, and implements
//! [`IntentDispatcher`] for the action executor.
//!
//! # Detection
//!
//! `scan()` probes every tool of every domain at once. Each probe gets its
//! own timeout; a probe that hangs or finds nothing marks only its own tool
//! as not installed. Results replace the side table and are written to the
//! optional [`ToolInventoryStore`] so the next process can start warm:
//!
//! ```ignore
//! let registry = ToolRegistry::from_catalog(runner).with_inventory(store);
//! registry.warm_from_store().await;   // usable immediately
//! registry.scan().await;              // authoritative
//! ```
//!
//! Descriptors are never mutated; only the side table changes.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use actiongate_application::{
    IntentDispatcher, OperationLog, OperationLogEntry, ProcessRunner, ToolInventoryStore,
};
use actiongate_domain::{
    ActionId, DomainOrchestrator, OperationResult, Params, ToolDomain, ToolInfo,
    ToolOperationInfo, ToolStatus, ToolWrapper, capabilities_summary,
};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::catalog;

/// Default per-tool detection timeout
pub const DEFAULT_DETECT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ToolRegistry {
    orchestrators: Vec<DomainOrchestrator>,
    /// Tool id -> last known descriptor + status
    statuses: RwLock<HashMap<String, ToolInfo>>,
    inventory: Option<Arc<dyn ToolInventoryStore>>,
    detect_timeout: Duration,
}

impl ToolRegistry {
    /// Create a registry over `orchestrators`, in the given order.
    ///
    /// Route gaps are logged by [`DomainOrchestrator::validate`].
    pub fn new(orchestrators: Vec<DomainOrchestrator>) -> Self {
        for orchestrator in &orchestrators {
            orchestrator.validate();
        }
        Self {
            orchestrators,
            statuses: RwLock::new(HashMap::new()),
            inventory: None,
            detect_timeout: DEFAULT_DETECT_TIMEOUT,
        }
    }

    /// Registry over the built-in tool catalog.
    pub fn from_catalog(runner: Arc<dyn ProcessRunner>) -> Self {
        Self::new(catalog::orchestrators(runner))
    }

    pub fn with_inventory(mut self, inventory: Arc<dyn ToolInventoryStore>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn with_detect_timeout(mut self, timeout: Duration) -> Self {
        self.detect_timeout = timeout;
        self
    }

    pub fn orchestrators(&self) -> &[DomainOrchestrator] {
        &self.orchestrators
    }

    pub fn orchestrator(&self, domain: ToolDomain) -> Option<&DomainOrchestrator> {
        self.orchestrators.iter().find(|o| o.domain() == domain)
    }

    fn tools(&self) -> impl Iterator<Item = &Arc<dyn ToolWrapper>> {
        self.orchestrators.iter().flat_map(|o| o.tools())
    }

    fn tool(&self, tool_id: &str) -> Option<&Arc<dyn ToolWrapper>> {
        self.tools().find(|t| t.id() == tool_id)
    }

    /// Detect every tool concurrently and refresh the side table.
    ///
    /// Returns one [`ToolInfo`] per tool in registry order.
    pub async fn scan(&self) -> Vec<ToolInfo> {
        let started = Instant::now();
        let timeout = self.detect_timeout;

        let probes = self.tools().map(|tool| async move {
            let status = match tokio::time::timeout(timeout, tool.detect()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!(tool = tool.id(), ?timeout, "Detection timed out");
                    ToolStatus::not_installed()
                }
            };
            debug!(
                tool = tool.id(),
                installed = status.installed,
                version = ?status.version,
                "Detection finished"
            );
            let mut info = tool.info(&status);
            info.last_checked = Some(Utc::now());
            info
        });
        let infos = join_all(probes).await;

        {
            let mut statuses = self.statuses.write().unwrap_or_else(PoisonError::into_inner);
            statuses.clear();
            statuses.extend(infos.iter().map(|i| (i.id.clone(), i.clone())));
        }

        if let Some(inventory) = &self.inventory
            && let Err(e) = inventory.upsert_tools(&infos).await
        {
            warn!(error = %e, "Failed to persist tool inventory");
        }

        info!(
            tools = infos.len(),
            installed = infos.iter().filter(|i| i.installed).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool scan complete"
        );
        infos
    }

    /// Seed the side table from the inventory store.
    ///
    /// Only tools still in the catalog are taken, and entries already set by
    /// a scan are kept. Returns the number of entries loaded.
    pub async fn warm_from_store(&self) -> usize {
        let Some(inventory) = &self.inventory else {
            return 0;
        };
        let stored = match inventory.load_tools().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to load tool inventory");
                return 0;
            }
        };

        let mut statuses = self.statuses.write().unwrap_or_else(PoisonError::into_inner);
        let mut loaded = 0;
        for row in stored {
            let Some(tool) = self.tool(&row.id) else {
                debug!(tool = %row.id, "Stored tool no longer in catalog, ignoring");
                continue;
            };
            if statuses.contains_key(&row.id) {
                continue;
            }
            let status = ToolStatus {
                installed: row.installed,
                version: row.version,
                path: row.path,
            };
            let mut info = tool.info(&status);
            info.last_checked = row.last_checked;
            statuses.insert(row.id, info);
            loaded += 1;
        }
        debug!(loaded, "Warmed tool statuses from store");
        loaded
    }

    /// Every tool with its last known status. Unscanned tools report not
    /// installed.
    pub fn all_tools(&self) -> Vec<ToolInfo> {
        let statuses = self.statuses.read().unwrap_or_else(PoisonError::into_inner);
        self.tools()
            .map(|tool| {
                statuses
                    .get(tool.id())
                    .cloned()
                    .unwrap_or_else(|| tool.info(&ToolStatus::not_installed()))
            })
            .collect()
    }

    pub fn installed_tools(&self) -> Vec<ToolInfo> {
        self.all_tools().into_iter().filter(|t| t.installed).collect()
    }

    pub fn installed_ids(&self) -> HashSet<String> {
        let statuses = self.statuses.read().unwrap_or_else(PoisonError::into_inner);
        statuses
            .values()
            .filter(|info| info.installed)
            .map(|info| info.id.clone())
            .collect()
    }

    /// Operations offered by installed tools.
    pub fn operations(&self) -> Vec<ToolOperationInfo> {
        let installed = self.installed_ids();
        self.tools()
            .filter(|tool| installed.contains(tool.id()))
            .flat_map(|tool| tool.operation_infos())
            .collect()
    }

    /// The "## Available Tools" prompt block for the current installed set.
    pub fn capabilities_summary(&self) -> String {
        capabilities_summary(&self.orchestrators, &self.installed_ids())
    }
}

#[async_trait]
impl IntentDispatcher for ToolRegistry {
    async fn execute_intent(
        &self,
        domain: &str,
        intent: &str,
        params: &Params,
        log: &dyn OperationLog,
        action_id: Option<&ActionId>,
    ) -> OperationResult {
        let started = Instant::now();

        let result = match domain.parse::<ToolDomain>() {
            Ok(parsed) => match self.orchestrator(parsed) {
                Some(orchestrator) => {
                    orchestrator
                        .execute(intent, params, &self.installed_ids())
                        .await
                }
                None => OperationResult::unknown(format!("Unknown domain: {}", domain)),
            },
            Err(e) => OperationResult::unknown(e.to_string()),
        };

        let result = if result.duration_ms == 0 {
            result.with_duration(started.elapsed().as_millis() as u64)
        } else {
            result
        };

        let entry = OperationLogEntry::new(domain, intent, params, &result).with_action(action_id);
        if let Err(e) = log.record(&entry).await {
            warn!(domain, intent, error = %e, "Failed to record tool operation");
        }

        result
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("orchestrators", &self.orchestrators)
            .field("detect_timeout", &self.detect_timeout)
            .finish()
    }
}
