//! SQLite store
//!
//! ```text
//! actions              one row per Action, never deleted
//! tool_operations_log  one row per intent dispatch
//! tools                last detection outcome per tool id
//! ```
//!
//! Timestamps are RFC 3339 UTC strings with fixed microsecond precision, so
//! lexical order is chronological order.

use actiongate_application::{
    ActionFilter, ActionRepository, OperationLog, OperationLogEntry, RepositoryError,
    ToolInventoryStore,
};
use actiongate_domain::{
    Action, ActionId, ActionModule, ActionResolution, ActionStatus, Params, Tier, ToolDomain,
    ToolInfo,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS actions (
    id TEXT PRIMARY KEY,
    conversation_id TEXT,
    tier TEXT NOT NULL,
    description TEXT NOT NULL,
    command TEXT NOT NULL,
    module TEXT NOT NULL,
    status TEXT NOT NULL,
    result TEXT,
    error TEXT,
    created_at TEXT NOT NULL,
    resolved_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_actions_status ON actions(status);
CREATE INDEX IF NOT EXISTS idx_actions_conversation ON actions(conversation_id);

CREATE TABLE IF NOT EXISTS tool_operations_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    action_id TEXT,
    tool_id TEXT NOT NULL,
    domain TEXT NOT NULL,
    operation_id TEXT NOT NULL,
    params TEXT NOT NULL,
    success INTEGER NOT NULL,
    output TEXT,
    error TEXT,
    duration INTEGER NOT NULL,
    executed_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tool_ops_action ON tool_operations_log(action_id);

CREATE TABLE IF NOT EXISTS tools (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    domain TEXT NOT NULL,
    installed INTEGER NOT NULL,
    version TEXT,
    path TEXT,
    install_method TEXT,
    last_checked TEXT,
    capabilities TEXT NOT NULL,
    install_command TEXT
);
";

const ACTION_COLUMNS: &str = "id, conversation_id, tier, description, command, module, status, \
                              result, error, created_at, resolved_at";

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{}': {}", value, e))
}

fn storage(e: rusqlite::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

/// Raw `actions` row, converted to an [`Action`] outside the row callback.
struct ActionRow {
    id: String,
    conversation_id: Option<String>,
    tier: String,
    description: String,
    command: String,
    module: String,
    status: String,
    result: Option<String>,
    error: Option<String>,
    created_at: String,
    resolved_at: Option<String>,
}

impl ActionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            tier: row.get(2)?,
            description: row.get(3)?,
            command: row.get(4)?,
            module: row.get(5)?,
            status: row.get(6)?,
            result: row.get(7)?,
            error: row.get(8)?,
            created_at: row.get(9)?,
            resolved_at: row.get(10)?,
        })
    }

    fn into_action(self) -> Result<Action, RepositoryError> {
        let corrupt = |reason: String| RepositoryError::Corrupt {
            id: self.id.clone(),
            reason,
        };

        let tier: Tier = self.tier.parse().map_err(|e| corrupt(format!("{}", e)))?;
        let status: ActionStatus = self.status.parse().map_err(|e| corrupt(format!("{}", e)))?;
        let created_at = parse_timestamp(&self.created_at).map_err(corrupt)?;
        let resolved_at = self
            .resolved_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(corrupt)?;

        Ok(Action {
            id: ActionId::new(self.id),
            conversation_id: self.conversation_id,
            tier,
            description: self.description,
            command: self.command,
            module: ActionModule::from(self.module),
            status,
            result: self.result,
            error: self.error,
            created_at,
            resolved_at,
        })
    }
}

/// How long a writer waits on another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed implementation of the storage ports.
///
/// Statements run on the blocking pool so a slow disk or a lock held by
/// another process never stalls the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RepositoryError::Storage(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(storage)?;
        debug!(path = %path.display(), "Opened database");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::init(Connection::open_in_memory().map_err(storage)?)
    }

    fn init(conn: Connection) -> Result<Self, RepositoryError> {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(storage)?;
        conn.execute_batch(SCHEMA).map_err(storage)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` against the connection on the blocking pool.
    async fn call<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut Connection) -> Result<T, RepositoryError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut *conn)
        })
        .await
        .map_err(|e| RepositoryError::Storage(format!("Storage task failed: {}", e)))?
    }

    /// Most recent operation log entries, newest first.
    pub fn recent_operations(&self, limit: usize) -> Result<Vec<OperationLogEntry>, RepositoryError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT action_id, tool_id, domain, operation_id, params, success, output, error, \
                 duration, executed_at FROM tool_operations_log ORDER BY id DESC LIMIT ?1",
            )
            .map_err(storage)?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, bool>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, i64>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })
            .map_err(storage)?;

        let mut entries = Vec::new();
        for row in rows {
            let (action_id, tool_id, domain, operation_id, params, success, output, error, duration, executed_at) =
                row.map_err(storage)?;
            entries.push(OperationLogEntry {
                action_id: action_id.map(ActionId::new),
                tool_id,
                domain,
                operation_id,
                params: serde_json::from_str::<Params>(&params).unwrap_or_default(),
                success,
                output,
                error,
                duration_ms: duration.max(0) as u64,
                executed_at: parse_timestamp(&executed_at).unwrap_or_else(|_| Utc::now()),
            });
        }
        Ok(entries)
    }
}

#[async_trait]
impl ActionRepository for SqliteStore {
    async fn insert(&self, action: &Action) -> Result<(), RepositoryError> {
        let action = action.clone();
        self.call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO actions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    ACTION_COLUMNS
                ),
                params![
                    action.id.as_str(),
                    action.conversation_id,
                    action.tier.as_str(),
                    action.description,
                    action.command,
                    action.module.as_str(),
                    action.status.as_str(),
                    action.result,
                    action.error,
                    timestamp(&action.created_at),
                    action.resolved_at.as_ref().map(timestamp),
                ],
            )
            .map_err(storage)?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: &ActionId) -> Result<Option<Action>, RepositoryError> {
        let id = id.clone();
        self.call(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM actions WHERE id = ?1", ACTION_COLUMNS),
                    params![id.as_str()],
                    ActionRow::from_row,
                )
                .optional()
                .map_err(storage)?;
            row.map(ActionRow::into_action).transpose()
        })
        .await
    }

    async fn claim(&self, id: &ActionId) -> Result<bool, RepositoryError> {
        let id = id.clone();
        self.call(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE actions SET status = ?1 WHERE id = ?2 AND status = ?3",
                    params![
                        ActionStatus::Approved.as_str(),
                        id.as_str(),
                        ActionStatus::Pending.as_str(),
                    ],
                )
                .map_err(storage)?;
            Ok(changed == 1)
        })
        .await
    }

    async fn update_status(
        &self,
        id: &ActionId,
        resolution: &ActionResolution,
    ) -> Result<bool, RepositoryError> {
        let id = id.clone();
        let resolution = resolution.clone();
        self.call(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE actions SET status = ?1, result = ?2, error = ?3, resolved_at = ?4 \
                     WHERE id = ?5 AND status = ?6",
                    params![
                        resolution.status.as_str(),
                        resolution.result,
                        resolution.error,
                        timestamp(&resolution.resolved_at),
                        id.as_str(),
                        resolution.from_status().as_str(),
                    ],
                )
                .map_err(storage)?;
            Ok(changed == 1)
        })
        .await
    }

    async fn list(&self, filter: &ActionFilter) -> Result<Vec<Action>, RepositoryError> {
        let mut sql = format!("SELECT {} FROM actions WHERE 1 = 1", ACTION_COLUMNS);
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            args.push(status.as_str().to_string());
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        if let Some(conversation_id) = &filter.conversation_id {
            args.push(conversation_id.clone());
            sql.push_str(&format!(" AND conversation_id = ?{}", args.len()));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        self.call(move |conn| {
            let mut stmt = conn.prepare(&sql).map_err(storage)?;
            let rows = stmt
                .query_map(params_from_iter(args.iter()), ActionRow::from_row)
                .map_err(storage)?;

            let mut actions = Vec::new();
            for row in rows {
                actions.push(row.map_err(storage)?.into_action()?);
            }
            Ok(actions)
        })
        .await
    }
}

#[async_trait]
impl OperationLog for SqliteStore {
    async fn record(&self, entry: &OperationLogEntry) -> Result<(), String> {
        let params_json = serde_json::to_string(&entry.params).map_err(|e| e.to_string())?;
        let entry = entry.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO tool_operations_log \
                 (action_id, tool_id, domain, operation_id, params, success, output, error, duration, executed_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    entry.action_id.as_ref().map(ActionId::as_str),
                    entry.tool_id,
                    entry.domain,
                    entry.operation_id,
                    params_json,
                    entry.success,
                    entry.output,
                    entry.error,
                    entry.duration_ms as i64,
                    timestamp(&entry.executed_at),
                ],
            )
            .map_err(storage)?;
            Ok(())
        })
        .await
        .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ToolInventoryStore for SqliteStore {
    async fn upsert_tools(&self, tools: &[ToolInfo]) -> Result<(), String> {
        let tools = tools.to_vec();
        self.call(move |conn| {
            let tx = conn.transaction().map_err(storage)?;
            for tool in &tools {
                let capabilities = serde_json::to_string(&tool.capabilities)
                    .map_err(|e| RepositoryError::Storage(e.to_string()))?;
                tx.execute(
                    "INSERT OR REPLACE INTO tools \
                     (id, name, description, domain, installed, version, path, install_method, last_checked, capabilities, install_command) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        tool.id,
                        tool.name,
                        tool.description,
                        tool.domain.as_str(),
                        tool.installed,
                        tool.version,
                        tool.path,
                        tool.install_method,
                        tool.last_checked.as_ref().map(timestamp),
                        capabilities,
                        tool.install_command,
                    ],
                )
                .map_err(storage)?;
            }
            tx.commit().map_err(storage)
        })
        .await
        .map_err(|e| e.to_string())
    }

    async fn load_tools(&self) -> Result<Vec<ToolInfo>, String> {
        let rows = self
            .call(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, name, description, domain, installed, version, path, install_method, \
                         last_checked, capabilities, install_command FROM tools ORDER BY id",
                    )
                    .map_err(storage)?;

                let rows = stmt
                    .query_map([], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, bool>(4)?,
                            row.get::<_, Option<String>>(5)?,
                            row.get::<_, Option<String>>(6)?,
                            row.get::<_, Option<String>>(7)?,
                            row.get::<_, Option<String>>(8)?,
                            row.get::<_, String>(9)?,
                            row.get::<_, Option<String>>(10)?,
                        ))
                    })
                    .map_err(storage)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(storage)
            })
            .await
            .map_err(|e| e.to_string())?;

        let mut tools = Vec::new();
        for (id, name, description, domain, installed, version, path, install_method, last_checked, capabilities, install_command) in rows {
            let Ok(domain) = domain.parse::<ToolDomain>() else {
                warn!(tool = %id, domain = %domain, "Skipping cached tool with unknown domain");
                continue;
            };

            tools.push(ToolInfo {
                id,
                name,
                description,
                domain,
                installed,
                version,
                path,
                install_method,
                install_command,
                last_checked: last_checked.as_deref().and_then(|t| parse_timestamp(t).ok()),
                capabilities: serde_json::from_str(&capabilities).unwrap_or_default(),
            });
        }
        Ok(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiongate_application::{
        ActionExecutor, ApprovalGate, GateError, IntentDispatcher, NoOperationLog, ProcessError,
        ProcessRunner,
    };
    use actiongate_domain::OperationResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ==================== Test Mocks ====================

    /// Slow runner, so both gates are in flight at once.
    #[derive(Default)]
    struct CountingRunner {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl ProcessRunner for CountingRunner {
        async fn run(&self, _command_line: &str, _timeout: Duration) -> Result<String, ProcessError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok("removed".into())
        }
    }

    struct NoDispatch;

    #[async_trait]
    impl IntentDispatcher for NoDispatch {
        async fn execute_intent(
            &self,
            domain: &str,
            _intent: &str,
            _params: &Params,
            _log: &dyn OperationLog,
            _action_id: Option<&ActionId>,
        ) -> OperationResult {
            OperationResult::unknown(format!("Unknown domain: {}", domain))
        }
    }

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn red(id: &str) -> Action {
        Action::new(Tier::Red, ActionModule::Shell, "Delete temp", "rm -rf /tmp")
            .with_id(id)
            .with_conversation("conv-1")
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let store = store();
        let action = red("a1");
        store.insert(&action).await.unwrap();

        let loaded = store.get(&ActionId::new("a1")).await.unwrap().unwrap();
        assert_eq!(loaded.id, action.id);
        assert_eq!(loaded.tier, Tier::Red);
        assert_eq!(loaded.status, ActionStatus::Pending);
        assert_eq!(loaded.module, ActionModule::Shell);
        assert_eq!(loaded.conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(
            loaded.created_at.timestamp_micros(),
            action.created_at.timestamp_micros()
        );
        assert!(loaded.resolved_at.is_none());

        assert!(store.get(&ActionId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_guarded_transitions() {
        let store = store();
        store.insert(&red("a1")).await.unwrap();
        store.insert(&red("a2")).await.unwrap();
        let id = ActionId::new("a1");

        // An outcome is only written over a claimed row.
        let executed = ActionResolution::from_outcome(true, Some("ok".into()), None, Utc::now());
        assert!(!store.update_status(&id, &executed).await.unwrap());

        assert!(store.claim(&id).await.unwrap());
        assert!(!store.claim(&id).await.unwrap());
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            ActionStatus::Approved
        );

        let denied = ActionResolution::denied(Utc::now());
        assert!(!store.update_status(&id, &denied).await.unwrap());
        assert!(store.update_status(&id, &executed).await.unwrap());
        assert!(!store.update_status(&id, &executed).await.unwrap());

        let loaded = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ActionStatus::Executed);
        assert_eq!(loaded.result.as_deref(), Some("ok"));
        assert!(loaded.resolved_at.is_some());

        let other = ActionId::new("a2");
        assert!(store.update_status(&other, &denied).await.unwrap());
        assert!(!store.claim(&other).await.unwrap());

        assert!(!store.claim(&ActionId::new("missing")).await.unwrap());
        assert!(!store
            .update_status(&ActionId::new("missing"), &denied)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_two_connections_execute_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actiongate.db");
        let first = Arc::new(SqliteStore::open(&path).unwrap());
        let second = Arc::new(SqliteStore::open(&path).unwrap());
        first.insert(&red("a1")).await.unwrap();

        let runner = Arc::new(CountingRunner::default());
        let gate = |store: Arc<SqliteStore>| {
            let executor = ActionExecutor::new(runner.clone(), Arc::new(NoDispatch));
            ApprovalGate::new(store, Arc::new(executor), Arc::new(NoOperationLog))
        };
        let (one, two) = (gate(first.clone()), gate(second.clone()));
        let id = ActionId::new("a1");

        let (sync_path, push_path) =
            tokio::join!(one.resolve(&id, true), two.handle_response(&id, true));

        assert_eq!(runner.runs.load(Ordering::SeqCst), 1);
        let resolved = match (sync_path, push_path) {
            (Ok(action), None) => action,
            (Err(GateError::AlreadyResolved(_)), Some(action)) => action,
            other => panic!("expected exactly one resolution, got {:?}", other),
        };
        assert_eq!(resolved.status, ActionStatus::Executed);

        let stored = second.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, ActionStatus::Executed);
        assert_eq!(stored.result.as_deref(), Some("removed"));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let store = store();
        for i in 0..5 {
            store.insert(&red(&format!("a{}", i))).await.unwrap();
        }
        let green = Action::new(Tier::Green, ActionModule::Cmd, "List", "dir").with_id("g1");
        store.insert(&green).await.unwrap();

        let all = store.list(&ActionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].id, ActionId::new("g1"));
        assert_eq!(all[5].id, ActionId::new("a0"));

        let pending = store.list(&ActionFilter::pending()).await.unwrap();
        assert_eq!(pending.len(), 5);

        let limited = store
            .list(&ActionFilter::default().with_limit(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);

        let approved = store
            .list(&ActionFilter::default().with_status(ActionStatus::Approved))
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);

        let by_conversation = store
            .list(&ActionFilter::default().with_conversation("conv-1"))
            .await
            .unwrap();
        assert_eq!(by_conversation.len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_module_survives_storage() {
        let store = store();
        let action = Action::new(Tier::Yellow, ActionModule::from("python"), "d", "print(1)")
            .with_id("p1");
        store.insert(&action).await.unwrap();

        let loaded = store.get(&ActionId::new("p1")).await.unwrap().unwrap();
        assert_eq!(loaded.module, ActionModule::Other("python".into()));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_reported() {
        let store = store();
        store
            .conn()
            .execute(
                "INSERT INTO actions (id, tier, description, command, module, status, created_at) \
                 VALUES ('bad', 'purple', 'd', 'c', 'shell', 'pending', '2025-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        let err = store.get(&ActionId::new("bad")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_operation_log_records_entries() {
        let store = store();
        let mut params = Params::new();
        params.insert("package".into(), "git".into());
        let result = OperationResult::success("winget", "installed").with_duration(120);

        let entry = OperationLogEntry::new("packages", "install", &params, &result)
            .with_action(Some(&ActionId::new("a1")));
        store.record(&entry).await.unwrap();
        store
            .record(&OperationLogEntry::new(
                "drivers",
                "gpu-info",
                &Params::new(),
                &OperationResult::no_tool("none installed"),
            ))
            .await
            .unwrap();

        let entries = store.recent_operations(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].domain, "drivers");
        assert!(!entries[0].success);
        assert!(entries[0].action_id.is_none());
        assert_eq!(entries[1].tool_id, "winget");
        assert_eq!(entries[1].params, params);
        assert_eq!(entries[1].duration_ms, 120);
        assert_eq!(entries[1].action_id, Some(ActionId::new("a1")));
    }

    #[tokio::test]
    async fn test_tool_inventory_upsert_replaces() {
        let store = store();
        let mut tool = ToolInfo {
            id: "winget".into(),
            name: "Windows Package Manager".into(),
            description: "Package manager".into(),
            domain: ToolDomain::Packages,
            installed: false,
            version: None,
            path: None,
            install_method: Some("built-in".into()),
            install_command: None,
            last_checked: Some(Utc::now()),
            capabilities: vec!["Search packages".into()],
        };
        store.upsert_tools(std::slice::from_ref(&tool)).await.unwrap();

        tool.installed = true;
        tool.version = Some("v1.9".into());
        store.upsert_tools(std::slice::from_ref(&tool)).await.unwrap();

        let loaded = store.load_tools().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].installed);
        assert_eq!(loaded[0].version.as_deref(), Some("v1.9"));
        assert_eq!(loaded[0].domain, ToolDomain::Packages);
        assert_eq!(loaded[0].capabilities, vec!["Search packages".to_string()]);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("actiongate.db");

        let store = SqliteStore::open(&path).unwrap();
        store.insert(&red("a1")).await.unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert!(reopened.get(&ActionId::new("a1")).await.unwrap().is_some());
    }
}
