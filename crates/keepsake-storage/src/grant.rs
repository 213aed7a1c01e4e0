//! Grant storage - normalized access grant entity.
//!
//! Grants are stored as first-class rows keyed by
//! `"{resource_id}:{grantee_id}:{slot}"`, where the slot is `p` for a
//! persistent grant and `v` for a view-once entry. A principal can therefore
//! hold at most one persistent grant and one view-once entry per resource,
//! while the two can coexist.
//!
//! Unlike the other modules in this crate, grants are stored typed: the
//! view-once consumption must be a conditional check-and-set on the `viewed`
//! flag inside a single write transaction, which requires interpreting the
//! value here rather than in a higher layer.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const GRANT_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("grants");

/// What kind of resource a grant is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Folder,
    Media,
}

/// Access mode carried by a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantMode {
    View,
    Upload,
    ViewOnce,
}

impl GrantMode {
    /// Key slot for this mode: persistent modes share one slot, view-once
    /// entries another, so both can exist for the same grantee.
    fn slot(self) -> &'static str {
        match self {
            GrantMode::View | GrantMode::Upload => "p",
            GrantMode::ViewOnce => "v",
        }
    }
}

/// A durable access permission attached to a resource for one grantee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub grantee_id: String,
    pub mode: GrantMode,
    /// Only meaningful for view-once grants
    pub viewed: bool,
    /// Unix timestamp (seconds) of the consuming view, if any
    pub viewed_at: Option<i64>,
    /// Unix timestamp (seconds) when the grant was written
    pub created_at: i64,
}

impl Grant {
    pub fn new(
        resource_type: ResourceType,
        resource_id: String,
        grantee_id: String,
        mode: GrantMode,
    ) -> Self {
        Self {
            resource_type,
            resource_id,
            grantee_id,
            mode,
            viewed: false,
            viewed_at: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    fn key(&self) -> String {
        grant_key(&self.resource_id, &self.grantee_id, self.mode.slot())
    }
}

fn grant_key(resource_id: &str, grantee_id: &str, slot: &str) -> String {
    format!("{}:{}:{}", resource_id, grantee_id, slot)
}

/// Grant storage with typed API and the conditional consume primitive
#[derive(Debug, Clone)]
pub struct GrantStorage {
    db: Arc<Database>,
}

impl GrantStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(GRANT_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Add or update a persistent grant (`View` or `Upload`).
    ///
    /// Re-adding with the same mode is a no-op; re-adding with a different
    /// mode updates the mode in place. There is never more than one
    /// persistent grant per (resource, grantee).
    pub fn upsert_persistent(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        grantee_id: &str,
        mode: GrantMode,
    ) -> Result<()> {
        anyhow::ensure!(
            mode != GrantMode::ViewOnce,
            "view-once entries use add_view_once"
        );

        if let Some(existing) = self.get(resource_id, grantee_id, mode)? {
            if existing.mode == mode {
                return Ok(());
            }
        }

        let grant = Grant::new(
            resource_type,
            resource_id.to_string(),
            grantee_id.to_string(),
            mode,
        );
        self.put(&grant)
    }

    /// Add a view-once entry for the grantee.
    ///
    /// A no-op if any entry already exists for this (resource, grantee) —
    /// including a consumed one. A consumed entry is never re-armed.
    pub fn add_view_once(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        grantee_id: &str,
    ) -> Result<()> {
        if self
            .get(resource_id, grantee_id, GrantMode::ViewOnce)?
            .is_some()
        {
            return Ok(());
        }

        let grant = Grant::new(
            resource_type,
            resource_id.to_string(),
            grantee_id.to_string(),
            GrantMode::ViewOnce,
        );
        self.put(&grant)
    }

    fn put(&self, grant: &Grant) -> Result<()> {
        let key = grant.key();
        let data = serde_json::to_vec(grant)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(GRANT_TABLE)?;
            table.insert(key.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get the grant in the slot that `mode` maps to, if any
    pub fn get(&self, resource_id: &str, grantee_id: &str, mode: GrantMode) -> Result<Option<Grant>> {
        let key = grant_key(resource_id, grantee_id, mode.slot());
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GRANT_TABLE)?;

        if let Some(value) = table.get(key.as_str())? {
            Ok(Some(serde_json::from_slice(value.value())?))
        } else {
            Ok(None)
        }
    }

    /// Get both possible grants (persistent + view-once) for a grantee
    pub fn get_for_grantee(&self, resource_id: &str, grantee_id: &str) -> Result<Vec<Grant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GRANT_TABLE)?;

        let mut grants = Vec::new();
        for slot in ["p", "v"] {
            let key = grant_key(resource_id, grantee_id, slot);
            if let Some(value) = table.get(key.as_str())? {
                grants.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(grants)
    }

    /// List all grants on a resource
    pub fn list_for_resource(&self, resource_id: &str) -> Result<Vec<Grant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GRANT_TABLE)?;

        let prefix = format!("{}:", resource_id);
        let mut grants = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            if key.value().starts_with(&prefix) {
                grants.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(grants)
    }

    /// Remove the grant in the slot that `mode` maps to, returns true if it existed
    pub fn remove(&self, resource_id: &str, grantee_id: &str, mode: GrantMode) -> Result<bool> {
        let key = grant_key(resource_id, grantee_id, mode.slot());
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(GRANT_TABLE)?;
            table.remove(key.as_str())?.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Remove every view-once entry on a resource, returns the number removed.
    ///
    /// Destructive: consumed and unconsumed entries alike are dropped. Used
    /// when view-once sharing is disabled on a resource.
    pub fn clear_view_once(&self, resource_id: &str) -> Result<u32> {
        let keys: Vec<String> = self
            .list_for_resource(resource_id)?
            .into_iter()
            .filter(|g| g.mode == GrantMode::ViewOnce)
            .map(|g| g.key())
            .collect();

        let count = keys.len() as u32;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(GRANT_TABLE)?;
            for key in &keys {
                table.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(count)
    }

    /// Remove every grant on a resource, returns the number removed
    pub fn delete_for_resource(&self, resource_id: &str) -> Result<u32> {
        let keys: Vec<String> = self
            .list_for_resource(resource_id)?
            .into_iter()
            .map(|g| g.key())
            .collect();

        let count = keys.len() as u32;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(GRANT_TABLE)?;
            for key in &keys {
                table.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(count)
    }

    /// Consume a view-once entry: conditional check-and-set on `viewed`.
    ///
    /// The read of the current flag and the write of the consumed state
    /// happen inside one write transaction. redb serializes writers, so of
    /// two concurrent callers exactly one observes `viewed == false` and
    /// returns true; the other (and every later caller) gets false. Absent
    /// entries also return false — replay is not an error.
    pub fn consume(&self, resource_id: &str, grantee_id: &str, now: i64) -> Result<bool> {
        let key = grant_key(resource_id, grantee_id, GrantMode::ViewOnce.slot());
        let write_txn = self.db.begin_write()?;
        let consumed = {
            let mut table = write_txn.open_table(GRANT_TABLE)?;

            let current: Option<Grant> = match table.get(key.as_str())? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };

            match current {
                Some(mut grant) if !grant.viewed => {
                    grant.viewed = true;
                    grant.viewed_at = Some(now);
                    let data = serde_json::to_vec(&grant)?;
                    table.insert(key.as_str(), data.as_slice())?;
                    true
                }
                _ => false,
            }
        };
        write_txn.commit()?;
        Ok(consumed)
    }
}
