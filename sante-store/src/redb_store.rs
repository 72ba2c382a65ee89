//! ReDB-backed client state
//!
//! One table, `local_storage`, mapping entry names to their string values.

use crate::error::Result;
use crate::kv::KeyValueStore;
use redb::{Database, TableDefinition};
use std::path::Path;

const LOCAL_STORAGE: TableDefinition<&str, &str> = TableDefinition::new("local_storage");

/// Client state that survives restarts
pub struct RedbStore {
    db: Database,
}

#[allow(clippy::result_large_err)]
impl RedbStore {
    /// Open the store (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path.as_ref())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(LOCAL_STORAGE)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.as_ref().display(), "Opened client state store");
        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LOCAL_STORAGE)?;

        match table.get(key)? {
            Some(value) => Ok(Some(value.value().to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(LOCAL_STORAGE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(LOCAL_STORAGE)?;
            table.remove(key)?.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(dir.path().join("state.redb")).unwrap();

        store.set(keys::ACCESS_TOKEN, "tok-1").unwrap();
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok-1"));

        store.set(keys::ACCESS_TOKEN, "tok-2").unwrap();
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok-2"));

        assert!(store.remove(keys::ACCESS_TOKEN).unwrap());
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set(keys::USER_ROLE, "doctor").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get(keys::USER_ROLE).unwrap().as_deref(), Some("doctor"));
    }
}
