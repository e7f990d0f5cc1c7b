//! JSON-document collection store.
//!
//! Each entity collection is an independent named list persisted as one
//! JSON file under the data directory (`<data_dir>/<key>.json`). The store
//! loads everything at startup and rewrites a collection's file after every
//! mutation. Last write wins; there are no transactions, no cross-entity
//! constraints and no schema migrations.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::info;

use crate::models::Warehouse;

/// Actor stamped on audit fields until a real authentication layer exists.
pub const DEFAULT_ACTOR: &str = "current-user";

/// Actor stamped on records generated by the system itself.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{collection} record {id} not found")]
    NotFound { collection: String, id: String },
}

/// A record that can live in a [`Collection`].
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn stamp_created(&mut self, at: DateTime<Utc>, by: &str);
    fn stamp_updated(&mut self, at: DateTime<Utc>, by: &str);
}

/// Generates a collection-unique id: millisecond timestamp plus a random
/// base-36 suffix.
pub fn generate_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}", Utc::now().timestamp_millis(), suffix)
}

/// A named, file-persisted list of records.
pub struct Collection<T: Record> {
    key: &'static str,
    path: PathBuf,
    items: RwLock<Vec<T>>,
}

impl<T: Record> Collection<T> {
    /// Loads the collection from `<dir>/<key>.json`, starting empty when the
    /// file does not exist yet. Returns whether the file existed.
    fn load(dir: &Path, key: &'static str) -> Result<(Self, bool), StoreError> {
        let path = dir.join(format!("{key}.json"));
        let (items, existed) = if path.exists() {
            let raw = fs::read(&path)?;
            (serde_json::from_slice(&raw)?, true)
        } else {
            (Vec::new(), false)
        };
        Ok((
            Self {
                key,
                path,
                items: RwLock::new(items),
            },
            existed,
        ))
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Inserts a record, assigning a generated id and stamping the creation
    /// audit fields with `actor`.
    pub fn insert(&self, mut record: T, actor: &str) -> Result<T, StoreError> {
        record.set_id(generate_id());
        record.stamp_created(Utc::now(), actor);
        let mut items = self.items.write().unwrap();
        items.push(record.clone());
        self.persist(&items)?;
        Ok(record)
    }

    /// Applies `mutate` to the record with `id` and stamps the update audit
    /// fields with `actor`.
    pub fn update<F>(&self, id: &str, actor: &str, mutate: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut T),
    {
        let mut items = self.items.write().unwrap();
        let record = items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: self.key.to_string(),
                id: id.to_string(),
            })?;
        mutate(record);
        record.stamp_updated(Utc::now(), actor);
        let updated = record.clone();
        self.persist(&items)?;
        Ok(updated)
    }

    /// Removes the record with `id`.
    pub fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut items = self.items.write().unwrap();
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            return Err(StoreError::NotFound {
                collection: self.key.to_string(),
                id: id.to_string(),
            });
        }
        self.persist(&items)
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.items
            .read()
            .unwrap()
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Snapshot of every record.
    pub fn all(&self) -> Vec<T> {
        self.items.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every record and removes the backing file.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut items = self.items.write().unwrap();
        items.clear();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Inserts a record as-is, keeping its id and audit fields. Used for
    /// seeding only.
    fn push_raw(&self, record: T) -> Result<(), StoreError> {
        let mut items = self.items.write().unwrap();
        items.push(record);
        self.persist(&items)
    }

    fn persist(&self, items: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_vec_pretty(items)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Fixed storage keys, one per collection.
mod keys {
    pub const WAREHOUSES: &str = "warehouses";
    pub const MACHINERY: &str = "machinery";
    pub const VEHICLES: &str = "vehicles";
    pub const TOOLS: &str = "tools";
    pub const SPARE_PARTS: &str = "spare_parts";
    pub const RENTALS: &str = "rentals";
    pub const FUEL_RECORDS: &str = "fuel_records";
    pub const MAINTENANCE_RECORDS: &str = "maintenance_records";
    pub const FINANCIAL_RECORDS: &str = "financial_records";
    pub const USERS: &str = "users";
    pub const ALERTS: &str = "alerts";
    pub const NOTIFICATIONS: &str = "notifications";
}

/// All entity collections, owned by the application state and injected into
/// services. Mutation happens only through the typed collections.
pub struct EntityStore {
    pub warehouses: Collection<crate::models::Warehouse>,
    pub machinery: Collection<crate::models::Machinery>,
    pub vehicles: Collection<crate::models::Vehicle>,
    pub tools: Collection<crate::models::Tool>,
    pub spare_parts: Collection<crate::models::SparePart>,
    pub rentals: Collection<crate::models::Rental>,
    pub fuel_records: Collection<crate::models::FuelRecord>,
    pub maintenance_records: Collection<crate::models::MaintenanceRecord>,
    pub financial_records: Collection<crate::models::FinancialRecord>,
    pub users: Collection<crate::models::User>,
    pub alerts: Collection<crate::models::Alert>,
    pub notifications: Collection<crate::models::Notification>,
}

impl EntityStore {
    /// Opens (or initialises) the store under `dir`. A fresh store is seeded
    /// with the initial warehouse.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;

        let (warehouses, warehouses_existed) = Collection::load(dir, keys::WAREHOUSES)?;
        let store = Self {
            warehouses,
            machinery: Collection::load(dir, keys::MACHINERY)?.0,
            vehicles: Collection::load(dir, keys::VEHICLES)?.0,
            tools: Collection::load(dir, keys::TOOLS)?.0,
            spare_parts: Collection::load(dir, keys::SPARE_PARTS)?.0,
            rentals: Collection::load(dir, keys::RENTALS)?.0,
            fuel_records: Collection::load(dir, keys::FUEL_RECORDS)?.0,
            maintenance_records: Collection::load(dir, keys::MAINTENANCE_RECORDS)?.0,
            financial_records: Collection::load(dir, keys::FINANCIAL_RECORDS)?.0,
            users: Collection::load(dir, keys::USERS)?.0,
            alerts: Collection::load(dir, keys::ALERTS)?.0,
            notifications: Collection::load(dir, keys::NOTIFICATIONS)?.0,
        };

        if !warehouses_existed {
            store.warehouses.push_raw(initial_warehouse())?;
            info!("seeded initial warehouse");
        }

        Ok(store)
    }

    /// Wipes every collection and its backing file.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.warehouses.clear()?;
        self.machinery.clear()?;
        self.vehicles.clear()?;
        self.tools.clear()?;
        self.spare_parts.clear()?;
        self.rentals.clear()?;
        self.fuel_records.clear()?;
        self.maintenance_records.clear()?;
        self.financial_records.clear()?;
        self.users.clear()?;
        self.alerts.clear()?;
        self.notifications.clear()
    }

    /// Resolves a warehouse id to its display name.
    pub fn warehouse_name(&self, id: &str) -> Option<String> {
        self.warehouses.get(id).map(|w| w.name)
    }
}

fn initial_warehouse() -> Warehouse {
    Warehouse {
        id: "1".to_string(),
        name: "Almacén Principal Lima".to_string(),
        address: "Av. Industrial 123".to_string(),
        city: "Lima".to_string(),
        phone: None,
        manager: None,
        notes: None,
        created_at: Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 1, 15)
                .expect("valid date")
                .and_hms_opt(0, 0, 0)
                .expect("valid time"),
        ),
        created_by: "admin".to_string(),
        updated_at: None,
        updated_by: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Warehouse;

    fn sample_warehouse(name: &str) -> Warehouse {
        Warehouse {
            id: String::new(),
            name: name.to_string(),
            address: "Av. Los Frutales 455".to_string(),
            city: "Lima".to_string(),
            phone: None,
            manager: None,
            notes: None,
            created_at: Utc::now(),
            created_by: String::new(),
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn insert_assigns_id_and_audit_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntityStore::open(dir.path()).unwrap();

        let created = store
            .warehouses
            .insert(sample_warehouse("Almacén Este"), DEFAULT_ACTOR)
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.created_by, DEFAULT_ACTOR);
        assert!(created.updated_at.is_none());
        assert_eq!(store.warehouses.get(&created.id).unwrap().name, "Almacén Este");
    }

    #[test]
    fn update_stamps_updated_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntityStore::open(dir.path()).unwrap();
        let created = store
            .warehouses
            .insert(sample_warehouse("Almacén Este"), DEFAULT_ACTOR)
            .unwrap();

        let updated = store
            .warehouses
            .update(&created.id, DEFAULT_ACTOR, |w| {
                w.city = "Arequipa".to_string();
            })
            .unwrap();

        assert_eq!(updated.city, "Arequipa");
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.updated_by.as_deref(), Some(DEFAULT_ACTOR));
    }

    #[test]
    fn update_and_remove_of_missing_id_fail() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntityStore::open(dir.path()).unwrap();

        let err = store
            .warehouses
            .update("nope", DEFAULT_ACTOR, |_| {})
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.warehouses.remove("nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn fresh_store_is_seeded_and_reload_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = EntityStore::open(dir.path()).unwrap();
            assert_eq!(store.warehouses.len(), 1);
            assert_eq!(store.warehouse_name("1").unwrap(), "Almacén Principal Lima");
            store
                .warehouses
                .insert(sample_warehouse("Almacén Sur"), DEFAULT_ACTOR)
                .unwrap();
        }

        // Reopen: both warehouses persisted, no double seeding.
        let store = EntityStore::open(dir.path()).unwrap();
        assert_eq!(store.warehouses.len(), 2);
    }

    #[test]
    fn clear_all_empties_every_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntityStore::open(dir.path()).unwrap();
        store.clear_all().unwrap();
        assert!(store.warehouses.is_empty());

        // A reopen after clear seeds again, matching first-run behavior.
        let store = EntityStore::open(dir.path()).unwrap();
        assert_eq!(store.warehouses.len(), 1);
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(generate_id()));
        }
    }
}
