use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use models::{Customer, CustomerId, CustomerPatch};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::errors::ServiceError;
use crate::storage::json_file_store::JsonFileStore;

/// Storage contract for customers. The repository alone assigns ids.
///
/// `Err` is reserved for internal faults; "not found" and "rejected" are
/// ordinary `Ok` outcomes.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Customer>, ServiceError>;
    async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, ServiceError>;
    /// Hands out the next unused id. Every call advances the counter.
    async fn get_next_id_value(&self) -> Result<CustomerId, ServiceError>;
    /// `false` when a customer with the same id already exists.
    async fn create(&self, customer: Customer) -> Result<bool, ServiceError>;
    /// `false` when no customer has `id`.
    async fn update(&self, id: CustomerId, patch: CustomerPatch) -> Result<bool, ServiceError>;
    /// `false` when no customer has `id`.
    async fn delete(&self, id: CustomerId) -> Result<bool, ServiceError>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerTable {
    /// Next id to hand out. Wider than `CustomerId` so the slot after `i32::MAX` is representable.
    next_id: i64,
    customers: BTreeMap<CustomerId, Customer>,
}

impl Default for CustomerTable {
    fn default() -> Self {
        Self { next_id: 1, customers: BTreeMap::new() }
    }
}

impl CustomerTable {
    fn reserve_id(&mut self) -> Result<CustomerId, ServiceError> {
        let id = CustomerId::try_from(self.next_id)
            .map_err(|_| ServiceError::storage("id space exhausted"))?;
        self.next_id += 1;
        Ok(id)
    }

    /// Keep the counter past any id already stored, including ids loaded from disk.
    fn bump_past(&mut self, id: CustomerId) {
        self.next_id = self.next_id.max(i64::from(id) + 1);
    }
}

/// In-memory repository guarded by a single lock, optionally mirrored to a JSON file.
pub struct InMemoryCustomerRepository {
    table: RwLock<CustomerTable>,
    snapshot: Option<JsonFileStore>,
}

impl Default for InMemoryCustomerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self { table: RwLock::new(CustomerTable::default()), snapshot: None }
    }

    /// Load state from `path` (creating it if missing) and persist every mutation there.
    pub async fn with_snapshot<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let (store, mut table) = JsonFileStore::open::<CustomerTable, _>(path).await?;
        if let Some(max_id) = table.customers.keys().next_back().copied() {
            table.bump_past(max_id);
        }
        info!(
            path = %store.path().display(),
            customers = table.customers.len(),
            next_id = table.next_id,
            "loaded customer snapshot"
        );
        Ok(Self { table: RwLock::new(table), snapshot: Some(store) })
    }

    /// Run `change` under the write lock. `None` means nothing changed.
    ///
    /// With a snapshot the change is staged on a copy and only swapped in once
    /// the file write succeeded, so a failed save leaves memory untouched.
    async fn mutate<T, F>(&self, change: F) -> Result<Option<T>, ServiceError>
    where
        T: Send,
        F: FnOnce(&mut CustomerTable) -> Result<Option<T>, ServiceError> + Send,
    {
        let mut table = self.table.write().await;
        let Some(store) = &self.snapshot else {
            return change(&mut *table);
        };

        let mut staged = table.clone();
        let outcome = change(&mut staged)?;
        if outcome.is_some() {
            store.save(&staged).await?;
            *table = staged;
        }
        Ok(outcome)
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn get_all(&self) -> Result<Vec<Customer>, ServiceError> {
        let table = self.table.read().await;
        Ok(table.customers.values().cloned().collect())
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, ServiceError> {
        let table = self.table.read().await;
        Ok(table.customers.get(&id).cloned())
    }

    async fn get_next_id_value(&self) -> Result<CustomerId, ServiceError> {
        let id = self
            .mutate(|table| table.reserve_id().map(Some))
            .await?
            .ok_or_else(|| ServiceError::storage("id reservation produced no id"))?;
        debug!(id, "reserved customer id");
        Ok(id)
    }

    #[instrument(skip(self, customer), fields(id = customer.id))]
    async fn create(&self, customer: Customer) -> Result<bool, ServiceError> {
        let created = self
            .mutate(move |table| {
                if table.customers.contains_key(&customer.id) {
                    return Ok(None);
                }
                table.bump_past(customer.id);
                table.customers.insert(customer.id, customer);
                Ok(Some(()))
            })
            .await?;
        if created.is_none() {
            warn!("customer id already taken");
        }
        Ok(created.is_some())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: CustomerId, patch: CustomerPatch) -> Result<bool, ServiceError> {
        let now = Utc::now();
        let updated = self
            .mutate(move |table| {
                Ok(table.customers.get_mut(&id).map(|customer| patch.apply_to(customer, now)))
            })
            .await?;
        Ok(updated.is_some())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: CustomerId) -> Result<bool, ServiceError> {
        let removed = self.mutate(|table| Ok(table.customers.remove(&id).map(drop))).await?;
        Ok(removed.is_some())
    }
}
