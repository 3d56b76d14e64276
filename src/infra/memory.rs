//! In-process record store seeded with demo data.
//!
//! Every call sleeps for a fixed latency before answering so the UI walks
//! through the same loading states as with the hosted store.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::domain::{Filter, Ordering, Record, RecordStore, StoreError, Table};

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(600);

#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<HashMap<Table, Vec<Record>>>>,
    latency: Duration,
    offline: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
            latency: Duration::ZERO,
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Store pre-filled with the demo accounts, parcels and tariffs.
    pub fn seeded() -> Self {
        let store = Self::empty().with_latency(DEFAULT_LATENCY);
        let mut tables = HashMap::new();
        tables.insert(Table::Users, seed_users());
        tables.insert(Table::Shipments, seed_shipments());
        tables.insert(Table::Tariffs, seed_tariffs());
        tables.insert(Table::ShipmentEvents, seed_events());
        Self {
            tables: Arc::new(Mutex::new(tables)),
            ..store
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    async fn round_trip(&self) -> Result<(), StoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(AtomicOrdering::SeqCst) {
            tracing::warn!("[memory-store] simulated outage");
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    /// Emulates the `sender:users(...)` join of the hosted shipments view.
    fn join_sender(shipment: &mut Record, users: &[Record]) {
        let Some(sender_id) = shipment.get("sender_id").map(scalar_string) else {
            return;
        };
        if let Some(user) = users
            .iter()
            .find(|user| user.get("id").map(scalar_string).as_deref() == Some(&sender_id))
        {
            shipment["sender"] = json!({
                "first_name": user.get("first_name").cloned().unwrap_or(Value::Null),
                "last_name": user.get("last_name").cloned().unwrap_or(Value::Null),
                "phone": user.get("phone").cloned().unwrap_or(Value::Null),
            });
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch(
        &self,
        table: Table,
        filter: &Filter,
        ordering: Option<&Ordering>,
    ) -> Result<Vec<Record>, StoreError> {
        self.round_trip().await?;
        let tables = self.tables.lock().await;
        let users = tables.get(&Table::Users).cloned().unwrap_or_default();
        let mut rows: Vec<Record> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|row| filter.matches(row)).cloned().collect())
            .unwrap_or_default();
        if table == Table::Shipments {
            for row in &mut rows {
                Self::join_sender(row, &users);
            }
        }
        if let Some(ordering) = ordering {
            rows.sort_by(|a, b| {
                let left = a.get(&ordering.column).map(scalar_string);
                let right = b.get(&ordering.column).map(scalar_string);
                if ordering.ascending {
                    left.cmp(&right)
                } else {
                    right.cmp(&left)
                }
            });
        }
        tracing::debug!(
            "[memory-store] fetch {} -> {} rows",
            table.name(),
            rows.len()
        );
        Ok(rows)
    }

    async fn update(&self, table: Table, id: &str, fields: Record) -> Result<Record, StoreError> {
        self.round_trip().await?;
        let mut tables = self.tables.lock().await;
        let users = tables.get(&Table::Users).cloned().unwrap_or_default();
        let row = tables
            .get_mut(&table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| row.get("id").map(scalar_string).as_deref() == Some(id))
            })
            .ok_or_else(|| StoreError::MissingRecord {
                table: table.name(),
                id: id.to_string(),
            })?;
        if let (Some(target), Value::Object(changes)) = (row.as_object_mut(), fields) {
            for (key, value) in changes {
                target.insert(key, value);
            }
        }
        let mut updated = row.clone();
        if table == Table::Shipments {
            Self::join_sender(&mut updated, &users);
        }
        tracing::debug!("[memory-store] update {} {id}", table.name());
        Ok(updated)
    }

    async fn insert(&self, table: Table, fields: Record) -> Result<Record, StoreError> {
        self.round_trip().await?;
        let Value::Object(mut row) = fields else {
            return Err(StoreError::Api(format!(
                "{} insert expects an object",
                table.name()
            )));
        };
        row.entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        let mut record = Value::Object(row);

        let mut tables = self.tables.lock().await;
        tables.entry(table).or_default().push(record.clone());
        if table == Table::Shipments {
            let users = tables.get(&Table::Users).cloned().unwrap_or_default();
            Self::join_sender(&mut record, &users);
        }
        tracing::debug!("[memory-store] insert into {}", table.name());
        Ok(record)
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn seed_users() -> Vec<Record> {
    vec![
        json!({
            "id": "1", "first_name": "Ahmed", "last_name": "Benali",
            "email": "ahmed.benali@email.ma", "phone": "+212612345678", "national_id": "AB123456",
            "address": "123 Rue Mohammed V, Agdal", "role": "client", "status": "active",
            "city": "Rabat", "district": "Agdal", "registered_on": "2024-01-15"
        }),
        json!({
            "id": "2", "first_name": "Fatima", "last_name": "Alaoui",
            "email": "fatima.alaoui@email.ma", "phone": "+212623456789",
            "role": "courier", "status": "active",
            "city": "Rabat", "district": "Agdal", "registered_on": "2024-01-10"
        }),
        json!({
            "id": "3", "first_name": "Omar", "last_name": "Nejjar",
            "email": "omar.nejjar@email.ma", "phone": "+212656789012", "national_id": "C345678",
            "address": "45 Avenue Hassan II, Agdal", "role": "client", "status": "inactive",
            "city": "Casablanca", "district": "Maarif", "registered_on": "2024-01-20"
        }),
        json!({
            "id": "4", "first_name": "Aicha", "last_name": "Benali",
            "email": "aicha.benali@email.ma", "phone": "+212667890123", "national_id": "AB654321",
            "address": "78 Rue Al Barid, Agdal", "role": "client", "status": "active",
            "city": "Rabat", "district": "Agdal", "registered_on": "2024-01-22"
        }),
        json!({
            "id": "5", "first_name": "Admin", "last_name": "",
            "email": "admin@parcel-desk.ma", "role": "admin", "status": "active",
            "registered_on": "2024-01-01"
        }),
    ]
}

fn seed_shipments() -> Vec<Record> {
    vec![
        json!({
            "id": "1", "tracking_code": "PM20240129001234", "sender_id": "1",
            "recipient_name": "Fatima Alaoui", "recipient_phone": "+212600112233",
            "recipient_address": "12 Rue Ibn Sina",
            "destination_city": "Casablanca", "destination_district": "Maarif",
            "pickup_address": "123 Rue Mohammed V, Agdal", "pickup_district": "Agdal",
            "weight_kg": 2.5, "price": 60, "status": "pending",
            "created_at": "2024-01-29T10:30:00Z"
        }),
        json!({
            "id": "2", "tracking_code": "PM20240129002345", "sender_id": "3",
            "recipient_name": "Youssef Mansouri", "recipient_phone": "+212611223344",
            "recipient_address": "5 Derb Sidi Ahmed",
            "destination_city": "Fès", "destination_district": "Médina",
            "pickup_address": "45 Avenue Hassan II, Agdal", "pickup_district": "Agdal",
            "weight_kg": 1.8, "price": 39, "status": "pending",
            "created_at": "2024-01-29T08:15:00Z"
        }),
        json!({
            "id": "3", "tracking_code": "PM20240128005678", "sender_id": "4",
            "recipient_name": "Mohammed Alami", "recipient_phone": "+212622334455",
            "recipient_address": "9 Avenue Mohammed VI",
            "destination_city": "Marrakech", "destination_district": "Gueliz",
            "pickup_address": "78 Rue Al Barid, Agdal", "pickup_district": "Agdal",
            "weight_kg": 3.2, "price": 51, "status": "collected",
            "created_at": "2024-01-28T09:00:00Z"
        }),
        json!({
            "id": "4", "tracking_code": "PM20240128007890", "sender_id": "1",
            "recipient_name": "Omar Benali", "recipient_phone": "+212633445566",
            "recipient_address": "3 Rue de la Liberté",
            "destination_city": "Marrakech", "destination_district": "Gueliz",
            "pickup_address": "123 Rue Mohammed V, Agdal", "pickup_district": "Agdal",
            "weight_kg": 1.2, "price": 35, "status": "delivered",
            "created_at": "2024-01-28T11:00:00Z", "delivered_at": "2024-01-30T15:20:00Z"
        }),
        json!({
            "id": "5", "tracking_code": "PM20240127009012", "sender_id": "1",
            "recipient_name": "Aicha Nejjar", "recipient_phone": "+212644556677",
            "recipient_address": "21 Boulevard Zerktouni",
            "destination_city": "Casablanca", "destination_district": "Centre",
            "pickup_address": "123 Rue Mohammed V, Agdal", "pickup_district": "Agdal",
            "weight_kg": 3.1, "price": 65, "status": "in_transit",
            "created_at": "2024-01-27T14:00:00Z"
        }),
    ]
}

fn seed_tariffs() -> Vec<Record> {
    vec![
        json!({"id": "1", "city": "Rabat", "weight_min_kg": 0, "weight_max_kg": 1, "price": 25}),
        json!({"id": "2", "city": "Rabat", "weight_min_kg": 1, "weight_max_kg": 5, "price": 35}),
        json!({"id": "3", "city": "Casablanca", "weight_min_kg": 0, "weight_max_kg": 1, "price": 30}),
        json!({"id": "4", "city": "Casablanca", "weight_min_kg": 1, "weight_max_kg": 5, "price": 40}),
    ]
}

fn seed_events() -> Vec<Record> {
    vec![
        json!({
            "id": "1", "shipment_id": "5", "status": "pending",
            "description": "Parcel registered, waiting for pickup",
            "occurred_at": "2024-01-27T14:00:00Z", "location": "Rabat Agdal"
        }),
        json!({
            "id": "2", "shipment_id": "5", "status": "collected",
            "description": "Picked up by the courier",
            "occurred_at": "2024-01-27T17:30:00Z", "location": "Rabat Agdal"
        }),
        json!({
            "id": "3", "shipment_id": "5", "status": "in_transit",
            "description": "On the way to the destination",
            "occurred_at": "2024-01-28T08:00:00Z", "location": "Casablanca sorting centre"
        }),
        json!({
            "id": "4", "shipment_id": "4", "status": "pending",
            "description": "Parcel registered, waiting for pickup",
            "occurred_at": "2024-01-28T11:00:00Z", "location": "Rabat Agdal"
        }),
        json!({
            "id": "5", "shipment_id": "4", "status": "delivered",
            "description": "Delivered to the recipient",
            "occurred_at": "2024-01-30T15:20:00Z", "location": "Marrakech Gueliz"
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShipmentStatus;

    #[tokio::test]
    async fn fetch_filters_orders_and_joins() {
        let store = MemoryStore::seeded().with_latency(Duration::ZERO);
        let rows = store
            .fetch(
                Table::Shipments,
                &Filter::all().eq("status", ShipmentStatus::Pending.as_str()),
                Some(&Ordering::asc("created_at")),
            )
            .await
            .expect("fetch");
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_str().unwrap_or("")).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(rows[0]["sender"]["last_name"], "Nejjar");
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryStore::seeded().with_latency(Duration::ZERO);
        let updated = store
            .update(Table::Shipments, "1", json!({"status": "collected"}))
            .await
            .expect("update");
        assert_eq!(updated["status"], "collected");
        assert_eq!(updated["tracking_code"], "PM20240129001234");
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_missing_record() {
        let store = MemoryStore::seeded().with_latency(Duration::ZERO);
        let err = store
            .update(Table::Users, "99", json!({"status": "inactive"}))
            .await
            .expect_err("no such user");
        assert!(matches!(err, StoreError::MissingRecord { table: "users", .. }));
    }

    #[tokio::test]
    async fn insert_assigns_an_id() {
        let store = MemoryStore::empty();
        let record = store
            .insert(Table::Tariffs, json!({"city": "Safi"}))
            .await
            .expect("insert");
        assert!(record["id"].as_str().is_some_and(|id| !id.is_empty()));
        let rows = store
            .fetch(Table::Tariffs, &Filter::all(), None)
            .await
            .expect("fetch");
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryStore::seeded().with_latency(Duration::ZERO);
        store.set_offline(true);
        assert!(matches!(
            store.fetch(Table::Users, &Filter::all(), None).await,
            Err(StoreError::Unavailable)
        ));
        store.set_offline(false);
        assert!(store.fetch(Table::Users, &Filter::all(), None).await.is_ok());
    }
}
