//! Shipment status progression and the courier pickup queue.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use super::entities::{Shipment, ShipmentId};
use super::ports::{RecordStore, StoreError, Table};

/// Ordered by normal progression. Legacy backend names are accepted on decode.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[default]
    #[serde(alias = "en_attente")]
    Pending,
    #[serde(alias = "collecte")]
    Collected,
    #[serde(alias = "en_transit")]
    InTransit,
    #[serde(alias = "en_livraison")]
    OutForDelivery,
    #[serde(alias = "livre")]
    Delivered,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 5] = [
        ShipmentStatus::Pending,
        ShipmentStatus::Collected,
        ShipmentStatus::InTransit,
        ShipmentStatus::OutForDelivery,
        ShipmentStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Collected => "collected",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::OutForDelivery => "out_for_delivery",
            ShipmentStatus::Delivered => "delivered",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::Collected => "Collected",
            ShipmentStatus::InTransit => "In transit",
            ShipmentStatus::OutForDelivery => "Out for delivery",
            ShipmentStatus::Delivered => "Delivered",
        }
    }

    pub fn successor(&self) -> Option<ShipmentStatus> {
        match self {
            ShipmentStatus::Pending => Some(ShipmentStatus::Collected),
            ShipmentStatus::Collected => Some(ShipmentStatus::InTransit),
            ShipmentStatus::InTransit => Some(ShipmentStatus::OutForDelivery),
            ShipmentStatus::OutForDelivery => Some(ShipmentStatus::Delivered),
            ShipmentStatus::Delivered => None,
        }
    }

    /// Only the immediate successor is reachable.
    pub fn can_advance_to(&self, next: ShipmentStatus) -> bool {
        self.successor() == Some(next)
    }

    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("shipment {0} is not waiting for pickup")]
    NotQueued(ShipmentId),
    #[error("cannot move a shipment from {from} to {to}")]
    InvalidTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A courier's working sets for the current session.
///
/// `to_collect` is FIFO by deposit time; `collected` grows in completion
/// order. The sets are only changed after the store confirms a write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CourierQueue {
    to_collect: Vec<Shipment>,
    collected: Vec<Shipment>,
}

impl CourierQueue {
    /// Splits fetched shipments into the two working sets. Shipments past
    /// `collected` are not the courier's concern and are dropped.
    pub fn load(shipments: Vec<Shipment>) -> Self {
        let mut to_collect = Vec::new();
        let mut collected = Vec::new();
        for shipment in shipments {
            match shipment.status {
                ShipmentStatus::Pending => to_collect.push(shipment),
                ShipmentStatus::Collected => collected.push(shipment),
                other => {
                    tracing::debug!(
                        "[courier] skipping {} in status {other}",
                        shipment.tracking_code
                    );
                }
            }
        }
        // Stable: equal timestamps keep store order.
        to_collect.sort_by_key(|shipment| shipment.created_at);
        Self {
            to_collect,
            collected,
        }
    }

    pub fn to_collect(&self) -> &[Shipment] {
        &self.to_collect
    }

    pub fn collected(&self) -> &[Shipment] {
        &self.collected
    }

    pub fn total_weight_kg(&self) -> f64 {
        self.to_collect
            .iter()
            .chain(self.collected.iter())
            .map(|shipment| shipment.weight_kg)
            .sum()
    }

    /// Marks a queued shipment as collected.
    ///
    /// The store write is awaited first; on any error the queue is left
    /// exactly as it was.
    pub async fn collect(
        &mut self,
        id: &str,
        store: &dyn RecordStore,
    ) -> Result<&Shipment, LifecycleError> {
        let Some(index) = self.to_collect.iter().position(|shipment| shipment.id == id) else {
            return Err(LifecycleError::NotQueued(id.to_string()));
        };
        let from = self.to_collect[index].status;
        let to = ShipmentStatus::Collected;
        if !from.can_advance_to(to) {
            return Err(LifecycleError::InvalidTransition { from, to });
        }

        store
            .update(Table::Shipments, id, json!({ "status": to }))
            .await?;

        let mut shipment = self.to_collect.remove(index);
        shipment.status = to;
        tracing::info!("[courier] {} collected", shipment.tracking_code);
        self.collected.push(shipment);
        Ok(&self.collected[self.collected.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{Filter, Ordering, Record};
    use crate::domain::test_support::shipment;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::Mutex;

    /// Records update calls and answers with a fixed outcome.
    struct ScriptedStore {
        fail: bool,
        updates: Mutex<Vec<(String, Record)>>,
    }

    impl ScriptedStore {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                updates: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecordStore for ScriptedStore {
        async fn fetch(
            &self,
            _table: Table,
            _filter: &Filter,
            _ordering: Option<&Ordering>,
        ) -> Result<Vec<Record>, StoreError> {
            Ok(Vec::new())
        }

        async fn update(&self, _table: Table, id: &str, fields: Record) -> Result<Record, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable);
            }
            self.updates
                .lock()
                .expect("lock")
                .push((id.to_string(), fields.clone()));
            Ok(fields)
        }

        async fn insert(&self, _table: Table, fields: Record) -> Result<Record, StoreError> {
            Ok(fields)
        }
    }

    fn queue() -> CourierQueue {
        CourierQueue::load(vec![
            shipment("2", "2024-01-29T10:00:00Z", ShipmentStatus::Pending),
            shipment("3", "2024-01-28T09:00:00Z", ShipmentStatus::Collected),
            shipment("1", "2024-01-29T08:00:00Z", ShipmentStatus::Pending),
            shipment("4", "2024-01-27T08:00:00Z", ShipmentStatus::InTransit),
            shipment("5", "2024-01-29T08:00:00Z", ShipmentStatus::Pending),
        ])
    }

    fn ids(shipments: &[Shipment]) -> Vec<&str> {
        shipments.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn load_partitions_and_orders_fifo() {
        let queue = queue();
        assert_eq!(ids(queue.to_collect()), vec!["1", "5", "2"]);
        assert_eq!(ids(queue.collected()), vec!["3"]);
    }

    #[tokio::test]
    async fn collect_moves_exactly_one_shipment() {
        let store = ScriptedStore::new(false);
        let mut queue = queue();

        let moved = queue.collect("5", &store).await.expect("collect succeeds");
        assert_eq!(moved.id, "5");
        assert_eq!(moved.status, ShipmentStatus::Collected);

        assert_eq!(ids(queue.to_collect()), vec!["1", "2"]);
        assert_eq!(ids(queue.collected()), vec!["3", "5"]);

        let updates = store.updates.lock().expect("lock");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "5");
        assert_eq!(updates[0].1, json!({"status": "collected"}));
    }

    #[tokio::test]
    async fn collected_items_append_in_completion_order() {
        let store = ScriptedStore::new(false);
        let mut queue = queue();
        queue.collect("2", &store).await.expect("first");
        queue.collect("1", &store).await.expect("second");
        assert_eq!(ids(queue.collected()), vec!["3", "2", "1"]);
        assert_eq!(ids(queue.to_collect()), vec!["5"]);
    }

    #[tokio::test]
    async fn collected_shipment_cannot_be_collected_again() {
        let store = ScriptedStore::new(false);
        let mut queue = queue();
        queue.collect("1", &store).await.expect("first collect");
        let err = queue.collect("1", &store).await.expect_err("already collected");
        assert!(matches!(err, LifecycleError::NotQueued(id) if id == "1"));
        assert!(!ids(queue.to_collect()).contains(&"1"));
    }

    #[tokio::test]
    async fn failed_write_leaves_queue_untouched() {
        let store = ScriptedStore::new(true);
        let mut queue = queue();
        let before = queue.clone();

        let err = queue.collect("1", &store).await.expect_err("store is down");
        assert!(matches!(err, LifecycleError::Store(StoreError::Unavailable)));
        assert_eq!(queue, before);
    }

    #[tokio::test]
    async fn unknown_shipment_is_rejected_without_a_write() {
        let store = ScriptedStore::new(false);
        let mut queue = queue();
        let err = queue.collect("4", &store).await.expect_err("not queued");
        assert!(matches!(err, LifecycleError::NotQueued(_)));
        assert!(store.updates.lock().expect("lock").is_empty());
    }

    #[rstest]
    #[case(ShipmentStatus::Pending, ShipmentStatus::Collected, true)]
    #[case(ShipmentStatus::Collected, ShipmentStatus::InTransit, true)]
    #[case(ShipmentStatus::InTransit, ShipmentStatus::OutForDelivery, true)]
    #[case(ShipmentStatus::OutForDelivery, ShipmentStatus::Delivered, true)]
    #[case(ShipmentStatus::Pending, ShipmentStatus::Delivered, false)]
    #[case(ShipmentStatus::Collected, ShipmentStatus::Pending, false)]
    #[case(ShipmentStatus::Delivered, ShipmentStatus::Pending, false)]
    fn transitions_follow_progression(
        #[case] from: ShipmentStatus,
        #[case] to: ShipmentStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_advance_to(to), allowed);
    }

    #[test]
    fn only_delivered_is_terminal() {
        let terminal: Vec<_> = ShipmentStatus::ALL
            .iter()
            .filter(|status| status.is_terminal())
            .collect();
        assert_eq!(terminal, vec![&ShipmentStatus::Delivered]);
    }

    #[rstest]
    #[case("\"pending\"", ShipmentStatus::Pending)]
    #[case("\"en_attente\"", ShipmentStatus::Pending)]
    #[case("\"collecte\"", ShipmentStatus::Collected)]
    #[case("\"en_transit\"", ShipmentStatus::InTransit)]
    #[case("\"en_livraison\"", ShipmentStatus::OutForDelivery)]
    #[case("\"out_for_delivery\"", ShipmentStatus::OutForDelivery)]
    #[case("\"livre\"", ShipmentStatus::Delivered)]
    fn status_decodes_current_and_legacy_names(#[case] raw: &str, #[case] expected: ShipmentStatus) {
        let status: ShipmentStatus = serde_json::from_str(raw).expect("known status");
        assert_eq!(status, expected);
    }

    #[test]
    fn status_encodes_snake_case() {
        assert_eq!(
            serde_json::to_value(ShipmentStatus::OutForDelivery).expect("encode"),
            json!("out_for_delivery")
        );
    }
}
