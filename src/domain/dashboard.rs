use serde_json::json;

use super::entities::{AccountStatus, Role, Shipment, User};
use super::lifecycle::{CourierQueue, ShipmentStatus};
use super::ports::{RecordStore, StoreError, Table};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientStats {
    pub total: usize,
    pub in_progress: usize,
    pub delivered: usize,
    pub total_spent: u64,
}

pub fn client_stats(shipments: &[Shipment]) -> ClientStats {
    let delivered = shipments
        .iter()
        .filter(|s| s.status == ShipmentStatus::Delivered)
        .count();
    ClientStats {
        total: shipments.len(),
        in_progress: shipments.len() - delivered,
        delivered,
        total_spent: shipments.iter().map(|s| u64::from(s.price)).sum(),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CourierStats {
    pub to_collect: usize,
    pub collected: usize,
    pub total_weight_kg: f64,
}

pub fn courier_stats(queue: &CourierQueue) -> CourierStats {
    CourierStats {
        to_collect: queue.to_collect().len(),
        collected: queue.collected().len(),
        total_weight_kg: queue.total_weight_kg(),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminStats {
    pub clients: usize,
    pub couriers: usize,
    pub shipments: usize,
    pub revenue: u64,
}

pub fn admin_stats(users: &[User], shipments: &[Shipment]) -> AdminStats {
    let count_role = |role: Role| users.iter().filter(|u| u.role == role).count();
    AdminStats {
        clients: count_role(Role::Client),
        couriers: count_role(Role::Courier),
        shipments: shipments.len(),
        revenue: shipments.iter().map(|s| u64::from(s.price)).sum(),
    }
}

/// User list behind the admin dashboard.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminRoster {
    users: Vec<User>,
}

impl AdminRoster {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Flips a user between active and inactive once the store confirms.
    pub async fn toggle_status(
        &mut self,
        id: &str,
        store: &dyn RecordStore,
    ) -> Result<AccountStatus, StoreError> {
        let Some(index) = self.users.iter().position(|user| user.id == id) else {
            return Err(StoreError::MissingRecord {
                table: Table::Users.name(),
                id: id.to_string(),
            });
        };
        let next = self.users[index].status.toggled();
        store
            .update(Table::Users, id, json!({ "status": next }))
            .await?;
        self.users[index].status = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{client, shipment};

    fn priced(id: &str, status: ShipmentStatus, price: u32, weight_kg: f64) -> Shipment {
        let mut s = shipment(id, "2024-01-29T08:00:00Z", status);
        s.price = price;
        s.weight_kg = weight_kg;
        s
    }

    #[test]
    fn client_stats_split_delivered_from_in_progress() {
        let shipments = vec![
            priced("1", ShipmentStatus::InTransit, 45, 2.5),
            priced("2", ShipmentStatus::Delivered, 35, 1.2),
            priced("3", ShipmentStatus::Pending, 55, 3.1),
        ];
        assert_eq!(
            client_stats(&shipments),
            ClientStats {
                total: 3,
                in_progress: 2,
                delivered: 1,
                total_spent: 135,
            }
        );
    }

    #[test]
    fn courier_stats_sum_weight_across_both_sets() {
        let queue = CourierQueue::load(vec![
            priced("1", ShipmentStatus::Pending, 45, 2.5),
            priced("2", ShipmentStatus::Pending, 35, 1.8),
            priced("3", ShipmentStatus::Collected, 55, 3.2),
        ]);
        let stats = courier_stats(&queue);
        assert_eq!(stats.to_collect, 2);
        assert_eq!(stats.collected, 1);
        assert!((stats.total_weight_kg - 7.5).abs() < 1e-9);
    }

    #[test]
    fn admin_stats_count_roles_and_revenue() {
        let mut courier = client();
        courier.id = "2".into();
        courier.role = Role::Courier;
        let mut admin = client();
        admin.id = "3".into();
        admin.role = Role::Admin;
        let users = vec![client(), courier, admin];
        let shipments = vec![
            priced("1", ShipmentStatus::Pending, 60, 2.5),
            priced("2", ShipmentStatus::Delivered, 33, 1.0),
        ];
        assert_eq!(
            admin_stats(&users, &shipments),
            AdminStats {
                clients: 1,
                couriers: 1,
                shipments: 2,
                revenue: 93,
            }
        );
    }
}
