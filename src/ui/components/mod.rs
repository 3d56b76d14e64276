pub mod kpi_card;
pub mod load_failed;
pub mod shipment_table;
pub mod status_badge;
pub mod toast;

pub use kpi_card::KpiCard;
pub use load_failed::LoadFailed;
pub use shipment_table::ShipmentTable;
pub use status_badge::{AccountBadge, StatusBadge};
