use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::lifecycle::ShipmentStatus;
use super::tracking::TrackingCode;

// `2024-01-15`, the store's `date` column format.
time::serde::format_description!(pub calendar_date, Date, "[year]-[month]-[day]");

/// Identifier of a shipment row in the record store.
pub type ShipmentId = String;

/// Identifier of a user row in the record store.
pub type UserId = String;

/// Cities offered by the intake and registration forms.
pub const CITIES: [&str; 20] = [
    "Casablanca",
    "Rabat",
    "Fès",
    "Marrakech",
    "Agadir",
    "Tanger",
    "Meknès",
    "Oujda",
    "Kenitra",
    "Tetouan",
    "Safi",
    "Mohammedia",
    "Khouribga",
    "El Jadida",
    "Settat",
    "Berrechid",
    "Nador",
    "Khemisset",
    "Beni Mellal",
    "Taza",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// A single parcel tracked from intake to delivery.
#[derive(Clone, Debug, PartialEq)]
pub struct Shipment {
    pub id: ShipmentId,
    pub tracking_code: TrackingCode,
    pub sender_id: UserId,
    /// Joined from the users table at read time.
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
    pub pickup_address: Option<String>,
    pub pickup_district: Option<String>,
    pub recipient: Recipient,
    pub destination_city: String,
    pub destination_district: String,
    pub weight_kg: f64,
    pub price: u32,
    pub status: ShipmentStatus,
    pub created_at: OffsetDateTime,
    pub delivered_at: Option<OffsetDateTime>,
    pub description: Option<String>,
}

impl Shipment {
    /// "City, District" as shown on dashboards.
    pub fn destination_label(&self) -> String {
        if self.destination_district.is_empty() {
            self.destination_city.clone()
        } else {
            format!("{}, {}", self.destination_city, self.destination_district)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    #[serde(alias = "facteur")]
    Courier,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Client, Role::Courier, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Courier => "courier",
            Role::Admin => "admin",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Courier => "Courier",
            Role::Admin => "Administration",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Role::Client => "👤",
            Role::Courier => "🚚",
            Role::Admin => "🛡️",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            Role::Client => "Send parcels and follow them to the door",
            Role::Courier => "Your pickups and rounds for today",
            Role::Admin => "Users, tariffs and activity",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    #[serde(alias = "actif")]
    Active,
    #[serde(alias = "inactif")]
    Inactive,
}

impl AccountStatus {
    pub fn toggled(self) -> Self {
        match self {
            AccountStatus::Active => AccountStatus::Inactive,
            AccountStatus::Inactive => AccountStatus::Active,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Inactive => "Inactive",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub city: Option<String>,
    pub district: Option<String>,
    pub registered_on: Date,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Street, city and district joined for display, skipping blanks.
    pub fn postal_address(&self) -> String {
        [&self.address, &self.city, &self.district]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Row of the admin tariff grid. Independent from the linear estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TariffRule {
    pub id: String,
    pub city: String,
    pub weight_min_kg: f64,
    pub weight_max_kg: f64,
    pub price: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEvent {
    pub status: ShipmentStatus,
    pub description: String,
    pub occurred_at: OffsetDateTime,
    pub location: Option<String>,
}

/// Result of a tracking lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingInfo {
    pub shipment: Shipment,
    pub timeline: Vec<TimelineEvent>,
}

pub fn format_price(price: impl Into<u64>) -> String {
    let price = price.into();
    format!("{price} DH")
}

pub fn format_weight(weight_kg: f64) -> String {
    format!("{weight_kg:.1} kg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::client;

    #[test]
    fn postal_address_skips_missing_parts() {
        let mut user = client();
        assert_eq!(user.postal_address(), "123 Rue Mohammed V, Rabat, Agdal");
        user.city = None;
        user.district = Some("  ".into());
        assert_eq!(user.postal_address(), "123 Rue Mohammed V");
    }

    #[test]
    fn prices_format_in_dirhams() {
        assert_eq!(format_price(60u32), "60 DH");
        assert_eq!(format_price(4_294_967_296u64), "4294967296 DH");
    }
}
