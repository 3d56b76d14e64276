//! Builders shared by unit tests.

use time::{format_description::well_known::Rfc3339, macros::date, OffsetDateTime};

use super::entities::{AccountStatus, Recipient, Role, Shipment, User};
use super::lifecycle::ShipmentStatus;
use super::tracking::TrackingCode;

pub fn shipment(id: &str, created_at: &str, status: ShipmentStatus) -> Shipment {
    let created_at = OffsetDateTime::parse(created_at, &Rfc3339).expect("RFC 3339 timestamp");
    let suffix: u32 = id.parse().unwrap_or(0);
    Shipment {
        id: id.to_string(),
        tracking_code: TrackingCode::parse(&format!("PM20240129{suffix:06}"))
            .expect("valid code"),
        sender_id: "1".into(),
        sender_name: Some("Ahmed Benali".into()),
        sender_phone: Some("+212612345678".into()),
        pickup_address: Some("123 Rue Mohammed V, Agdal".into()),
        pickup_district: Some("Agdal".into()),
        recipient: Recipient {
            name: "Fatima Alaoui".into(),
            phone: "+212600000000".into(),
            address: "12 Rue Ibn Sina".into(),
        },
        destination_city: "Casablanca".into(),
        destination_district: "Maarif".into(),
        weight_kg: 2.5,
        price: 60,
        status,
        created_at,
        delivered_at: None,
        description: None,
    }
}

pub fn client() -> User {
    User {
        id: "1".into(),
        first_name: "Ahmed".into(),
        last_name: "Benali".into(),
        email: "ahmed.benali@email.ma".into(),
        phone: Some("+212612345678".into()),
        national_id: Some("AB123456".into()),
        address: Some("123 Rue Mohammed V".into()),
        role: Role::Client,
        status: AccountStatus::Active,
        city: Some("Rabat".into()),
        district: Some("Agdal".into()),
        registered_on: date!(2024 - 01 - 15),
    }
}
