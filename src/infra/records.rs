//! Typed views of store records.
//!
//! Each record is decoded exactly once here; everything past this module
//! works with domain types.

use serde::{de::DeserializeOwned, Deserialize};
use time::{Date, OffsetDateTime};

use crate::domain::{
    entities::calendar_date, AccountStatus, Record, Recipient, Role, Shipment, ShipmentStatus, StoreError, Table,
    TariffRule, TimelineEvent, TrackingCode, User,
};

#[derive(Debug, Deserialize)]
struct SenderJoin {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShipmentRecord {
    #[serde(deserialize_with = "string_from_json")]
    id: String,
    tracking_code: TrackingCode,
    #[serde(deserialize_with = "string_from_json")]
    sender_id: String,
    #[serde(default)]
    sender: Option<SenderJoin>,
    recipient_name: String,
    recipient_phone: String,
    recipient_address: String,
    destination_city: String,
    #[serde(default)]
    destination_district: String,
    #[serde(default)]
    pickup_address: Option<String>,
    #[serde(default)]
    pickup_district: Option<String>,
    #[serde(deserialize_with = "weight_from_json")]
    weight_kg: f64,
    price: u32,
    status: ShipmentStatus,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    delivered_at: Option<OffsetDateTime>,
    #[serde(default)]
    description: Option<String>,
}

impl From<ShipmentRecord> for Shipment {
    fn from(record: ShipmentRecord) -> Self {
        let (sender_name, sender_phone) = match record.sender {
            Some(join) => {
                let name = [join.first_name, join.last_name]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                (Some(name).filter(|n| !n.is_empty()), join.phone)
            }
            None => (None, None),
        };
        Self {
            id: record.id,
            tracking_code: record.tracking_code,
            sender_id: record.sender_id,
            sender_name,
            sender_phone,
            pickup_address: record.pickup_address,
            pickup_district: record.pickup_district,
            recipient: Recipient {
                name: record.recipient_name,
                phone: record.recipient_phone,
                address: record.recipient_address,
            },
            destination_city: record.destination_city,
            destination_district: record.destination_district,
            weight_kg: record.weight_kg,
            price: record.price,
            status: record.status,
            created_at: record.created_at,
            delivered_at: record.delivered_at,
            description: record.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(deserialize_with = "string_from_json")]
    id: String,
    first_name: String,
    #[serde(default)]
    last_name: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    national_id: Option<String>,
    #[serde(default)]
    address: Option<String>,
    role: Role,
    #[serde(default)]
    status: AccountStatus,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    district: Option<String>,
    registered_on: RegisteredOn,
}

/// `date` columns arrive as `2024-01-15`, older `timestamptz` ones as RFC 3339.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegisteredOn {
    Day(#[serde(with = "calendar_date")] Date),
    Instant(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
}

impl RegisteredOn {
    fn date(self) -> Date {
        match self {
            RegisteredOn::Day(date) => date,
            RegisteredOn::Instant(at) => at.date(),
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone,
            national_id: record.national_id.filter(|id| !id.trim().is_empty()),
            address: record.address,
            role: record.role,
            status: record.status,
            city: record.city,
            district: record.district,
            registered_on: record.registered_on.date(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TariffRecord {
    #[serde(deserialize_with = "string_from_json")]
    id: String,
    city: String,
    weight_min_kg: f64,
    weight_max_kg: f64,
    price: u32,
}

impl From<TariffRecord> for TariffRule {
    fn from(record: TariffRecord) -> Self {
        Self {
            id: record.id,
            city: record.city,
            weight_min_kg: record.weight_min_kg,
            weight_max_kg: record.weight_max_kg,
            price: record.price,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimelineRecord {
    status: ShipmentStatus,
    description: String,
    #[serde(with = "time::serde::rfc3339")]
    occurred_at: OffsetDateTime,
    #[serde(default)]
    location: Option<String>,
}

impl From<TimelineRecord> for TimelineEvent {
    fn from(record: TimelineRecord) -> Self {
        Self {
            status: record.status,
            description: record.description,
            occurred_at: record.occurred_at,
            location: record.location,
        }
    }
}

pub fn decode_shipment(record: Record) -> Result<Shipment, StoreError> {
    decode::<ShipmentRecord>(Table::Shipments, record).map(Shipment::from)
}

pub fn decode_user(record: Record) -> Result<User, StoreError> {
    decode::<UserRecord>(Table::Users, record).map(User::from)
}

pub fn decode_tariff(record: Record) -> Result<TariffRule, StoreError> {
    decode::<TariffRecord>(Table::Tariffs, record).map(TariffRule::from)
}

pub fn decode_timeline_event(record: Record) -> Result<TimelineEvent, StoreError> {
    decode::<TimelineRecord>(Table::ShipmentEvents, record).map(TimelineEvent::from)
}

/// Decodes every record or fails on the first malformed one.
pub fn decode_all<T>(
    records: Vec<Record>,
    decode_one: fn(Record) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    records.into_iter().map(decode_one).collect()
}

fn decode<T: DeserializeOwned>(table: Table, record: Record) -> Result<T, StoreError> {
    serde_json::from_value(record).map_err(|err| StoreError::Decode {
        table: table.name(),
        reason: err.to_string(),
    })
}

fn string_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> serde::de::Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

/// Numeric column, or a legacy `"2.5 kg"` string.
fn weight_from_json<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Weight;

    impl<'de> serde::de::Visitor<'de> for Weight {
        type Value = f64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a weight in kilograms")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let trimmed = value.trim();
            let number = trimmed.strip_suffix("kg").unwrap_or(trimmed).trim();
            number
                .parse::<f64>()
                .map_err(|_| E::custom(format!("unparsable weight {value:?}")))
        }
    }

    deserializer.deserialize_any(Weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use time::macros::{date, datetime};

    fn shipment_json() -> Record {
        json!({
            "id": 1,
            "tracking_code": "PM20250129001234",
            "sender_id": 7,
            "sender": {"first_name": "Ahmed", "last_name": "Benali", "phone": "+212612345678"},
            "recipient_name": "Fatima Alaoui",
            "recipient_phone": "+212600000000",
            "recipient_address": "12 Rue Ibn Sina",
            "destination_city": "Casablanca",
            "destination_district": "Maarif",
            "pickup_district": "Agdal",
            "weight_kg": "2.5 kg",
            "price": 60,
            "status": "en_attente",
            "created_at": "2024-01-29T09:00:00Z"
        })
    }

    #[test]
    fn shipment_record_flattens_sender_join() {
        let shipment = decode_shipment(shipment_json()).expect("valid record");
        assert_eq!(shipment.id, "1");
        assert_eq!(shipment.sender_id, "7");
        assert_eq!(shipment.sender_name.as_deref(), Some("Ahmed Benali"));
        assert_eq!(shipment.status, ShipmentStatus::Pending);
        assert_eq!(shipment.weight_kg, 2.5);
        assert_eq!(shipment.created_at, datetime!(2024-01-29 09:00 UTC));
        assert_eq!(shipment.delivered_at, None);
    }

    #[rstest]
    #[case("tracking_code", json!("PM123"))]
    #[case("status", json!("lost"))]
    #[case("weight_kg", json!("heavy"))]
    #[case("created_at", json!("yesterday"))]
    fn malformed_shipment_fields_are_rejected(#[case] field: &str, #[case] value: Record) {
        let mut record = shipment_json();
        record[field] = value;
        let err = decode_shipment(record).expect_err("malformed");
        assert!(matches!(err, StoreError::Decode { table: "shipments", .. }));
    }

    #[test]
    fn user_record_accepts_legacy_role_and_status() {
        let user = decode_user(json!({
            "id": "2",
            "first_name": "Fatima",
            "last_name": "Alaoui",
            "email": "fatima.alaoui@email.ma",
            "role": "facteur",
            "status": "inactif",
            "registered_on": "2024-01-10T00:00:00Z"
        }))
        .expect("valid user");
        assert_eq!(user.role, Role::Courier);
        assert_eq!(user.status, AccountStatus::Inactive);
        assert_eq!(user.registered_on, date!(2024 - 01 - 10));
        assert_eq!(user.national_id, None);
    }

    #[rstest]
    #[case(json!("2024-01-15"), Some(date!(2024 - 01 - 15)))]
    #[case(json!("2024-01-15T23:30:00+01:00"), Some(date!(2024 - 01 - 15)))]
    #[case(json!("15/01/2024"), None)]
    #[case(json!("2024-1-15"), None)]
    fn registration_dates_accept_days_and_timestamps(
        #[case] raw: Record,
        #[case] expected: Option<Date>,
    ) {
        let decoded = decode_user(json!({
            "id": 4,
            "first_name": "Aicha",
            "last_name": "Benali",
            "email": "aicha.benali@email.ma",
            "national_id": "AB654321",
            "role": "client",
            "registered_on": raw
        }));
        match expected {
            Some(day) => {
                let user = decoded.expect("valid user");
                assert_eq!(user.registered_on, day);
                assert_eq!(user.national_id.as_deref(), Some("AB654321"));
            }
            None => assert!(matches!(decoded, Err(StoreError::Decode { table: "users", .. }))),
        }
    }

    #[test]
    fn decode_all_stops_at_first_bad_record() {
        let records = vec![
            json!({"id": 1, "city": "Rabat", "weight_min_kg": 0, "weight_max_kg": 1, "price": 25}),
            json!({"id": 2, "city": "Rabat"}),
        ];
        assert!(decode_all(records, decode_tariff).is_err());
    }
}
