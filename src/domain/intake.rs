//! Registering a new parcel before pickup.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use super::entities::{User, UserId};
use super::lifecycle::ShipmentStatus;
use super::pricing::{parse_weight, PriceEstimator};
use super::tracking::TrackingCode;
use super::validation::{has_min_chars, is_moroccan_phone, Checks, FieldError};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntakeForm {
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub city: String,
    pub district: String,
    pub weight: String,
    pub description: String,
}

const WEIGHT_MESSAGE: &str = "Invalid weight (e.g. 2.5, at most 1000 kg)";

impl IntakeForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::new();
        checks
            .require(
                has_min_chars(&self.recipient_name, 2),
                "recipient_name",
                "Name must be at least 2 characters",
            )
            .require(
                is_moroccan_phone(self.recipient_phone.trim()),
                "recipient_phone",
                "Invalid Moroccan phone number",
            )
            .require(
                has_min_chars(&self.recipient_address, 5),
                "recipient_address",
                "Address must be at least 5 characters",
            )
            .require(
                !self.city.trim().is_empty(),
                "city",
                "Select a destination city",
            )
            .require(
                has_min_chars(&self.district, 2),
                "district",
                "District must be at least 2 characters",
            )
            .require(
                parse_weight(&self.weight).is_some(),
                "weight",
                WEIGHT_MESSAGE,
            );
        checks.finish()
    }
}

/// Insert payload for the shipments table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewShipment {
    pub tracking_code: TrackingCode,
    pub sender_id: UserId,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub destination_city: String,
    pub destination_district: String,
    pub pickup_address: Option<String>,
    pub pickup_district: Option<String>,
    pub weight_kg: f64,
    pub price: u32,
    pub status: ShipmentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum IntakeError {
    #[error("{} field(s) need attention", .0.len())]
    Invalid(Vec<FieldError>),
    #[error("no tariff covers {weight_kg} kg to {city}")]
    Unpriced { weight_kg: f64, city: String },
}

/// Validates the form, prices it and assigns a tracking code for `now`'s date.
pub fn prepare_shipment<R: Rng + ?Sized>(
    form: &IntakeForm,
    sender: &User,
    estimator: &dyn PriceEstimator,
    now: OffsetDateTime,
    rng: &mut R,
) -> Result<NewShipment, IntakeError> {
    form.validate().map_err(IntakeError::Invalid)?;

    let city = form.city.trim().to_string();
    let weight_kg = parse_weight(&form.weight).ok_or_else(|| {
        IntakeError::Invalid(vec![FieldError::new("weight", WEIGHT_MESSAGE)])
    })?;
    let price = estimator
        .estimate(weight_kg, &city)
        .ok_or_else(|| IntakeError::Unpriced {
            weight_kg,
            city: city.clone(),
        })?;

    let description = Some(form.description.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    Ok(NewShipment {
        tracking_code: TrackingCode::generate_on(now.date(), rng),
        sender_id: sender.id.clone(),
        recipient_name: form.recipient_name.trim().to_string(),
        recipient_phone: form.recipient_phone.trim().to_string(),
        recipient_address: form.recipient_address.trim().to_string(),
        destination_city: city,
        destination_district: form.district.trim().to_string(),
        pickup_address: sender.address.clone(),
        pickup_district: sender.district.clone(),
        weight_kg,
        price,
        status: ShipmentStatus::Pending,
        created_at: now,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::{LinearTariff, TariffTable};
    use crate::domain::test_support::client;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    #[fixture]
    fn form() -> IntakeForm {
        IntakeForm {
            recipient_name: "Fatima Alaoui".into(),
            recipient_phone: "+212612345678".into(),
            recipient_address: "12 Rue Ibn Sina".into(),
            city: "Casablanca".into(),
            district: "Maarif".into(),
            weight: "2.5".into(),
            description: "  ".into(),
        }
    }

    #[rstest]
    fn prepared_shipment_is_pending_and_priced(form: IntakeForm) {
        let now = datetime!(2025-01-29 10:15 UTC);
        let mut rng = StdRng::seed_from_u64(1);
        let sender = client();

        let shipment = prepare_shipment(&form, &sender, &LinearTariff::default(), now, &mut rng)
            .expect("valid form");

        assert_eq!(shipment.price, 60);
        assert_eq!(shipment.status, ShipmentStatus::Pending);
        assert_eq!(shipment.created_at, now);
        assert_eq!(shipment.sender_id, sender.id);
        assert_eq!(shipment.pickup_district.as_deref(), Some("Agdal"));
        assert!(shipment.tracking_code.as_str().starts_with("PM20250129"));
        assert_eq!(shipment.description, None);
    }

    #[rstest]
    fn every_invalid_field_is_reported(mut form: IntakeForm) {
        form.recipient_name = "A".into();
        form.recipient_phone = "12345".into();
        form.city = String::new();
        form.weight = "2,5".into();

        let errors = form.validate().expect_err("invalid form");
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["recipient_name", "recipient_phone", "city", "weight"]);
    }

    #[rstest]
    #[case("0")]
    #[case("0.0")]
    #[case("")]
    #[case("abc")]
    #[case("1e3")]
    #[case("1000000000")]
    fn zero_or_garbage_weight_is_invalid(mut form: IntakeForm, #[case] weight: &str) {
        form.weight = weight.into();
        let err = prepare_shipment(
            &form,
            &client(),
            &LinearTariff::default(),
            datetime!(2025-01-29 10:15 UTC),
            &mut StdRng::seed_from_u64(1),
        )
        .expect_err("weight rejected");
        assert!(matches!(err, IntakeError::Invalid(fields) if fields.iter().any(|f| f.field == "weight")));
    }

    #[rstest]
    fn unpriced_destination_is_reported(form: IntakeForm) {
        let err = prepare_shipment(
            &form,
            &client(),
            &TariffTable::default(),
            datetime!(2025-01-29 10:15 UTC),
            &mut StdRng::seed_from_u64(1),
        )
        .expect_err("empty grid prices nothing");
        assert_eq!(
            err,
            IntakeError::Unpriced {
                weight_kg: 2.5,
                city: "Casablanca".into()
            }
        );
    }

    #[rstest]
    fn insert_payload_uses_column_names(form: IntakeForm) {
        let shipment = prepare_shipment(
            &form,
            &client(),
            &LinearTariff::default(),
            datetime!(2025-01-29 10:15 UTC),
            &mut StdRng::seed_from_u64(1),
        )
        .expect("valid form");
        let payload = serde_json::to_value(&shipment).expect("serialize");
        assert_eq!(payload["status"], "pending");
        assert_eq!(payload["created_at"], "2025-01-29T10:15:00Z");
        assert_eq!(payload["destination_city"], "Casablanca");
        assert!(payload.get("description").is_none());
    }
}
