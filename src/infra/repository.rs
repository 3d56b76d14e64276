//! Typed queries over any [`RecordStore`].

use crate::domain::{
    admit, CourierQueue, Filter, LookupError, NewShipment, NewUser, Ordering, RecordStore, Role,
    Shipment, SignInError, StoreError, Table, TariffTable, TrackingCode, TrackingInfo, User,
};
use crate::infra::records::{
    decode_all, decode_shipment, decode_tariff, decode_timeline_event, decode_user,
};

fn to_record<T: serde::Serialize>(table: Table, value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|err| StoreError::Decode {
        table: table.name(),
        reason: err.to_string(),
    })
}

/// Parcels waiting in or collected from a pickup district.
pub async fn fetch_courier_queue(
    store: &dyn RecordStore,
    district: &str,
) -> Result<CourierQueue, StoreError> {
    let records = store
        .fetch(
            Table::Shipments,
            &Filter::all().eq("pickup_district", district),
            Some(&Ordering::asc("created_at")),
        )
        .await?;
    let shipments = decode_all(records, decode_shipment)?;
    tracing::info!(
        "[repository] {} shipments for district {district}",
        shipments.len()
    );
    Ok(CourierQueue::load(shipments))
}

/// A sender's parcels, newest first.
pub async fn fetch_client_shipments(
    store: &dyn RecordStore,
    sender_id: &str,
) -> Result<Vec<Shipment>, StoreError> {
    let records = store
        .fetch(
            Table::Shipments,
            &Filter::all().eq("sender_id", sender_id),
            Some(&Ordering::desc("created_at")),
        )
        .await?;
    decode_all(records, decode_shipment)
}

pub async fn fetch_all_shipments(store: &dyn RecordStore) -> Result<Vec<Shipment>, StoreError> {
    let records = store
        .fetch(
            Table::Shipments,
            &Filter::all(),
            Some(&Ordering::desc("created_at")),
        )
        .await?;
    decode_all(records, decode_shipment)
}

pub async fn find_by_tracking_code(
    store: &dyn RecordStore,
    code: &TrackingCode,
) -> Result<Option<Shipment>, StoreError> {
    let records = store
        .fetch(
            Table::Shipments,
            &Filter::all().eq("tracking_code", code.as_str()),
            None,
        )
        .await?;
    records.into_iter().next().map(decode_shipment).transpose()
}

/// Validates `raw`, then loads the parcel and its events in chronological order.
pub async fn lookup_tracking(
    store: &dyn RecordStore,
    raw: &str,
) -> Result<TrackingInfo, LookupError> {
    let code = TrackingCode::parse(raw)?;
    let shipment = find_by_tracking_code(store, &code)
        .await?
        .ok_or_else(|| LookupError::NotFound(code.clone()))?;
    let records = store
        .fetch(
            Table::ShipmentEvents,
            &Filter::all().eq("shipment_id", shipment.id.as_str()),
            Some(&Ordering::asc("occurred_at")),
        )
        .await?;
    let mut timeline = decode_all(records, decode_timeline_event)?;
    timeline.sort_by_key(|event| event.occurred_at);
    tracing::info!("[tracking] {code}: {} events", timeline.len());
    Ok(TrackingInfo { shipment, timeline })
}

pub async fn insert_shipment(
    store: &dyn RecordStore,
    shipment: &NewShipment,
) -> Result<Shipment, StoreError> {
    let record = store
        .insert(Table::Shipments, to_record(Table::Shipments, shipment)?)
        .await?;
    let stored = decode_shipment(record)?;
    tracing::info!("[repository] registered parcel {}", stored.tracking_code);
    Ok(stored)
}

pub async fn fetch_users(store: &dyn RecordStore) -> Result<Vec<User>, StoreError> {
    let records = store
        .fetch(Table::Users, &Filter::all(), Some(&Ordering::asc("last_name")))
        .await?;
    decode_all(records, decode_user)
}

pub async fn find_user(store: &dyn RecordStore, id: &str) -> Result<Option<User>, StoreError> {
    let records = store
        .fetch(Table::Users, &Filter::all().eq("id", id), None)
        .await?;
    records.into_iter().next().map(decode_user).transpose()
}

/// Finds the account holding `role` whose email or id equals `identifier`.
/// Emails compare case-insensitively.
pub async fn find_user_for_login(
    store: &dyn RecordStore,
    identifier: &str,
    role: Role,
) -> Result<Option<User>, StoreError> {
    let wanted = identifier.trim();
    let records = store
        .fetch(Table::Users, &Filter::all().eq("role", role.as_str()), None)
        .await?;
    let users = decode_all(records, decode_user)?;
    Ok(users
        .into_iter()
        .find(|user| user.email.eq_ignore_ascii_case(wanted) || user.id == wanted))
}

/// Opens a `role` session for the account matching `identifier`.
pub async fn sign_in(
    store: &dyn RecordStore,
    identifier: &str,
    role: Role,
) -> Result<User, SignInError> {
    let found = find_user_for_login(store, identifier, role).await?;
    admit(found, identifier, role)
}

/// Re-reads a remembered account. It must still hold `role` and be active.
pub async fn restore_session(
    store: &dyn RecordStore,
    user_id: &str,
    role: Role,
) -> Result<User, SignInError> {
    let found = find_user(store, user_id).await?;
    admit(found, user_id, role)
}

pub async fn insert_user(store: &dyn RecordStore, user: &NewUser) -> Result<User, StoreError> {
    let record = store
        .insert(Table::Users, to_record(Table::Users, user)?)
        .await?;
    decode_user(record)
}

pub async fn fetch_tariffs(store: &dyn RecordStore) -> Result<TariffTable, StoreError> {
    let records = store
        .fetch(Table::Tariffs, &Filter::all(), Some(&Ordering::asc("city")))
        .await?;
    Ok(TariffTable::new(decode_all(records, decode_tariff)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        prepare_shipment, register_client, AccountStatus, AdminRoster, IntakeForm, LifecycleError,
        LinearTariff, PriceEstimator, RegistrationForm, ShipmentStatus,
    };
    use crate::infra::memory::MemoryStore;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::{fixture, rstest};
    use std::time::Duration;
    use time::macros::{date, datetime};

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::seeded().with_latency(Duration::ZERO)
    }

    #[rstest]
    #[tokio::test]
    async fn courier_queue_is_fifo_by_deposit_time(store: MemoryStore) {
        let queue = fetch_courier_queue(&store, "Agdal").await.expect("queue");
        let ids: Vec<_> = queue.to_collect().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(queue.collected().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn collecting_persists_and_moves_the_parcel(store: MemoryStore) {
        let mut queue = fetch_courier_queue(&store, "Agdal").await.expect("queue");
        let collected = queue.collect("2", &store).await.expect("collect");
        assert_eq!(collected.status, ShipmentStatus::Collected);

        let reloaded = fetch_courier_queue(&store, "Agdal").await.expect("reload");
        assert_eq!(reloaded.to_collect().len(), 1);
        assert_eq!(reloaded.collected().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_collection_leaves_the_queue_untouched(store: MemoryStore) {
        let mut queue = fetch_courier_queue(&store, "Agdal").await.expect("queue");
        let before = queue.clone();
        store.set_offline(true);
        let err = queue.collect("1", &store).await.expect_err("offline");
        assert!(matches!(err, LifecycleError::Store(StoreError::Unavailable)));
        assert_eq!(queue, before);
    }

    #[rstest]
    #[tokio::test]
    async fn client_shipments_are_newest_first(store: MemoryStore) {
        let shipments = fetch_client_shipments(&store, "1").await.expect("shipments");
        let ids: Vec<_> = shipments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4", "5"]);
        assert_eq!(shipments[0].sender_name.as_deref(), Some("Ahmed Benali"));
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_returns_timeline_in_order(store: MemoryStore) {
        let info = lookup_tracking(&store, " PM20240127009012 ")
            .await
            .expect("known code");
        assert_eq!(info.shipment.id, "5");
        let statuses: Vec<_> = info.timeline.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                ShipmentStatus::Pending,
                ShipmentStatus::Collected,
                ShipmentStatus::InTransit
            ]
        );
    }

    #[rstest]
    #[case("PM99999999999999")]
    #[tokio::test]
    async fn lookup_of_unknown_code_is_not_found(store: MemoryStore, #[case] raw: &str) {
        let err = lookup_tracking(&store, raw).await.expect_err("unknown");
        assert!(matches!(err, LookupError::NotFound(code) if code.as_str() == raw));
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_rejects_malformed_codes_before_querying(store: MemoryStore) {
        store.set_offline(true);
        let err = lookup_tracking(&store, "XX123").await.expect_err("malformed");
        assert!(matches!(err, LookupError::InvalidCode(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_distinguishes_store_failures(store: MemoryStore) {
        store.set_offline(true);
        let err = lookup_tracking(&store, "PM20240127009012")
            .await
            .expect_err("offline");
        assert!(matches!(err, LookupError::Store(StoreError::Unavailable)));
    }

    #[rstest]
    #[tokio::test]
    async fn submitted_parcel_is_trackable(store: MemoryStore) {
        let sender = find_user(&store, "1").await.expect("query").expect("seeded");
        let form = IntakeForm {
            recipient_name: "Youssef Mansouri".into(),
            recipient_phone: "0612345678".into(),
            recipient_address: "5 Derb Sidi Ahmed".into(),
            city: "Agadir".into(),
            district: "Talborjt".into(),
            weight: "2".into(),
            description: String::new(),
        };
        let estimator = LinearTariff::default();
        let mut rng = StdRng::seed_from_u64(3);
        let new = prepare_shipment(
            &form,
            &sender,
            &estimator,
            datetime!(2025-01-29 10:00 UTC),
            &mut rng,
        )
        .expect("valid form");
        let stored = insert_shipment(&store, &new).await.expect("insert");
        assert_eq!(stored.price, estimator.estimate(2.0, "Agadir").unwrap_or(0));
        assert_eq!(stored.pickup_district.as_deref(), Some("Agdal"));

        let info = lookup_tracking(&store, stored.tracking_code.as_str())
            .await
            .expect("trackable");
        assert_eq!(info.shipment.status, ShipmentStatus::Pending);
        assert!(info.timeline.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn registered_client_can_sign_in(store: MemoryStore) {
        let form = RegistrationForm {
            last_name: "Tazi".into(),
            first_name: "Salma".into(),
            national_id: "AB123456".into(),
            email: "Salma.Tazi@Email.ma".into(),
            phone: "+212655443322".into(),
            address: "10 Rue Oued Fes".into(),
            city: "Rabat".into(),
            district: "Agdal".into(),
        };
        let mut rng = StdRng::seed_from_u64(9);
        let registration =
            register_client(&form, date!(2025 - 02 - 01), &mut rng).expect("valid form");
        let user = insert_user(&store, &registration.user).await.expect("insert");
        assert_eq!(user.registered_on, date!(2025 - 02 - 01));
        assert_eq!(user.national_id.as_deref(), Some("AB123456"));

        let found = find_user_for_login(&store, "salma.tazi@email.ma", Role::Client)
            .await
            .expect("query");
        assert_eq!(found.map(|u| u.id), Some(user.id));
        let wrong_role = find_user_for_login(&store, "salma.tazi@email.ma", Role::Admin)
            .await
            .expect("query");
        assert!(wrong_role.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn inactive_accounts_cannot_sign_in_or_restore(store: MemoryStore) {
        let err = sign_in(&store, "omar.nejjar@email.ma", Role::Client)
            .await
            .expect_err("inactive");
        assert!(matches!(err, SignInError::Inactive { .. }));
        let err = restore_session(&store, "3", Role::Client)
            .await
            .expect_err("inactive");
        assert!(matches!(err, SignInError::Inactive { .. }));

        let user = sign_in(&store, "AHMED.BENALI@email.ma", Role::Client)
            .await
            .expect("active client");
        assert_eq!(user.id, "1");
        let restored = restore_session(&store, "1", Role::Client)
            .await
            .expect("still active");
        assert_eq!(restored, user);
    }

    #[rstest]
    #[tokio::test]
    async fn deactivated_session_is_not_restored(store: MemoryStore) {
        let mut roster = AdminRoster::new(fetch_users(&store).await.expect("users"));
        roster.toggle_status("1", &store).await.expect("deactivate");

        let err = restore_session(&store, "1", Role::Client)
            .await
            .expect_err("deactivated");
        assert!(matches!(err, SignInError::Inactive { .. }));
    }

    #[rstest]
    #[case("1", Role::Courier)]
    #[case("99", Role::Client)]
    #[tokio::test]
    async fn restore_needs_the_same_role(store: MemoryStore, #[case] id: &str, #[case] role: Role) {
        let err = restore_session(&store, id, role).await.expect_err("no match");
        assert!(matches!(err, SignInError::UnknownAccount { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_reports_store_failures(store: MemoryStore) {
        store.set_offline(true);
        let err = sign_in(&store, "ahmed.benali@email.ma", Role::Client)
            .await
            .expect_err("offline");
        assert!(matches!(err, SignInError::Store(StoreError::Unavailable)));
    }

    #[rstest]
    #[tokio::test]
    async fn roster_toggle_is_persisted(store: MemoryStore) {
        let mut roster = AdminRoster::new(fetch_users(&store).await.expect("users"));
        let next = roster.toggle_status("3", &store).await.expect("toggle");
        assert_eq!(next, AccountStatus::Active);

        let reloaded = find_user(&store, "3").await.expect("query").expect("user");
        assert_eq!(reloaded.status, AccountStatus::Active);
    }

    #[rstest]
    #[tokio::test]
    async fn roster_toggle_failure_keeps_status(store: MemoryStore) {
        let mut roster = AdminRoster::new(fetch_users(&store).await.expect("users"));
        store.set_offline(true);
        assert!(roster.toggle_status("1", &store).await.is_err());
        let user = roster.users().iter().find(|u| u.id == "1").expect("listed");
        assert_eq!(user.status, AccountStatus::Active);
    }

    #[rstest]
    #[tokio::test]
    async fn tariffs_load_into_a_table(store: MemoryStore) {
        let table = fetch_tariffs(&store).await.expect("tariffs");
        assert_eq!(table.rules().len(), 4);
        assert_eq!(table.estimate(0.5, "casablanca"), Some(30));
        assert_eq!(table.estimate(3.0, "Rabat"), Some(35));
        assert_eq!(table.estimate(7.0, "Rabat"), None);
    }
}
