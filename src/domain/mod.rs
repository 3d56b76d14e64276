//! Parcel intake, pricing, tracking and pickup logic lives here.

pub mod app_state;
pub mod dashboard;
pub mod entities;
pub mod intake;
pub mod lifecycle;
pub mod ports;
pub mod pricing;
pub mod registration;
pub mod tracking;
pub mod validation;

#[cfg(test)]
pub mod test_support;

#[allow(unused_imports)]
pub use app_state::{AppState, PersistedState};
#[allow(unused_imports)]
pub use dashboard::{
    admin_stats, client_stats, courier_stats, AdminRoster, AdminStats, ClientStats, CourierStats,
};
#[allow(unused_imports)]
pub use entities::{
    format_price, format_weight, AccountStatus, Recipient, Role, Shipment, ShipmentId, TariffRule,
    TimelineEvent, TrackingInfo, User, UserId, CITIES,
};
#[allow(unused_imports)]
pub use intake::{prepare_shipment, IntakeError, IntakeForm, NewShipment};
#[allow(unused_imports)]
pub use lifecycle::{CourierQueue, LifecycleError, ShipmentStatus};
#[allow(unused_imports)]
pub use ports::{Filter, Ordering, Record, RecordStore, StoreError, Table};
#[allow(unused_imports)]
pub use pricing::{
    estimate_from_input, LinearTariff, PriceEstimator, PricingStrategy, TariffTable,
};
#[allow(unused_imports)]
pub use registration::{
    admit, register_client, LoginForm, NewUser, Registration, RegistrationForm, SignInError,
};
#[allow(unused_imports)]
pub use tracking::{LookupError, TrackingCode, TrackingCodeError};
#[allow(unused_imports)]
pub use validation::FieldError;
