pub mod admin_dashboard;
pub mod client_dashboard;
pub mod courier_dashboard;
pub mod home;
pub mod login;
pub mod new_package;
pub mod register;
pub mod tracking;

pub use admin_dashboard::AdminDashboardPage;
pub use client_dashboard::ClientDashboardPage;
pub use courier_dashboard::CourierDashboardPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use new_package::NewPackagePage;
pub use register::RegisterPage;
pub use tracking::TrackingPage;

use crate::domain::FieldError;

/// First message reported for `field`, if any.
pub(crate) fn error_for(errors: &[FieldError], field: &str) -> Option<&'static str> {
    errors
        .iter()
        .find(|error| error.field == field)
        .map(|error| error.message)
}
