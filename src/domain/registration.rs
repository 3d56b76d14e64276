//! Client self-registration and the login form.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use time::Date;

use super::entities::{calendar_date, AccountStatus, Role, User};
use super::ports::StoreError;
use super::validation::{
    has_min_chars, is_email, is_moroccan_phone, is_national_id, Checks, FieldError,
};

const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
pub const PASSWORD_LEN: usize = 12;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistrationForm {
    pub last_name: String,
    pub first_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::new();
        checks
            .require(
                has_min_chars(&self.last_name, 2),
                "last_name",
                "Last name must be at least 2 characters",
            )
            .require(
                has_min_chars(&self.first_name, 2),
                "first_name",
                "First name must be at least 2 characters",
            )
            .require(
                is_national_id(self.national_id.trim()),
                "national_id",
                "Invalid ID card number (e.g. A123456)",
            )
            .require(is_email(self.email.trim()), "email", "Invalid email")
            .require(
                is_moroccan_phone(self.phone.trim()),
                "phone",
                "Invalid Moroccan phone number",
            )
            .require(
                has_min_chars(&self.address, 5),
                "address",
                "Address must be at least 5 characters",
            )
            .require(!self.city.trim().is_empty(), "city", "Select a city")
            .require(
                has_min_chars(&self.district, 2),
                "district",
                "District must be at least 2 characters",
            );
        checks.finish()
    }
}

/// Insert payload for the users table. The initial password is handed to the
/// client once and never stored here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(with = "calendar_date")]
    pub registered_on: Date,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    pub user: NewUser,
    pub initial_password: String,
}

pub fn register_client<R: Rng + ?Sized>(
    form: &RegistrationForm,
    today: Date,
    rng: &mut R,
) -> Result<Registration, Vec<FieldError>> {
    form.validate()?;
    let user = NewUser {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        national_id: form.national_id.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        phone: form.phone.trim().to_string(),
        address: form.address.trim().to_string(),
        city: form.city.trim().to_string(),
        district: form.district.trim().to_string(),
        role: Role::Client,
        status: AccountStatus::Active,
        registered_on: today,
    };
    Ok(Registration {
        user,
        initial_password: generate_password(rng),
    })
}

pub fn generate_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..PASSWORD_LEN)
        .map(|_| PASSWORD_CHARSET[rng.gen_range(0..PASSWORD_CHARSET.len())] as char)
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::new();
        checks
            .require(
                !self.identifier.trim().is_empty(),
                "identifier",
                "Email or identifier required",
            )
            .require(!self.password.is_empty(), "password", "Password required");
        checks.finish()
    }
}

/// Why a session could not be opened for an account.
#[derive(Debug, Error)]
pub enum SignInError {
    #[error("no {} account matches {}", .role.name(), .identifier)]
    UnknownAccount { identifier: String, role: Role },
    #[error("the account {email} is inactive")]
    Inactive { email: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lets `candidate` open a `role` session. The account must hold that role
/// and be active; login and session restore both go through here.
pub fn admit(candidate: Option<User>, identifier: &str, role: Role) -> Result<User, SignInError> {
    match candidate {
        Some(user) if user.role == role => match user.status {
            AccountStatus::Active => Ok(user),
            AccountStatus::Inactive => Err(SignInError::Inactive { email: user.email }),
        },
        _ => Err(SignInError::UnknownAccount {
            identifier: identifier.trim().to_string(),
            role,
        }),
    }
}
