//! Request and result types for registration

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Contact, Customer, Person};
use crate::services::verification::IssuedTicket;

/// Sign-up form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub national_code: String,
    pub password: String,
    #[serde(default)]
    pub agree_with_policy: bool,
}

/// Records created by a successful sign-up
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub customer: Customer,
    pub contact: Contact,
    pub person: Person,
    /// First verification ticket, `None` if it could not be issued
    pub ticket: Option<IssuedTicket>,
}
