//! Row mapping and error translation for the MySQL identity store

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{Decode, MySql, Row, Type};
use uuid::Uuid;

use ident_core::domain::entities::{
    ChangeRequest, Company, Contact, Customer, OwnerKind, OwnerRef, Person, VerificationTicket,
};
use ident_core::domain::value_objects::{Channel, NationalCode};
use ident_core::errors::DomainError;

pub(crate) const PERSON_COLUMNS: &str =
    "id, name, last_name, national_code, birth_date, birth_place, created_at, updated_at";

pub(crate) const COMPANY_COLUMNS: &str =
    "id, name, registration_number, economic_code, created_at, updated_at";

pub(crate) const CONTACT_COLUMNS: &str = "id, owner_kind, owner_id, email, mobile, telephone, \
     address, postal_code, created_at, updated_at, deleted_at";

pub(crate) const CUSTOMER_COLUMNS: &str = "id, contact_id, owner_kind, owner_id, password_hash, \
     is_active, email_verify, mobile_verify, total_credit, last_login, created_at, updated_at, \
     deleted_at";

pub(crate) const CHANGE_REQUEST_COLUMNS: &str =
    "sequence, id, customer_id, channel, old_value, new_value, created_at";

pub(crate) const TICKET_COLUMNS: &str =
    "sequence, id, customer_id, channel, target, code, created_at";

fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::internal(format!("Failed to read column {}: {}", name, e)))
}

fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw)
        .map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", name, e)))
}

pub(crate) fn parse_owner_kind(raw: &str) -> Result<OwnerKind, DomainError> {
    match raw {
        "person" => Ok(OwnerKind::Person),
        "company" => Ok(OwnerKind::Company),
        other => Err(DomainError::internal(format!("Unknown owner kind: {}", other))),
    }
}

pub(crate) fn parse_channel(raw: &str) -> Result<Channel, DomainError> {
    raw.parse().map_err(DomainError::internal)
}

/// `customers` column holding the channel's verification time
pub(crate) fn verify_column(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => "email_verify",
        Channel::Mobile => "mobile_verify",
    }
}

/// `contacts` column holding the channel's value
pub(crate) fn contact_column(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => "email",
        Channel::Mobile => "mobile",
    }
}

fn owner_ref(row: &MySqlRow) -> Result<OwnerRef, DomainError> {
    let kind: String = column(row, "owner_kind")?;
    Ok(OwnerRef {
        kind: parse_owner_kind(&kind)?,
        id: uuid_column(row, "owner_id")?,
    })
}

pub(crate) fn person_from_row(row: &MySqlRow) -> Result<Person, DomainError> {
    let national_code = column::<Option<String>>(row, "national_code")?
        .map(|code| {
            NationalCode::parse(&code)
                .map_err(|_| DomainError::internal("Stored national code fails its checksum"))
        })
        .transpose()?;

    Ok(Person {
        id: uuid_column(row, "id")?,
        name: column(row, "name")?,
        last_name: column(row, "last_name")?,
        national_code,
        birth_date: column::<Option<NaiveDate>>(row, "birth_date")?,
        birth_place: column(row, "birth_place")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn company_from_row(row: &MySqlRow) -> Result<Company, DomainError> {
    Ok(Company {
        id: uuid_column(row, "id")?,
        name: column(row, "name")?,
        registration_number: column(row, "registration_number")?,
        economic_code: column(row, "economic_code")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn contact_from_row(row: &MySqlRow) -> Result<Contact, DomainError> {
    Ok(Contact {
        id: uuid_column(row, "id")?,
        owner: owner_ref(row)?,
        email: column(row, "email")?,
        mobile: column(row, "mobile")?,
        telephone: column(row, "telephone")?,
        address: column(row, "address")?,
        postal_code: column(row, "postal_code")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
        deleted_at: column::<Option<DateTime<Utc>>>(row, "deleted_at")?,
    })
}

pub(crate) fn customer_from_row(row: &MySqlRow) -> Result<Customer, DomainError> {
    Ok(Customer {
        id: uuid_column(row, "id")?,
        contact_id: uuid_column(row, "contact_id")?,
        owner: owner_ref(row)?,
        password_hash: column(row, "password_hash")?,
        is_active: column(row, "is_active")?,
        email_verify: column(row, "email_verify")?,
        mobile_verify: column(row, "mobile_verify")?,
        total_credit: column(row, "total_credit")?,
        last_login: column(row, "last_login")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
        deleted_at: column(row, "deleted_at")?,
    })
}

pub(crate) fn change_request_from_row(row: &MySqlRow) -> Result<ChangeRequest, DomainError> {
    let channel: String = column(row, "channel")?;
    Ok(ChangeRequest {
        id: uuid_column(row, "id")?,
        sequence: column(row, "sequence")?,
        customer_id: uuid_column(row, "customer_id")?,
        channel: parse_channel(&channel)?,
        old_value: column(row, "old_value")?,
        new_value: column(row, "new_value")?,
        created_at: column(row, "created_at")?,
    })
}

pub(crate) fn ticket_from_row(row: &MySqlRow) -> Result<VerificationTicket, DomainError> {
    let channel: String = column(row, "channel")?;
    Ok(VerificationTicket {
        id: uuid_column(row, "id")?,
        sequence: column(row, "sequence")?,
        customer_id: uuid_column(row, "customer_id")?,
        channel: parse_channel(&channel)?,
        target: column(row, "target")?,
        code: column(row, "code")?,
        created_at: column(row, "created_at")?,
    })
}

/// Identifier field guarded by the unique index named in a MySQL duplicate-entry message
///
/// MySQL 8 reports `for key 'contacts.uq_contacts_email'`, 5.7 omits the table.
pub(crate) fn duplicate_field(message: &str) -> Option<&'static str> {
    let key = message.rsplit("for key ").next()?;
    if key.contains("uq_contacts_email") {
        Some("email")
    } else if key.contains("uq_contacts_mobile") {
        Some("mobile")
    } else if key.contains("uq_persons_national_code") {
        Some("national_code")
    } else {
        None
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Translate a failed write, surfacing identifier collisions as conflicts
pub(crate) fn write_error(err: sqlx::Error) -> DomainError {
    if is_unique_violation(&err) {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(field) = duplicate_field(db_err.message()) {
                return DomainError::duplicate(field);
            }
        }
    }
    tracing::error!(event = "database_write_failed", error = %err, "Database write failed");
    DomainError::internal(format!("Database write failed: {}", err))
}

pub(crate) fn query_error(err: sqlx::Error) -> DomainError {
    tracing::error!(event = "database_query_failed", error = %err, "Database query failed");
    DomainError::internal(format!("Database query failed: {}", err))
}
