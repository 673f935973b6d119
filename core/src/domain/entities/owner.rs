//! Owners of a contact: a natural person or a company

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::NationalCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Person,
    Company,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Person => "person",
            OwnerKind::Company => "company",
        }
    }
}

/// Typed pointer to the owner of a contact or customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub id: Uuid,
}

impl OwnerRef {
    pub fn person(id: Uuid) -> Self {
        Self {
            kind: OwnerKind::Person,
            id,
        }
    }

    pub fn company(id: Uuid) -> Self {
        Self {
            kind: OwnerKind::Company,
            id,
        }
    }
}

/// A natural person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub national_code: Option<NationalCode>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    pub fn new(national_code: Option<NationalCode>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            last_name: None,
            national_code,
            birth_date: None,
            birth_place: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> Option<String> {
        match (&self.name, &self.last_name) {
            (Some(name), Some(last)) => Some(format!("{} {}", name, last)),
            (Some(name), None) => Some(name.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }
}

/// An organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub registration_number: Option<String>,
    pub economic_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            registration_number: None,
            economic_code: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Resolved owner record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Owner {
    Person(Person),
    Company(Company),
}

impl Owner {
    pub fn reference(&self) -> OwnerRef {
        match self {
            Owner::Person(person) => OwnerRef::person(person.id),
            Owner::Company(company) => OwnerRef::company(company.id),
        }
    }

    pub fn display_name(&self) -> Option<String> {
        match self {
            Owner::Person(person) => person.full_name(),
            Owner::Company(company) => Some(company.name.clone()),
        }
    }
}
