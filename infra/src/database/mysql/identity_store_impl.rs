//! MySQL implementation of the IdentityStore trait.
//!
//! Multi-row writes (registration, pending changes, confirmations, deletion) run
//! in a single transaction. Lookups of contacts and customers always filter on
//! `deleted_at IS NULL`; the unique indexes do not, so a soft-deleted account
//! keeps its email, mobile and national code reserved.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlConnection, MySqlPool};
use uuid::Uuid;

use ident_core::domain::entities::{
    ChangeRequest, Contact, Customer, Owner, OwnerKind, OwnerRef, Person, VerificationTicket,
};
use ident_core::domain::value_objects::{Channel, NationalCode};
use ident_core::errors::{DomainError, VerificationError};
use ident_core::repositories::{
    IdentityStore, PendingChange, RegistrationBundle, VerificationCommit,
};

use super::rows::{
    change_request_from_row, company_from_row, contact_column, contact_from_row,
    customer_from_row, person_from_row, query_error, ticket_from_row, verify_column,
    write_error, CHANGE_REQUEST_COLUMNS,
    COMPANY_COLUMNS, CONTACT_COLUMNS, CUSTOMER_COLUMNS, PERSON_COLUMNS, TICKET_COLUMNS,
};

/// MySQL implementation of IdentityStore
pub struct MySqlIdentityStore {
    pool: MySqlPool,
}

impl MySqlIdentityStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_contact_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<Contact>, DomainError> {
        let query = format!(
            "SELECT {} FROM contacts WHERE {} = ? AND deleted_at IS NULL LIMIT 1",
            CONTACT_COLUMNS, predicate
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(contact_from_row).transpose()
    }

    async fn insert_person(conn: &mut MySqlConnection, person: &Person) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO persons (
                id, name, last_name, national_code, birth_date, birth_place,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(person.id.to_string())
        .bind(&person.name)
        .bind(&person.last_name)
        .bind(person.national_code.as_ref().map(NationalCode::as_str))
        .bind(person.birth_date)
        .bind(&person.birth_place)
        .bind(person.created_at)
        .bind(person.updated_at)
        .execute(conn)
        .await
        .map_err(write_error)?;
        Ok(())
    }

    async fn insert_contact(conn: &mut MySqlConnection, contact: &Contact) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO contacts (
                id, owner_kind, owner_id, email, mobile, telephone, address,
                postal_code, created_at, updated_at, deleted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(contact.id.to_string())
        .bind(contact.owner.kind.as_str())
        .bind(contact.owner.id.to_string())
        .bind(&contact.email)
        .bind(&contact.mobile)
        .bind(&contact.telephone)
        .bind(&contact.address)
        .bind(&contact.postal_code)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .bind(contact.deleted_at)
        .execute(conn)
        .await
        .map_err(write_error)?;
        Ok(())
    }

    async fn insert_customer(
        conn: &mut MySqlConnection,
        customer: &Customer,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                id, contact_id, owner_kind, owner_id, password_hash, is_active,
                email_verify, mobile_verify, total_credit, last_login,
                created_at, updated_at, deleted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer.id.to_string())
        .bind(customer.contact_id.to_string())
        .bind(customer.owner.kind.as_str())
        .bind(customer.owner.id.to_string())
        .bind(&customer.password_hash)
        .bind(customer.is_active)
        .bind(customer.email_verify)
        .bind(customer.mobile_verify)
        .bind(customer.total_credit)
        .bind(customer.last_login)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .bind(customer.deleted_at)
        .execute(conn)
        .await
        .map_err(write_error)?;
        Ok(())
    }

    /// Returns the assigned sequence
    async fn insert_change_request(
        conn: &mut MySqlConnection,
        change: &ChangeRequest,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO change_requests (
                id, customer_id, channel, old_value, new_value, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(change.id.to_string())
        .bind(change.customer_id.to_string())
        .bind(change.channel.as_str())
        .bind(&change.old_value)
        .bind(&change.new_value)
        .bind(change.created_at)
        .execute(conn)
        .await
        .map_err(write_error)?;
        Ok(result.last_insert_id())
    }

    async fn write_contact(conn: &mut MySqlConnection, contact: &Contact) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE contacts SET
                email = ?, mobile = ?, telephone = ?, address = ?,
                postal_code = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&contact.email)
        .bind(&contact.mobile)
        .bind(&contact.telephone)
        .bind(&contact.address)
        .bind(&contact.postal_code)
        .bind(contact.updated_at)
        .bind(contact.id.to_string())
        .execute(conn)
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("contact"));
        }
        Ok(())
    }

    async fn write_customer(
        conn: &mut MySqlConnection,
        customer: &Customer,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                password_hash = ?, is_active = ?, email_verify = ?,
                mobile_verify = ?, total_credit = ?, last_login = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&customer.password_hash)
        .bind(customer.is_active)
        .bind(customer.email_verify)
        .bind(customer.mobile_verify)
        .bind(customer.total_credit)
        .bind(customer.last_login)
        .bind(customer.updated_at)
        .bind(customer.id.to_string())
        .execute(conn)
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("customer"));
        }
        Ok(())
    }

    async fn write_change_request(
        conn: &mut MySqlConnection,
        change: &ChangeRequest,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE change_requests SET old_value = ?, new_value = ? WHERE id = ?")
            .bind(&change.old_value)
            .bind(&change.new_value)
            .bind(change.id.to_string())
            .execute(conn)
            .await
            .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("change request"));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MySqlIdentityStore {
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, DomainError> {
        self.find_contact_where("email", email).await
    }

    async fn find_contact_by_mobile(&self, mobile: &str) -> Result<Option<Contact>, DomainError> {
        self.find_contact_where("mobile", mobile).await
    }

    async fn find_person_by_national_code(
        &self,
        code: &NationalCode,
    ) -> Result<Option<Person>, DomainError> {
        let query = format!(
            "SELECT {} FROM persons WHERE national_code = ? LIMIT 1",
            PERSON_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(person_from_row).transpose()
    }

    async fn find_contact(&self, id: Uuid) -> Result<Option<Contact>, DomainError> {
        self.find_contact_where("id", &id.to_string()).await
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let query = format!(
            "SELECT {} FROM customers WHERE id = ? AND deleted_at IS NULL LIMIT 1",
            CUSTOMER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(customer_from_row).transpose()
    }

    async fn find_customer_by_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Option<Customer>, DomainError> {
        let query = format!(
            "SELECT {} FROM customers WHERE contact_id = ? AND deleted_at IS NULL LIMIT 1",
            CUSTOMER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(contact_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(customer_from_row).transpose()
    }

    async fn find_owner(&self, owner: OwnerRef) -> Result<Option<Owner>, DomainError> {
        match owner.kind {
            OwnerKind::Person => {
                let query = format!("SELECT {} FROM persons WHERE id = ?", PERSON_COLUMNS);
                let row = sqlx::query(&query)
                    .bind(owner.id.to_string())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(query_error)?;
                Ok(row.as_ref().map(person_from_row).transpose()?.map(Owner::Person))
            }
            OwnerKind::Company => {
                let query = format!("SELECT {} FROM companies WHERE id = ?", COMPANY_COLUMNS);
                let row = sqlx::query(&query)
                    .bind(owner.id.to_string())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(query_error)?;
                Ok(row.as_ref().map(company_from_row).transpose()?.map(Owner::Company))
            }
        }
    }

    async fn create_registration(
        &self,
        mut bundle: RegistrationBundle,
    ) -> Result<RegistrationBundle, DomainError> {
        let mut tx = self.pool.begin().await.map_err(query_error)?;

        // a unique violation anywhere drops `tx`, rolling back every insert
        Self::insert_person(&mut tx, &bundle.person).await?;
        Self::insert_contact(&mut tx, &bundle.contact).await?;
        Self::insert_customer(&mut tx, &bundle.customer).await?;
        bundle.email_change.sequence = Self::insert_change_request(&mut tx, &bundle.email_change).await?;
        bundle.mobile_change.sequence =
            Self::insert_change_request(&mut tx, &bundle.mobile_change).await?;

        tx.commit().await.map_err(write_error)?;
        Ok(bundle)
    }

    async fn update_contact(&self, contact: &Contact) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(query_error)?;
        Self::write_contact(&mut conn, contact).await
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(query_error)?;
        Self::write_customer(&mut conn, customer).await
    }

    async fn update_person(&self, person: &Person) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE persons SET
                name = ?, last_name = ?, national_code = ?, birth_date = ?,
                birth_place = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&person.name)
        .bind(&person.last_name)
        .bind(person.national_code.as_ref().map(NationalCode::as_str))
        .bind(person.birth_date)
        .bind(&person.birth_place)
        .bind(person.updated_at)
        .bind(person.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("person"));
        }
        Ok(())
    }

    async fn soft_delete_customer(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(query_error)?;

        let contact_id: Option<String> = sqlx::query_scalar(
            "SELECT contact_id FROM customers WHERE id = ? AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_error)?;

        let Some(contact_id) = contact_id else {
            return Ok(false);
        };

        sqlx::query("UPDATE customers SET deleted_at = ? WHERE id = ?")
            .bind(at)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;
        sqlx::query("UPDATE contacts SET deleted_at = ? WHERE id = ?")
            .bind(at)
            .bind(contact_id)
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;

        tx.commit().await.map_err(write_error)?;
        tracing::info!(event = "customer_soft_deleted", customer_id = %id, "Customer soft-deleted");
        Ok(true)
    }

    async fn latest_change_request(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Option<ChangeRequest>, DomainError> {
        let query = format!(
            "SELECT {} FROM change_requests WHERE customer_id = ? AND channel = ? \
             ORDER BY created_at DESC, sequence DESC LIMIT 1",
            CHANGE_REQUEST_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(customer_id.to_string())
            .bind(channel.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(change_request_from_row).transpose()
    }

    async fn update_change_request(&self, change: &ChangeRequest) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(query_error)?;
        Self::write_change_request(&mut conn, change).await
    }

    async fn record_pending_change(
        &self,
        pending: PendingChange,
    ) -> Result<ChangeRequest, DomainError> {
        let mut tx = self.pool.begin().await.map_err(query_error)?;

        let mut change = pending.change;
        let query = format!(
            "UPDATE customers SET {} = NULL, is_active = FALSE, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
            verify_column(change.channel)
        );
        let reset = sqlx::query(&query)
            .bind(pending.reset_at)
            .bind(change.customer_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;
        if reset.rows_affected() == 0 {
            return Err(DomainError::not_found("customer"));
        }
        change.sequence = Self::insert_change_request(&mut tx, &change).await?;

        tx.commit().await.map_err(write_error)?;
        Ok(change)
    }

    async fn create_ticket(
        &self,
        mut ticket: VerificationTicket,
    ) -> Result<VerificationTicket, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO verification_tickets (
                id, customer_id, channel, target, code, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ticket.id.to_string())
        .bind(ticket.customer_id.to_string())
        .bind(ticket.channel.as_str())
        .bind(&ticket.target)
        .bind(ticket.code)
        .bind(ticket.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        ticket.sequence = result.last_insert_id();
        Ok(ticket)
    }

    async fn list_tickets(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Vec<VerificationTicket>, DomainError> {
        let query = format!(
            "SELECT {} FROM verification_tickets WHERE customer_id = ? AND channel = ? \
             ORDER BY created_at DESC, sequence DESC",
            TICKET_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(customer_id.to_string())
            .bind(channel.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn latest_ticket(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerificationTicket>, DomainError> {
        let query = format!(
            "SELECT {} FROM verification_tickets WHERE customer_id = ? AND channel = ? \
             ORDER BY created_at DESC, sequence DESC LIMIT 1",
            TICKET_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(customer_id.to_string())
            .bind(channel.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<Customer, DomainError> {
        let mut tx = self.pool.begin().await.map_err(query_error)?;
        let customer_id = commit.customer_id.to_string();

        // consuming the ticket row first serializes racing confirmations
        let consumed = sqlx::query("DELETE FROM verification_tickets WHERE id = ?")
            .bind(commit.consumed_ticket.to_string())
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;
        if consumed.rows_affected() == 0 {
            return Err(VerificationError::TicketNotFound.into());
        }

        sqlx::query("DELETE FROM verification_tickets WHERE customer_id = ? AND channel = ?")
            .bind(&customer_id)
            .bind(commit.channel.as_str())
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;

        // only this channel's columns; a concurrent confirmation of the other
        // channel keeps its own writes
        let query = format!(
            "UPDATE customers SET {} = ?, is_active = TRUE, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
            verify_column(commit.channel)
        );
        let verified = sqlx::query(&query)
            .bind(commit.verified_at)
            .bind(commit.verified_at)
            .bind(&customer_id)
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;
        if verified.rows_affected() == 0 {
            return Err(DomainError::not_found("customer"));
        }

        if let Some(value) = &commit.confirmed_value {
            let query = format!(
                "UPDATE contacts SET {} = ?, updated_at = ? \
                 WHERE id = (SELECT contact_id FROM customers WHERE id = ?)",
                contact_column(commit.channel)
            );
            sqlx::query(&query)
                .bind(value)
                .bind(commit.verified_at)
                .bind(&customer_id)
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }
        if let Some(change) = &commit.completed_change {
            Self::write_change_request(&mut tx, change).await?;
        }

        let query = format!("SELECT {} FROM customers WHERE id = ?", CUSTOMER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(&customer_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(query_error)?;
        let customer = customer_from_row(&row)?;

        tx.commit().await.map_err(write_error)?;
        Ok(customer)
    }
}
