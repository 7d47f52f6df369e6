//! PostgreSQL implementation of the registration store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use super::models::{EventRow, UserRow};
use super::{Admission, RegistrationStore, StoreError, StoreResult};
use crate::config::RegistryConfig;
use crate::domain::{Event, EventId, EventWithRoster, NewEvent, RosterEntry, User, UserId};

/// Name of the trigger-raised constraint guarding event capacity.
const CAPACITY_CONSTRAINT: &str = "registrations_capacity";

/// SQLSTATE codes that indicate contention or a server-side timeout.
const TRANSIENT_SQLSTATES: [&str; 4] = [
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
    "57014", // query_canceled (statement_timeout)
];

const EVENT_COLUMNS: &str = "id, title, date_time, location, capacity";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from configuration.
    ///
    /// Every pooled connection gets the configured `statement_timeout` so
    /// a stuck query surfaces as a transient failure rather than hanging.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the URL is invalid or the database is
    /// unreachable.
    pub async fn connect(config: &RegistryConfig) -> StoreResult<Self> {
        let options: PgConnectOptions = config
            .database_url
            .parse()
            .map_err(|e: sqlx::Error| StoreError::Database(e.to_string()))?;
        let options = options.options([(
            "statement_timeout",
            config.database_statement_timeout_ms.to_string(),
        )]);

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations from `./migrations`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("migration failed: {e}")))
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_roster(&self, event_id: EventId) -> StoreResult<Vec<RosterEntry>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.name, u.email FROM registrations r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.event_id = $1 ORDER BY r.created_at ASC, u.id ASC",
        )
        .bind(event_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RosterEntry::from).collect())
    }
}

#[async_trait]
impl RegistrationStore for PostgresStore {
    async fn create_event(&self, event: NewEvent) -> StoreResult<Event> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (title, date_time, location, capacity) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&event.title)
        .bind(event.date_time)
        .bind(&event.location)
        .bind(i32::try_from(event.capacity.get()).unwrap_or(i32::MAX))
        .fetch_one(&self.pool)
        .await?;

        Ok(event.with_id(EventId::new(id)))
    }

    async fn get_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    async fn get_event_with_roster(&self, id: EventId) -> StoreResult<Option<EventWithRoster>> {
        let Some(event) = self.get_event(id).await? else {
            return Ok(None);
        };
        let registrations = self.fetch_roster(id).await?;
        Ok(Some(EventWithRoster {
            event,
            registrations,
        }))
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> StoreResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE date_time > $1 \
             ORDER BY date_time ASC, location ASC, id ASC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| User {
            id: UserId::new(r.id),
            name: r.name,
            email: r.email,
        }))
    }

    async fn registration_exists(&self, event_id: EventId, user_id: UserId) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_registrations(&self, event_id: EventId) -> StoreResult<u32> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1",
        )
        .bind(event_id.get())
        .fetch_one(&self.pool)
        .await?;

        u32::try_from(count)
            .map_err(|_| StoreError::Database(format!("registration count {count} out of range")))
    }

    async fn admit_registration(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> StoreResult<Admission> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the event serialises every admission for it, across
        // all service instances, until this transaction ends.
        let capacity = sqlx::query_scalar::<_, i32>(
            "SELECT capacity FROM events WHERE id = $1 FOR UPDATE",
        )
        .bind(event_id.get())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(capacity) = capacity else {
            tx.rollback().await?;
            return Ok(Admission::EventMissing);
        };

        let already = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .fetch_one(&mut *tx)
        .await?;

        if already {
            tx.rollback().await?;
            return Ok(Admission::Duplicate);
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1",
        )
        .bind(event_id.get())
        .fetch_one(&mut *tx)
        .await?;

        if count >= i64::from(capacity) {
            tx.rollback().await?;
            return Ok(Admission::Full);
        }

        let inserted = sqlx::query(
            "INSERT INTO registrations (event_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(result) if result.rows_affected() == 0 => {
                tx.rollback().await?;
                Ok(Admission::Duplicate)
            }
            Ok(_) => match tx.commit().await {
                Ok(()) => Ok(Admission::Admitted),
                Err(e) => constraint_admission(&e).ok_or_else(|| StoreError::from(e)),
            },
            Err(e) => constraint_admission(&e).ok_or_else(|| StoreError::from(e)),
        }
    }

    async fn delete_registration(&self, event_id: EventId, user_id: UserId) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM registrations WHERE event_id = $1 AND user_id = $2")
                .bind(event_id.get())
                .bind(user_id.get())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Maps a uniqueness or capacity constraint violation to the admission it
/// stands for. Returns `None` for any other error.
fn constraint_admission(err: &sqlx::Error) -> Option<Admission> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.is_unique_violation() {
        return Some(Admission::Duplicate);
    }
    if db_err.is_check_violation() && db_err.constraint() == Some(CAPACITY_CONSTRAINT) {
        return Some(Admission::Full);
    }
    None
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let transient = match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_) => true,
            sqlx::Error::Database(db_err) => db_err
                .code()
                .is_some_and(|code| TRANSIENT_SQLSTATES.iter().any(|s| code == *s)),
            _ => false,
        };

        if transient {
            Self::Transient(err.to_string())
        } else {
            Self::Database(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_transient() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Transient(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Transient(_)
        ));
    }

    #[test]
    fn io_error_is_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(matches!(
            StoreError::from(sqlx::Error::Io(io)),
            StoreError::Transient(_)
        ));
    }

    #[test]
    fn row_not_found_is_database_error() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }

    #[test]
    fn non_database_errors_are_not_admissions() {
        assert_eq!(constraint_admission(&sqlx::Error::PoolTimedOut), None);
    }
}
