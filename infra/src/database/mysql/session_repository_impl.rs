//! MySQL implementation of the SessionRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use nl_core::domain::entities::session::{TerminationReason, UserSession};
use nl_core::errors::DomainError;
use nl_core::repositories::SessionRepository;

use super::{get, get_optional_enum, get_uuid};
use crate::database::map_sqlx_error;

const SESSION_COLUMNS: &str = "id, user_id, token_hash, previous_token_hash, ip_address, user_agent, \
     device_fingerprint, created_at, last_activity_at, last_rotated_at, expires_at, is_active, \
     terminated_at, termination_reason, anomaly_count";

/// MySQL implementation of SessionRepository
pub struct MySqlSessionRepository {
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: &MySqlRow) -> Result<UserSession, DomainError> {
        Ok(UserSession {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            token_hash: get(row, "token_hash")?,
            previous_token_hash: get(row, "previous_token_hash")?,
            ip_address: get(row, "ip_address")?,
            user_agent: get(row, "user_agent")?,
            device_fingerprint: get(row, "device_fingerprint")?,
            created_at: get(row, "created_at")?,
            last_activity_at: get(row, "last_activity_at")?,
            last_rotated_at: get(row, "last_rotated_at")?,
            expires_at: get(row, "expires_at")?,
            is_active: get(row, "is_active")?,
            terminated_at: get(row, "terminated_at")?,
            termination_reason: get_optional_enum(row, "termination_reason")?,
            anomaly_count: get(row, "anomaly_count")?,
        })
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn create(&self, session: UserSession) -> Result<UserSession, DomainError> {
        let query = format!(
            "INSERT INTO user_sessions ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            SESSION_COLUMNS
        );

        sqlx::query(&query)
            .bind(session.id.to_string())
            .bind(session.user_id.to_string())
            .bind(&session.token_hash)
            .bind(&session.previous_token_hash)
            .bind(&session.ip_address)
            .bind(&session.user_agent)
            .bind(&session.device_fingerprint)
            .bind(session.created_at)
            .bind(session.last_activity_at)
            .bind(session.last_rotated_at)
            .bind(session.expires_at)
            .bind(session.is_active)
            .bind(session.terminated_at)
            .bind(session.termination_reason.map(|r| r.as_str()))
            .bind(session.anomaly_count)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create session", e))?;

        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserSession>, DomainError> {
        let query = format!("SELECT {} FROM user_sessions WHERE id = ? LIMIT 1", SESSION_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find session", e))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn update(&self, session: UserSession) -> Result<UserSession, DomainError> {
        let query = r#"
            UPDATE user_sessions
            SET token_hash = ?, previous_token_hash = ?, ip_address = ?, user_agent = ?,
                device_fingerprint = ?, last_activity_at = ?, last_rotated_at = ?,
                expires_at = ?, is_active = ?, terminated_at = ?, termination_reason = ?,
                anomaly_count = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&session.token_hash)
            .bind(&session.previous_token_hash)
            .bind(&session.ip_address)
            .bind(&session.user_agent)
            .bind(&session.device_fingerprint)
            .bind(session.last_activity_at)
            .bind(session.last_rotated_at)
            .bind(session.expires_at)
            .bind(session.is_active)
            .bind(session.terminated_at)
            .bind(session.termination_reason.map(|r| r.as_str()))
            .bind(session.anomaly_count)
            .bind(session.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update session", e))?;

        if result.rows_affected() == 0 && self.find_by_id(session.id).await?.is_none() {
            return Err(DomainError::not_found("Session"));
        }

        Ok(session)
    }

    async fn update_if_token(&self, session: &UserSession, expected_token_hash: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE user_sessions
            SET token_hash = ?, previous_token_hash = ?, ip_address = ?, user_agent = ?,
                device_fingerprint = ?, last_activity_at = ?, last_rotated_at = ?,
                anomaly_count = ?
            WHERE id = ? AND token_hash = ? AND is_active = TRUE
        "#;

        let result = sqlx::query(query)
            .bind(&session.token_hash)
            .bind(&session.previous_token_hash)
            .bind(&session.ip_address)
            .bind(&session.user_agent)
            .bind(&session.device_fingerprint)
            .bind(session.last_activity_at)
            .bind(session.last_rotated_at)
            .bind(session.anomaly_count)
            .bind(session.id.to_string())
            .bind(expected_token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update session", e))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        match self.find_by_id(session.id).await? {
            Some(_) => Ok(false),
            None => Err(DomainError::not_found("Session")),
        }
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<UserSession>, DomainError> {
        let query = format!(
            "SELECT {} FROM user_sessions WHERE user_id = ? AND is_active = TRUE ORDER BY last_activity_at DESC",
            SESSION_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list sessions", e))?;

        rows.iter().map(Self::row_to_session).collect()
    }

    async fn count_active_by_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_sessions WHERE user_id = ? AND is_active = TRUE")
                .bind(user_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("count sessions", e))?;

        Ok(row.0.max(0) as u64)
    }

    async fn deactivate_for_user(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
        reason: TerminationReason,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE user_sessions
            SET is_active = FALSE, terminated_at = ?, termination_reason = ?
            WHERE user_id = ? AND is_active = TRUE AND (? IS NULL OR id <> ?)
        "#;

        let except = except.map(|id| id.to_string());
        let result = sqlx::query(query)
            .bind(at)
            .bind(reason.as_str())
            .bind(user_id.to_string())
            .bind(&except)
            .bind(&except)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("deactivate sessions", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn deactivate_stale(&self, idle_cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin session cleanup", e))?;

        let expired = sqlx::query(
            r#"
            UPDATE user_sessions
            SET is_active = FALSE, terminated_at = ?, termination_reason = ?
            WHERE is_active = TRUE AND expires_at <= ?
            "#,
        )
        .bind(now)
        .bind(TerminationReason::Expired.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("expire sessions", e))?;

        let idle = sqlx::query(
            r#"
            UPDATE user_sessions
            SET is_active = FALSE, terminated_at = ?, termination_reason = ?
            WHERE is_active = TRUE AND last_activity_at < ?
            "#,
        )
        .bind(now)
        .bind(TerminationReason::IdleTimeout.as_str())
        .bind(idle_cutoff)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("time out idle sessions", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit session cleanup", e))?;

        Ok((expired.rows_affected() + idle.rows_affected()) as usize)
    }

    async fn purge_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE is_active = FALSE AND terminated_at < ?")
                .bind(cutoff)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("purge sessions", e))?;

        Ok(result.rows_affected() as usize)
    }
}
