use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{LocalDeliveryUnit, ProbationTeam};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let unique = e
            .as_database_error()
            .map(|d| matches!(d.kind(), sqlx::error::ErrorKind::UniqueViolation))
            .unwrap_or(false);
        if unique {
            StoreError::Duplicate(e.to_string())
        } else {
            StoreError::Sqlx(e)
        }
    }
}

/// Persistence seam for LDU aggregates. The service only sees this trait;
/// tests substitute an in-memory implementation.
#[async_trait]
pub trait LduStore: Send + Sync {
    /// Distinct probation area codes, sorted ascending.
    async fn probation_area_codes(&self) -> Result<Vec<String>, StoreError>;

    async fn find_all(&self) -> Result<Vec<LocalDeliveryUnit>, StoreError>;

    async fn find_by_probation_area_code(
        &self,
        probation_area_code: &str,
    ) -> Result<Vec<LocalDeliveryUnit>, StoreError>;

    async fn find_by_codes(
        &self,
        probation_area_code: &str,
        local_delivery_unit_code: &str,
    ) -> Result<Option<LocalDeliveryUnit>, StoreError>;

    /// Upsert the parent row and diff the team rows in one transaction.
    /// Audit columns are stamped here, attributed to `principal`.
    async fn save(&self, ldu: &LocalDeliveryUnit, principal: &str) -> Result<(), StoreError>;

    /// Remove the whole aggregate; team rows go with it via cascade.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, FromRow)]
struct LduRow {
    local_delivery_unit_id: Uuid,
    probation_area_code: String,
    local_delivery_unit_code: String,
    functional_mailbox: Option<String>,
    create_date_time: DateTime<Utc>,
    create_user_id: String,
    modify_date_time: Option<DateTime<Utc>>,
    modify_user_id: Option<String>,
}

impl LduRow {
    fn into_ldu(self, probation_teams: BTreeMap<String, ProbationTeam>) -> LocalDeliveryUnit {
        LocalDeliveryUnit {
            id: self.local_delivery_unit_id,
            probation_area_code: self.probation_area_code,
            local_delivery_unit_code: self.local_delivery_unit_code,
            functional_mailbox: self.functional_mailbox,
            probation_teams,
            create_date_time: Some(self.create_date_time),
            create_user_id: Some(self.create_user_id),
            modify_date_time: self.modify_date_time,
            modify_user_id: self.modify_user_id,
        }
    }
}

const SELECT_LDU: &str = "SELECT local_delivery_unit_id, probation_area_code, \
     local_delivery_unit_code, functional_mailbox, create_date_time, \
     create_user_id, modify_date_time, modify_user_id FROM local_delivery_unit";

pub struct PgLduStore {
    pool: PgPool,
}

impl PgLduStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the team rows for a set of parent ids and group them per parent.
    async fn teams_for(
        &self,
        ids: &[Uuid],
    ) -> Result<BTreeMap<Uuid, BTreeMap<String, ProbationTeam>>, StoreError> {
        let mut grouped: BTreeMap<Uuid, BTreeMap<String, ProbationTeam>> = BTreeMap::new();
        if ids.is_empty() {
            return Ok(grouped);
        }

        let rows: Vec<(Uuid, String, String)> = sqlx::query_as(
            "SELECT local_delivery_unit_id, team_code, functional_mailbox \
             FROM probation_team WHERE local_delivery_unit_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        for (id, team_code, functional_mailbox) in rows {
            grouped
                .entry(id)
                .or_default()
                .insert(team_code, ProbationTeam { functional_mailbox });
        }
        Ok(grouped)
    }

    fn assemble(
        rows: Vec<LduRow>,
        mut teams: BTreeMap<Uuid, BTreeMap<String, ProbationTeam>>,
    ) -> Vec<LocalDeliveryUnit> {
        rows.into_iter()
            .map(|row| {
                let owned = teams.remove(&row.local_delivery_unit_id).unwrap_or_default();
                row.into_ldu(owned)
            })
            .collect()
    }
}

#[async_trait]
impl LduStore for PgLduStore {
    async fn probation_area_codes(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT probation_area_code FROM local_delivery_unit \
             ORDER BY probation_area_code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(code,)| code).collect())
    }

    async fn find_all(&self) -> Result<Vec<LocalDeliveryUnit>, StoreError> {
        let sql = format!("{SELECT_LDU} ORDER BY probation_area_code, local_delivery_unit_code");
        let rows: Vec<LduRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.local_delivery_unit_id).collect();
        let teams = self.teams_for(&ids).await?;
        Ok(Self::assemble(rows, teams))
    }

    async fn find_by_probation_area_code(
        &self,
        probation_area_code: &str,
    ) -> Result<Vec<LocalDeliveryUnit>, StoreError> {
        let sql = format!(
            "{SELECT_LDU} WHERE probation_area_code = $1 ORDER BY local_delivery_unit_code"
        );
        let rows: Vec<LduRow> = sqlx::query_as(&sql)
            .bind(probation_area_code)
            .fetch_all(&self.pool)
            .await?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.local_delivery_unit_id).collect();
        let teams = self.teams_for(&ids).await?;
        Ok(Self::assemble(rows, teams))
    }

    async fn find_by_codes(
        &self,
        probation_area_code: &str,
        local_delivery_unit_code: &str,
    ) -> Result<Option<LocalDeliveryUnit>, StoreError> {
        let sql = format!(
            "{SELECT_LDU} WHERE probation_area_code = $1 AND local_delivery_unit_code = $2"
        );
        let row: Option<LduRow> = sqlx::query_as(&sql)
            .bind(probation_area_code)
            .bind(local_delivery_unit_code)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let ids = [row.local_delivery_unit_id];
                let mut teams = self.teams_for(&ids).await?;
                let owned = teams.remove(&row.local_delivery_unit_id).unwrap_or_default();
                Ok(Some(row.into_ldu(owned)))
            }
        }
    }

    async fn save(&self, ldu: &LocalDeliveryUnit, principal: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Upsert on the business key: concurrent creators converge on one row
        // instead of one of them failing the transaction.
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO local_delivery_unit \
             (local_delivery_unit_id, probation_area_code, local_delivery_unit_code, \
              functional_mailbox, create_date_time, create_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (probation_area_code, local_delivery_unit_code) DO UPDATE \
             SET functional_mailbox = EXCLUDED.functional_mailbox, \
                 modify_date_time = EXCLUDED.create_date_time, \
                 modify_user_id = EXCLUDED.create_user_id \
             RETURNING local_delivery_unit_id",
        )
        .bind(ldu.id)
        .bind(&ldu.probation_area_code)
        .bind(&ldu.local_delivery_unit_code)
        .bind(&ldu.functional_mailbox)
        .bind(now)
        .bind(principal)
        .fetch_one(&mut *tx)
        .await?;

        // Team diff: drop rows no longer present, then upsert the rest.
        let team_codes: Vec<String> = ldu.probation_teams.keys().cloned().collect();
        sqlx::query(
            "DELETE FROM probation_team \
             WHERE local_delivery_unit_id = $1 AND NOT (team_code = ANY($2))",
        )
        .bind(id)
        .bind(&team_codes)
        .execute(&mut *tx)
        .await?;

        for (team_code, team) in &ldu.probation_teams {
            sqlx::query(
                "INSERT INTO probation_team (local_delivery_unit_id, team_code, functional_mailbox) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (local_delivery_unit_id, team_code) DO UPDATE \
                 SET functional_mailbox = EXCLUDED.functional_mailbox",
            )
            .bind(id)
            .bind(team_code)
            .bind(&team.functional_mailbox)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM local_delivery_unit WHERE local_delivery_unit_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
