//! Academic Period Repository
//!
//! Exactly one period is active system-wide. Activating another period is
//! the rollover: every assignment of the outgoing period is archived and
//! all room occupancy counters reset, in one transaction.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{AcademicPeriod, AcademicPeriodCreate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct AcademicPeriodRepository {
    base: BaseRepository,
}

impl AcademicPeriodRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// List all periods, newest school year first
    pub async fn find_all(&self) -> RepoResult<Vec<AcademicPeriod>> {
        let periods: Vec<AcademicPeriod> = self
            .base
            .db()
            .query("SELECT * FROM academic_period ORDER BY school_year DESC, term")
            .await?
            .take(0)?;
        Ok(periods)
    }

    /// Find period by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<AcademicPeriod>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let period: Option<AcademicPeriod> = self.base.db().select(thing).await?;
        Ok(period)
    }

    /// Find period by stable key
    pub async fn find_by_key(&self, period_key: &str) -> RepoResult<Option<AcademicPeriod>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM academic_period WHERE period_key = $key LIMIT 1")
            .bind(("key", period_key.to_string()))
            .await?;
        let periods: Vec<AcademicPeriod> = result.take(0)?;
        Ok(periods.into_iter().next())
    }

    /// The currently active period
    pub async fn find_active(&self) -> RepoResult<Option<AcademicPeriod>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM academic_period WHERE is_active = true LIMIT 1")
            .await?;
        let periods: Vec<AcademicPeriod> = result.take(0)?;
        Ok(periods.into_iter().next())
    }

    /// The currently active period, or a validation error when none is set
    pub async fn require_active(&self) -> RepoResult<AcademicPeriod> {
        self.find_active().await?.ok_or_else(|| {
            RepoError::Validation("No active academic period is configured".into())
        })
    }

    /// Create a new period (inactive until explicitly activated)
    pub async fn create(&self, data: AcademicPeriodCreate) -> RepoResult<AcademicPeriod> {
        let period_key = AcademicPeriod::make_key(&data.school_year, &data.term);
        if self.find_by_key(&period_key).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Academic period '{}' already exists",
                period_key
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE academic_period SET
                    school_year = $school_year,
                    term = $term,
                    period_key = $period_key,
                    is_active = false"#,
            )
            .bind(("school_year", data.school_year))
            .bind(("term", data.term))
            .bind(("period_key", period_key))
            .await?;
        let created: Vec<AcademicPeriod> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create academic period".to_string()))
    }

    /// Activate a period, rolling the previous one over
    ///
    /// One transaction: deactivate every other period, archive all
    /// assignments that are not already archived, reset room occupancy
    /// counters, then activate the target.
    pub async fn activate(&self, id: &str) -> RepoResult<AcademicPeriod> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let target = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Academic period {} not found", id)))?;

        if target.is_active {
            return Ok(target);
        }

        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE academic_period SET is_active = false WHERE is_active = true;
                UPDATE assignment SET is_archived = true, version += 1 WHERE is_archived = false;
                UPDATE room SET occupied = 0, version += 1 WHERE occupied != 0;
                UPDATE $thing SET is_active = true;
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", thing))
            .await?;

        tracing::info!(period = %target.period_key, "Academic period activated, previous assignments archived");

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Academic period {} not found", id)))
    }
}
