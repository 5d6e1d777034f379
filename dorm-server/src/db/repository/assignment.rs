//! Assignment Repository
//!
//! Read-side queries over the assignment table. All writes go through the
//! commit protocol in [`crate::occupancy::commit`], never through ad hoc
//! updates here.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Assignment;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct AssignmentRepository {
    base: BaseRepository,
}

impl AssignmentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All live assignments for a period
    pub async fn find_by_period(&self, period_key: &str) -> RepoResult<Vec<Assignment>> {
        let assignments: Vec<Assignment> = self
            .base
            .db()
            .query("SELECT * FROM assignment WHERE period_key = $period_key AND is_archived = false")
            .bind(("period_key", period_key.to_string()))
            .await?
            .take(0)?;
        Ok(assignments)
    }

    /// Live assignments for a period restricted to one building group's rooms
    pub async fn find_by_group_and_period(
        &self,
        group_id: &str,
        period_key: &str,
    ) -> RepoResult<Vec<Assignment>> {
        let group: RecordId = group_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid group ID: {}", group_id)))?;
        let assignments: Vec<Assignment> = self
            .base
            .db()
            .query(
                "SELECT * FROM assignment WHERE period_key = $period_key AND is_archived = false AND room.group = $group",
            )
            .bind(("period_key", period_key.to_string()))
            .bind(("group", group))
            .await?
            .take(0)?;
        Ok(assignments)
    }
}
