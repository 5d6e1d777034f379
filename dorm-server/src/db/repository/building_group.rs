//! Building Group Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{BuildingGroup, BuildingGroupCreate, BuildingGroupUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct BuildingGroupRepository {
    base: BaseRepository,
}

impl BuildingGroupRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active building groups
    pub async fn find_all(&self) -> RepoResult<Vec<BuildingGroup>> {
        let groups: Vec<BuildingGroup> = self
            .base
            .db()
            .query("SELECT * FROM building_group WHERE is_active = true ORDER BY title")
            .await?
            .take(0)?;
        Ok(groups)
    }

    /// Find group by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<BuildingGroup>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let group: Option<BuildingGroup> = self.base.db().select(thing).await?;
        Ok(group)
    }

    /// Find group by its stable key
    pub async fn find_by_key(&self, group_key: &str) -> RepoResult<Option<BuildingGroup>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM building_group WHERE group_key = $key LIMIT 1")
            .bind(("key", group_key.to_string()))
            .await?;
        let groups: Vec<BuildingGroup> = result.take(0)?;
        Ok(groups.into_iter().next())
    }

    /// Create a new building group
    pub async fn create(&self, data: BuildingGroupCreate) -> RepoResult<BuildingGroup> {
        if self.find_by_key(&data.group_key).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Building group key '{}' already exists",
                data.group_key
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE building_group SET
                    title = $title,
                    group_key = $group_key,
                    category = $category,
                    manager = NONE,
                    is_active = true"#,
            )
            .bind(("title", data.title))
            .bind(("group_key", data.group_key))
            .bind(("category", data.category))
            .await?;
        let created: Vec<BuildingGroup> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create building group".to_string()))
    }

    /// Update a building group
    pub async fn update(&self, id: &str, data: BuildingGroupUpdate) -> RepoResult<BuildingGroup> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Building group {} not found", id)))?;

        let title = data.title.unwrap_or(existing.title);
        let category = data.category.unwrap_or(existing.category);
        let manager = data.manager.or(existing.manager);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        self.base
            .db()
            .query("UPDATE $thing SET title = $title, category = $category, manager = $manager, is_active = $is_active")
            .bind(("thing", thing))
            .bind(("title", title))
            .bind(("category", category))
            .bind(("manager", manager))
            .bind(("is_active", is_active))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Building group {} not found", id)))
    }

    /// Delete a building group
    ///
    /// Rejected while the group still has active rooms.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        let mut result = self
            .base
            .db()
            .query("SELECT count() AS total FROM room WHERE group = $group AND is_active = true GROUP ALL")
            .bind(("group", thing.clone()))
            .await?;
        let counts: Vec<serde_json::Value> = result.take(0)?;
        let room_count = counts
            .first()
            .and_then(|v| v.get("total"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        if room_count > 0 {
            return Err(RepoError::Validation(
                "Cannot delete building group with active rooms".into(),
            ));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
