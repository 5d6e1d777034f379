//! Staff Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Staff, StaffCreate, StaffRole, StaffUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct StaffRepository {
    base: BaseRepository,
}

impl StaffRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active staff accounts
    pub async fn find_all(&self) -> RepoResult<Vec<Staff>> {
        let staff: Vec<Staff> = self
            .base
            .db()
            .query("SELECT * FROM staff ORDER BY username")
            .await?
            .take(0)?;
        Ok(staff)
    }

    /// Find staff by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Staff>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let staff: Option<Staff> = self.base.db().select(thing).await?;
        Ok(staff)
    }

    /// Find staff by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<Staff>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM staff WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let staff: Vec<Staff> = result.take(0)?;
        Ok(staff.into_iter().next())
    }

    /// Provision a new staff account
    pub async fn create(&self, data: StaffCreate) -> RepoResult<Staff> {
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        if data.role == StaffRole::Manager && data.building_group.is_none() {
            return Err(RepoError::Validation(
                "Manager accounts must be assigned a building group".into(),
            ));
        }

        let hash_pass = Staff::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let display_name = data.display_name.unwrap_or_else(|| data.username.clone());

        // hash_pass 带 skip_serializing，content 写入会丢字段，必须显式 bind
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE staff SET
                    username = $username,
                    display_name = $display_name,
                    hash_pass = $hash_pass,
                    role = $role,
                    building_group = $building_group,
                    is_system = false,
                    is_active = true"#,
            )
            .bind(("username", data.username))
            .bind(("display_name", display_name))
            .bind(("hash_pass", hash_pass))
            .bind(("role", data.role))
            .bind(("building_group", data.building_group))
            .await?;
        let created: Vec<Staff> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create staff account".to_string()))
    }

    /// Update a staff account
    pub async fn update(&self, id: &str, data: StaffUpdate) -> RepoResult<Staff> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Staff {} not found", id)))?;

        // System accounts can only change their password
        if existing.is_system
            && (data.username.is_some()
                || data.display_name.is_some()
                || data.building_group.is_some()
                || data.is_active.is_some())
        {
            return Err(RepoError::Validation(
                "System account can only change password".to_string(),
            ));
        }

        if let Some(ref new_username) = data.username
            && new_username != &existing.username
            && self.find_by_username(new_username).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                new_username
            )));
        }

        let hash_pass = match data.password {
            Some(ref password) => Staff::hash_password(password)
                .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?,
            None => existing.hash_pass.clone(),
        };

        let username = data.username.unwrap_or(existing.username);
        let display_name = data.display_name.unwrap_or(existing.display_name);
        let building_group = data.building_group.or(existing.building_group);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        self.base
            .db()
            .query(
                r#"UPDATE $thing SET
                    username = $username,
                    display_name = $display_name,
                    hash_pass = $hash_pass,
                    building_group = $building_group,
                    is_active = $is_active"#,
            )
            .bind(("thing", thing))
            .bind(("username", username))
            .bind(("display_name", display_name))
            .bind(("hash_pass", hash_pass))
            .bind(("building_group", building_group))
            .bind(("is_active", is_active))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Staff {} not found", id)))
    }

    /// Deactivate a staff account (soft delete; system accounts protected)
    pub async fn deactivate(&self, id: &str) -> RepoResult<bool> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Staff {} not found", id)))?;

        if existing.is_system {
            return Err(RepoError::Validation(
                "System account cannot be deactivated".into(),
            ));
        }

        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        self.base
            .db()
            .query("UPDATE $thing SET is_active = false")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Ensure the bootstrap admin account exists
    ///
    /// Called once at startup. Creates the system admin when the staff table
    /// is empty; the password comes from configuration.
    pub async fn ensure_system_admin(&self, username: &str, password: &str) -> RepoResult<()> {
        if self.find_by_username(username).await?.is_some() {
            return Ok(());
        }

        let hash_pass = Staff::hash_password(password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE staff SET
                    username = $username,
                    display_name = 'System Administrator',
                    hash_pass = $hash_pass,
                    role = 'admin',
                    building_group = NONE,
                    is_system = true,
                    is_active = true"#,
            )
            .bind(("username", username.to_string()))
            .bind(("hash_pass", hash_pass))
            .await?;
        let _: Vec<Staff> = result.take(0)?;
        tracing::info!(username = %username, "Bootstrap admin account created");
        Ok(())
    }
}
