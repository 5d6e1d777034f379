//! Resident Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Resident, ResidentCreate, ResidentUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct ResidentRepository {
    base: BaseRepository,
}

impl ResidentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all non-archived residents
    pub async fn find_all(&self) -> RepoResult<Vec<Resident>> {
        let residents: Vec<Resident> = self
            .base
            .db()
            .query("SELECT * FROM resident WHERE is_archived = false ORDER BY last_name, first_name")
            .await?
            .take(0)?;
        Ok(residents)
    }

    /// Find all non-archived residents of a building group
    pub async fn find_by_group(&self, group_id: &str) -> RepoResult<Vec<Resident>> {
        let group: RecordId = group_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid group ID: {}", group_id)))?;
        let residents: Vec<Resident> = self
            .base
            .db()
            .query("SELECT * FROM resident WHERE group = $group AND is_archived = false ORDER BY last_name, first_name")
            .bind(("group", group))
            .await?
            .take(0)?;
        Ok(residents)
    }

    /// Find resident by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Resident>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let resident: Option<Resident> = self.base.db().select(thing).await?;
        Ok(resident)
    }

    /// Find resident by student id
    pub async fn find_by_student_id(&self, student_id: &str) -> RepoResult<Option<Resident>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM resident WHERE student_id = $student_id LIMIT 1")
            .bind(("student_id", student_id.to_string()))
            .await?;
        let residents: Vec<Resident> = result.take(0)?;
        Ok(residents.into_iter().next())
    }

    /// Register a new resident
    pub async fn create(&self, data: ResidentCreate) -> RepoResult<Resident> {
        if self.find_by_student_id(&data.student_id).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Student ID '{}' already registered",
                data.student_id
            )));
        }

        // group 以 bind 传入，落库为原生 record link
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE resident SET
                    student_id = $student_id,
                    first_name = $first_name,
                    last_name = $last_name,
                    course = $course,
                    year_level = $year_level,
                    contact_number = $contact_number,
                    email = $email,
                    home_address = $home_address,
                    emergency_contact_name = $emergency_contact_name,
                    emergency_contact_number = $emergency_contact_number,
                    group = $group,
                    school_year = $school_year,
                    term = $term,
                    is_archived = false"#,
            )
            .bind(("student_id", data.student_id))
            .bind(("first_name", data.first_name))
            .bind(("last_name", data.last_name))
            .bind(("course", data.course))
            .bind(("year_level", data.year_level))
            .bind(("contact_number", data.contact_number))
            .bind(("email", data.email))
            .bind(("home_address", data.home_address))
            .bind(("emergency_contact_name", data.emergency_contact_name))
            .bind(("emergency_contact_number", data.emergency_contact_number))
            .bind(("group", data.group))
            .bind(("school_year", data.school_year))
            .bind(("term", data.term))
            .await?;
        let created: Vec<Resident> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create resident".to_string()))
    }

    /// Update a resident
    pub async fn update(&self, id: &str, data: ResidentUpdate) -> RepoResult<Resident> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Resident {} not found", id)))?;

        self.base
            .db()
            .query(
                r#"UPDATE $thing SET
                    first_name = $first_name,
                    last_name = $last_name,
                    course = $course,
                    year_level = $year_level,
                    contact_number = $contact_number,
                    email = $email,
                    home_address = $home_address,
                    emergency_contact_name = $emergency_contact_name,
                    emergency_contact_number = $emergency_contact_number,
                    is_archived = $is_archived"#,
            )
            .bind(("thing", thing))
            .bind(("first_name", data.first_name.unwrap_or(existing.first_name)))
            .bind(("last_name", data.last_name.unwrap_or(existing.last_name)))
            .bind(("course", data.course.unwrap_or(existing.course)))
            .bind(("year_level", data.year_level.unwrap_or(existing.year_level)))
            .bind((
                "contact_number",
                data.contact_number.unwrap_or(existing.contact_number),
            ))
            .bind(("email", data.email.or(existing.email)))
            .bind(("home_address", data.home_address.unwrap_or(existing.home_address)))
            .bind((
                "emergency_contact_name",
                data.emergency_contact_name
                    .unwrap_or(existing.emergency_contact_name),
            ))
            .bind((
                "emergency_contact_number",
                data.emergency_contact_number
                    .unwrap_or(existing.emergency_contact_number),
            ))
            .bind(("is_archived", data.is_archived.unwrap_or(existing.is_archived)))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Resident {} not found", id)))
    }

    /// Archive a resident (soft delete)
    ///
    /// Also removes any assignment the resident holds in the given period,
    /// so the room's bed frees up.
    pub async fn archive(&self, id: &str, period_key: &str) -> RepoResult<bool> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Resident {} not found", id)))?;

        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE $thing SET is_archived = true;
                LET $link = (SELECT * FROM assignment WHERE student_id = $student_id AND period_key = $period_key AND is_archived = false);
                FOR $a IN $link {
                    UPDATE $a.room SET occupied -= 1, version += 1;
                    DELETE $a.id;
                };
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", thing))
            .bind(("student_id", existing.student_id))
            .bind(("period_key", period_key.to_string()))
            .await?;

        Ok(true)
    }
}
