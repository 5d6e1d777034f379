//! Room Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Room, RoomCreate, RoomUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct RoomRepository {
    base: BaseRepository,
}

impl RoomRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active rooms
    pub async fn find_all(&self) -> RepoResult<Vec<Room>> {
        let rooms: Vec<Room> = self
            .base
            .db()
            .query("SELECT * FROM room WHERE is_active = true ORDER BY building, number")
            .await?
            .take(0)?;
        Ok(rooms)
    }

    /// Find all active rooms in a building group
    pub async fn find_by_group(&self, group_id: &str) -> RepoResult<Vec<Room>> {
        let group: RecordId = group_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid group ID: {}", group_id)))?;
        let rooms: Vec<Room> = self
            .base
            .db()
            .query("SELECT * FROM room WHERE group = $group AND is_active = true ORDER BY building, number")
            .bind(("group", group))
            .await?
            .take(0)?;
        Ok(rooms)
    }

    /// Find room by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Room>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let room: Option<Room> = self.base.db().select(thing).await?;
        Ok(room)
    }

    /// Find room by building code and number
    pub async fn find_by_number(&self, building: &str, number: &str) -> RepoResult<Option<Room>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM room WHERE building = $building AND number = $number LIMIT 1")
            .bind(("building", building.to_string()))
            .bind(("number", number.to_string()))
            .await?;
        let rooms: Vec<Room> = result.take(0)?;
        Ok(rooms.into_iter().next())
    }

    /// Create a new room
    ///
    /// Capacity must be positive — there is no fallback bed count.
    pub async fn create(&self, data: RoomCreate) -> RepoResult<Room> {
        if data.capacity <= 0 {
            return Err(RepoError::Validation(
                "Room capacity must be positive".into(),
            ));
        }

        if self
            .find_by_number(&data.building, &data.number)
            .await?
            .is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Room '{}-{}' already exists",
                data.building, data.number
            )));
        }

        // group 以 bind 传入，落库为原生 record link
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE room SET
                    number = $number,
                    building = $building,
                    group = $group,
                    capacity = $capacity,
                    occupied = 0,
                    version = 0,
                    is_active = true"#,
            )
            .bind(("number", data.number))
            .bind(("building", data.building))
            .bind(("group", data.group))
            .bind(("capacity", data.capacity))
            .await?;
        let created: Vec<Room> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create room".to_string()))
    }

    /// Update a room
    ///
    /// Capacity may not be lowered below the current occupancy.
    pub async fn update(&self, id: &str, data: RoomUpdate) -> RepoResult<Room> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Room {} not found", id)))?;

        if let Some(capacity) = data.capacity {
            if capacity <= 0 {
                return Err(RepoError::Validation(
                    "Room capacity must be positive".into(),
                ));
            }
            if capacity < existing.occupied {
                return Err(RepoError::Validation(format!(
                    "Capacity {} is below current occupancy {}",
                    capacity, existing.occupied
                )));
            }
        }

        if let Some(ref number) = data.number
            && number != &existing.number
            && self
                .find_by_number(&existing.building, number)
                .await?
                .is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Room '{}-{}' already exists",
                existing.building, number
            )));
        }

        let number = data.number.unwrap_or(existing.number);
        let capacity = data.capacity.unwrap_or(existing.capacity);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        self.base
            .db()
            .query("UPDATE $thing SET number = $number, capacity = $capacity, is_active = $is_active, version += 1")
            .bind(("thing", thing))
            .bind(("number", number))
            .bind(("capacity", capacity))
            .bind(("is_active", is_active))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Room {} not found", id)))
    }

    /// Delete a room
    ///
    /// Rejected while the room still has occupants.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Room {} not found", id)))?;

        if existing.occupied > 0 {
            return Err(RepoError::Validation(format!(
                "Cannot delete room '{}' with {} occupants",
                existing.label(),
                existing.occupied
            )));
        }

        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
