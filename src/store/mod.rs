mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// `create_*` methods ignore the `id` of the record passed in and return the
/// id assigned by the database. Uniqueness violations (username, email,
/// appointment slot) surface as [`crate::error::Error::AlreadyExists`].
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<i64>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self, cursor: i64, limit: i32) -> Result<Vec<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn has_admin_user(&self) -> Result<bool>;

    // Pet operations
    fn create_pet(&self, pet: &Pet) -> Result<i64>;
    fn get_pet(&self, id: i64) -> Result<Option<Pet>>;
    fn list_pets(&self, cursor: i64, limit: i32) -> Result<Vec<Pet>>;
    fn list_pets_by_owner(&self, owner_id: i64) -> Result<Vec<Pet>>;
    fn update_pet(&self, pet: &Pet) -> Result<()>;
    fn delete_pet(&self, id: i64) -> Result<bool>;

    // Appointment operations
    fn create_appointment(&self, appointment: &Appointment) -> Result<i64>;
    fn get_appointment(&self, id: i64) -> Result<Option<Appointment>>;
    fn get_appointment_by_slot(&self, slot: &DateTime<Utc>) -> Result<Option<Appointment>>;
    /// Appointments with `after < slot`, ordered by slot.
    fn list_appointments_after(&self, after: &DateTime<Utc>) -> Result<Vec<Appointment>>;
    /// Appointments with `start <= slot < end`, ordered by slot.
    fn list_appointments_between(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;
    /// Appointments with `after < slot` whose pet belongs to `owner_id`, ordered by slot.
    fn list_owner_appointments_after(
        &self,
        owner_id: i64,
        after: &DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;
    fn update_appointment(&self, appointment: &Appointment) -> Result<()>;
    fn delete_appointment(&self, id: i64) -> Result<bool>;
}
