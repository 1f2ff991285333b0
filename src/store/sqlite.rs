use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Used by tests and tooling.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

/// Fixed-width UTC encoding, so that text equality and ordering in SQL match
/// the ordering of the instants.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn map_unique_violation(e: rusqlite::Error) -> Error {
    match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::AlreadyExists
        }
        e => Error::from(e),
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

const USER_COLUMNS: &str =
    "id, username, password_hash, role, name, contact, email, created_at, updated_at";
const PET_COLUMNS: &str =
    "id, name, species, breed, owner_id, medical_history, created_at, updated_at";
const APPOINTMENT_COLUMNS: &str = "id, slot, reason, pet_id, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: row.get(3)?,
        name: row.get(4)?,
        contact: row.get(5)?,
        email: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

fn pet_from_row(row: &Row<'_>) -> rusqlite::Result<Pet> {
    Ok(Pet {
        id: row.get(0)?,
        name: row.get(1)?,
        species: row.get(2)?,
        breed: row.get(3)?,
        owner_id: row.get(4)?,
        medical_history: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        slot: parse_datetime(&row.get::<_, String>(1)?),
        reason: row.get(2)?,
        pet_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (username, password_hash, role, name, contact, email, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.username,
                user.password_hash,
                user.role,
                user.name,
                user.contact,
                user.email,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        )
        .map_err(map_unique_violation)?;
        Ok(conn.last_insert_rowid())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self, cursor: i64, limit: i32) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id > ?1 ORDER BY id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE users SET username = ?1, password_hash = ?2, role = ?3, name = ?4,
                 contact = ?5, email = ?6, updated_at = ?7 WHERE id = ?8",
                params![
                    user.username,
                    user.password_hash,
                    user.role,
                    user.name,
                    user.contact,
                    user.email,
                    format_datetime(&user.updated_at),
                    user.id,
                ],
            )
            .map_err(map_unique_violation)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn has_admin_user(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Pet operations

    fn create_pet(&self, pet: &Pet) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO pets (name, species, breed, owner_id, medical_history, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                pet.name,
                pet.species,
                pet.breed,
                pet.owner_id,
                pet.medical_history,
                format_datetime(&pet.created_at),
                format_datetime(&pet.updated_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_pet(&self, id: i64) -> Result<Option<Pet>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PET_COLUMNS} FROM pets WHERE id = ?1"),
            params![id],
            pet_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_pets(&self, cursor: i64, limit: i32) -> Result<Vec<Pet>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE id > ?1 ORDER BY id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], pet_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_pets_by_owner(&self, owner_id: i64) -> Result<Vec<Pet>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE owner_id = ?1 ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![owner_id], pet_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_pet(&self, pet: &Pet) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE pets SET name = ?1, species = ?2, breed = ?3, owner_id = ?4,
             medical_history = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                pet.name,
                pet.species,
                pet.breed,
                pet.owner_id,
                pet.medical_history,
                format_datetime(&pet.updated_at),
                pet.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_pet(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM pets WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Appointment operations

    fn create_appointment(&self, appointment: &Appointment) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO appointments (slot, reason, pet_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                format_datetime(&appointment.slot),
                appointment.reason,
                appointment.pet_id,
                format_datetime(&appointment.created_at),
                format_datetime(&appointment.updated_at),
            ],
        )
        .map_err(map_unique_violation)?;
        Ok(conn.last_insert_rowid())
    }

    fn get_appointment(&self, id: i64) -> Result<Option<Appointment>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id],
            appointment_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_appointment_by_slot(&self, slot: &DateTime<Utc>) -> Result<Option<Appointment>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE slot = ?1"),
            params![format_datetime(slot)],
            appointment_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_appointments_after(&self, after: &DateTime<Utc>) -> Result<Vec<Appointment>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE slot > ?1 ORDER BY slot ASC"
        ))?;

        let rows = stmt.query_map(params![format_datetime(after)], appointment_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_appointments_between(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE slot >= ?1 AND slot < ?2
             ORDER BY slot ASC"
        ))?;

        let rows = stmt.query_map(
            params![format_datetime(start), format_datetime(end)],
            appointment_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_owner_appointments_after(
        &self,
        owner_id: i64,
        after: &DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT a.id, a.slot, a.reason, a.pet_id, a.created_at, a.updated_at
             FROM appointments a
             JOIN pets p ON p.id = a.pet_id
             WHERE p.owner_id = ?1 AND a.slot > ?2
             ORDER BY a.slot ASC",
        )?;

        let rows = stmt.query_map(
            params![owner_id, format_datetime(after)],
            appointment_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_appointment(&self, appointment: &Appointment) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE appointments SET slot = ?1, reason = ?2, pet_id = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    format_datetime(&appointment.slot),
                    appointment.reason,
                    appointment.pet_id,
                    format_datetime(&appointment.updated_at),
                    appointment.id,
                ],
            )
            .map_err(map_unique_violation)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_appointment(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
