use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime, to_u32},
    models::Session,
};

const SESSION_COLUMNS: &str = "id, activity, starts_at, location, duration_minutes, category_id";

fn row_to_session(row: &Row) -> Result<Session> {
    let starts_at: String = row.get("starts_at")?;
    let duration_minutes: i64 = row.get("duration_minutes")?;

    Ok(Session {
        id: row.get("id")?,
        activity: row.get("activity")?,
        starts_at: parse_datetime(&starts_at, "starts_at")?,
        location: row.get("location")?,
        duration_minutes: to_u32(duration_minutes, "duration_minutes")?,
        category_id: row.get("category_id")?,
    })
}

impl Database {
    /// Stores a new session and returns its assigned id.
    pub async fn insert_session(&self, session: &Session) -> Result<i64> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (activity, starts_at, location, duration_minutes, category_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.activity,
                    format_datetime(&record.starts_at),
                    record.location,
                    record.duration_minutes,
                    record.category_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Overwrites every column of a stored session.
    pub async fn update_session(&self, session: &Session) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE sessions
                 SET activity = ?1,
                     starts_at = ?2,
                     location = ?3,
                     duration_minutes = ?4,
                     category_id = ?5
                 WHERE id = ?6",
                params![
                    record.activity,
                    format_datetime(&record.starts_at),
                    record.location,
                    record.duration_minutes,
                    record.category_id,
                    record.id,
                ],
            )?;

            if rows_affected == 0 {
                return Err(anyhow!("Session {} not found", record.id));
            }

            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: i64) -> Result<Option<Session>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
            ))?;

            let mut rows = stmt.query(params![session_id])?;
            let session = match rows.next()? {
                Some(row) => Some(row_to_session(row)?),
                None => None,
            };
            Ok(session)
        })
        .await
    }

    /// All sessions, earliest first.
    pub async fn get_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY starts_at ASC, id ASC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }

    /// Sessions starting in `[from, to)`, earliest first.
    pub async fn get_sessions_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Session>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE starts_at >= ?1 AND starts_at < ?2
                 ORDER BY starts_at ASC, id ASC"
            ))?;

            let mut rows = stmt.query(params![format_datetime(&from), format_datetime(&to)])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }

    /// Attach or detach a category. Detaching leaves the category row alone.
    pub async fn update_session_category(
        &self,
        session_id: i64,
        category_id: Option<i64>,
    ) -> Result<()> {
        self.execute(move |conn| {
            if let Some(category_id) = category_id {
                let exists: Option<i64> = conn
                    .query_row(
                        "SELECT id FROM categories WHERE id = ?1",
                        params![category_id],
                        |row| row.get(0),
                    )
                    .optional()?;

                if exists.is_none() {
                    return Err(anyhow!("Category {category_id} not found"));
                }
            }

            let rows_affected = conn.execute(
                "UPDATE sessions SET category_id = ?1 WHERE id = ?2",
                params![category_id, session_id],
            )?;

            if rows_affected == 0 {
                return Err(anyhow!("Session {session_id} not found"));
            }

            Ok(())
        })
        .await
    }

    pub async fn delete_session(&self, session_id: i64) -> Result<()> {
        self.execute(move |conn| {
            // Already gone is fine
            conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
            Ok(())
        })
        .await
    }
}
