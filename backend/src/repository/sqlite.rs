use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use users_common::{User, DATE_FORMAT};

use super::{RepositoryError, UserRepository};

const USER_COLUMNS: &str = "id, email, first_name, last_name, birth_date, address, phone_number";

/// SQLite-backed user storage.
pub struct SqliteUserRepository {
    conn: Mutex<Connection>,
}

impl SqliteUserRepository {
    /// Open (or create) the database at `database_url`.
    ///
    /// Accepts a `sqlite:` prefix and `:memory:` for a private in-memory database.
    pub fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent).map_err(|e| RepositoryError::Io(e.to_string()))?;
            }
            Connection::open(path)?
        };

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                birth_date TEXT NOT NULL,
                address TEXT,
                phone_number TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_users_birth_date ON users(birth_date)",
            [],
        )?;

        tracing::info!("User repository initialized with database: {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, mostly for tests.
    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::new(":memory:")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }
}

/// Columns as stored; the date is kept as `YYYY-MM-DD` text so that
/// lexical order equals chronological order.
struct UserRow {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    birth_date: String,
    address: Option<String>,
    phone_number: Option<String>,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            birth_date: row.get(4)?,
            address: row.get(5)?,
            phone_number: row.get(6)?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let birth_date = NaiveDate::parse_from_str(&self.birth_date, DATE_FORMAT).map_err(|e| {
            RepositoryError::CorruptRow {
                id: self.id,
                reason: format!("birth_date '{}': {}", self.birth_date, e),
            }
        })?;

        Ok(User {
            id: Some(self.id),
            email: Some(self.email),
            first_name: Some(self.first_name),
            last_name: Some(self.last_name),
            birth_date: Some(birth_date),
            address: self.address,
            phone_number: self.phone_number,
        })
    }
}

fn required<'a>(value: &'a Option<String>, column: &str) -> Result<&'a str, RepositoryError> {
    value
        .as_deref()
        .ok_or_else(|| RepositoryError::Database(format!("{} must not be null", column)))
}

fn query_users(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<User>, RepositoryError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, UserRow::from_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row?.into_user()?);
    }
    Ok(users)
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn save(&self, user: User) -> Result<User, RepositoryError> {
        let birth_date = user
            .birth_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .ok_or_else(|| RepositoryError::Database("birth_date must not be null".to_string()))?;
        let email = required(&user.email, "email")?;
        let first_name = required(&user.first_name, "first_name")?;
        let last_name = required(&user.last_name, "last_name")?;

        let conn = self.lock()?;

        let id = match user.id {
            None => {
                conn.execute(
                    "INSERT INTO users (email, first_name, last_name, birth_date, address, phone_number)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        email,
                        first_name,
                        last_name,
                        birth_date,
                        user.address,
                        user.phone_number,
                    ],
                )?;
                let id = conn.last_insert_rowid();
                tracing::debug!("Inserted user {}", id);
                id
            }
            Some(id) => {
                let updated = conn.execute(
                    "UPDATE users SET
                        email = ?2,
                        first_name = ?3,
                        last_name = ?4,
                        birth_date = ?5,
                        address = ?6,
                        phone_number = ?7
                     WHERE id = ?1",
                    params![
                        id,
                        email,
                        first_name,
                        last_name,
                        birth_date,
                        user.address,
                        user.phone_number,
                    ],
                )?;
                if updated == 0 {
                    return Err(RepositoryError::NotFound(id));
                }
                tracing::debug!("Updated user {}", id);
                id
            }
        };

        Ok(User {
            id: Some(id),
            ..user
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id],
                UserRow::from_row,
            )
            .optional()?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let conn = self.lock()?;
        query_users(
            &conn,
            &format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS),
            [],
        )
    }

    async fn find_by_birth_date_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<User>, RepositoryError> {
        let conn = self.lock()?;
        query_users(
            &conn,
            &format!(
                "SELECT {} FROM users WHERE birth_date BETWEEN ?1 AND ?2 ORDER BY id",
                USER_COLUMNS
            ),
            params![
                from.format(DATE_FORMAT).to_string(),
                to.format(DATE_FORMAT).to_string()
            ],
        )
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        tracing::debug!("Deleted {} row(s) for user {}", deleted, id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}
