// TaskStore: SQLite-backed task collection with a single-slot backup for undo

use crate::error::{Error, Result};
use crate::export;
use crate::models::{Priority, Repeat, Status, Task, now_stamp};
use crate::sort::SortKey;
use rusqlite::{Connection, OptionalExtension, backup::Backup, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Where the durable store and its backup slot live.
///
/// Passed explicitly to [`TaskStore::open`] so tests can isolate each
/// run under its own temporary directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub backup_path: PathBuf,
}

impl Config {
    /// Config with the backup slot as a `.bak` sibling of the database.
    pub fn new<P: Into<PathBuf>>(db_path: P) -> Self {
        let db_path = db_path.into();
        let mut backup = db_path.clone().into_os_string();
        backup.push(".bak");
        Self {
            db_path,
            backup_path: PathBuf::from(backup),
        }
    }

    /// Default per-user location under the platform data directory.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("tasktracker").join("tasks.db")))
    }
}

/// The task collection. Owns the SQLite connection; every mutating
/// operation captures the backup slot before writing.
pub struct TaskStore {
    config: Config,
    db: Connection,
}

impl TaskStore {
    /// Open or create the store described by `config`.
    ///
    /// A missing database is a valid empty store; parent directories
    /// are created as needed.
    pub fn open(config: Config) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(&config.db_path)?;
        let store = Self { config, db };
        store.create_schema()?;
        Ok(store)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating tasks schema");

        // AUTOINCREMENT keeps ids monotonic: a deleted id is never
        // handed out again.
        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                due_date TEXT,
                priority TEXT NOT NULL,
                repeat TEXT,
                completed_at TEXT
            );
            "#,
        )?;

        Ok(())
    }

    /// All tasks in insertion (id) order. Empty store yields an empty vec.
    pub fn load(&self) -> Result<Vec<Task>> {
        self.select_tasks(None)
    }

    /// Fetch one task by id.
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let row = self
            .db
            .query_row(
                "SELECT id, title, status, due_date, priority, repeat, completed_at
                 FROM tasks WHERE id = ?1",
                params![id],
                raw_row,
            )
            .optional()?;

        row.map(task_from_raw).transpose()
    }

    /// Create a task with a fresh id and status todo.
    pub fn add(
        &mut self,
        title: &str,
        due_date: Option<&str>,
        priority: Priority,
        repeat: Option<Repeat>,
    ) -> Result<Task> {
        if title.trim().is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }

        self.snapshot()?;
        self.db.execute(
            "INSERT INTO tasks (title, status, due_date, priority, repeat)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                title,
                Status::Todo.as_str(),
                due_date,
                priority.as_str(),
                repeat.map(Repeat::as_str)
            ],
        )?;

        let id = self.db.last_insert_rowid();
        debug!(id, title, "Added task");

        Ok(Task {
            id,
            title: title.to_string(),
            status: Status::Todo,
            due_date: due_date.map(String::from),
            priority,
            repeat,
            completed_at: None,
        })
    }

    /// Replace the title of an existing task. Every other field is
    /// left untouched.
    pub fn update(&mut self, id: i64, new_title: &str) -> Result<()> {
        if new_title.trim().is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }
        if self.get(id)?.is_none() {
            return Err(Error::NotFound(id));
        }

        self.snapshot()?;
        self.db.execute(
            "UPDATE tasks SET title = ?1 WHERE id = ?2",
            params![new_title, id],
        )?;

        debug!(id, "Updated task title");
        Ok(())
    }

    /// Remove a task. Silently succeeds when the id is absent.
    pub fn delete(&mut self, id: i64) -> Result<()> {
        self.snapshot()?;
        let removed = self.db.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        debug!(id, removed, "Deleted task");
        Ok(())
    }

    /// Set a task's status. Marking done stamps `completed_at` with the
    /// current local time; any other status leaves the stamp as it was.
    pub fn mark(&mut self, id: i64, status: Status) -> Result<Task> {
        let Some(task) = self.get(id)? else {
            return Err(Error::NotFound(id));
        };

        let completed_at = if status == Status::Done {
            Some(now_stamp())
        } else {
            task.completed_at.clone()
        };

        self.snapshot()?;
        self.db.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![status.as_str(), completed_at, id],
        )?;

        debug!(id, status = status.as_str(), "Marked task");
        Ok(Task {
            status,
            completed_at,
            ..task
        })
    }

    /// Case-insensitive substring match against titles, original order
    /// preserved. The empty keyword matches everything.
    pub fn search(&self, keyword: &str) -> Result<Vec<Task>> {
        let needle = keyword.to_lowercase();
        let tasks = self.load()?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .collect())
    }

    /// All tasks, optionally sorted ascending by the given key.
    pub fn list(&self, sort: Option<SortKey>) -> Result<Vec<Task>> {
        self.select_tasks(sort)
    }

    /// Export every task to a CSV file at `destination`. Returns the
    /// number of rows written.
    pub fn export_csv(&self, destination: &Path) -> Result<usize> {
        let tasks = self.load()?;
        export::write_csv(destination, &tasks)?;
        Ok(tasks.len())
    }

    /// Restore the state captured in the backup slot, overwriting the
    /// current store. Returns false when no backup exists ("nothing to
    /// undo"). The slot is not consumed, so a second consecutive undo
    /// leaves the store unchanged.
    pub fn undo(&mut self) -> Result<bool> {
        if !self.config.backup_path.exists() {
            debug!("No backup slot present, nothing to undo");
            return Ok(false);
        }

        let src = Connection::open(&self.config.backup_path)?;
        let restore = Backup::new(&src, &mut self.db)?;
        restore.run_to_completion(64, Duration::from_millis(5), None)?;

        info!(slot = ?self.config.backup_path, "Restored store from backup slot");
        Ok(true)
    }

    /// Copy the current durable state into the backup slot. Called
    /// before every write, so the slot always holds exactly the state
    /// prior to the most recent write.
    fn snapshot(&self) -> Result<()> {
        let mut dst = Connection::open(&self.config.backup_path)?;
        let backup = Backup::new(&self.db, &mut dst)?;
        backup.run_to_completion(64, Duration::from_millis(5), None)?;

        debug!(slot = ?self.config.backup_path, "Captured backup slot");
        Ok(())
    }

    fn select_tasks(&self, sort: Option<SortKey>) -> Result<Vec<Task>> {
        let query = match sort {
            // Sort key comes from a closed enum, never from user text.
            Some(key) => format!(
                "SELECT id, title, status, due_date, priority, repeat, completed_at
                 FROM tasks ORDER BY {}, id",
                key.to_sql()
            ),
            None => "SELECT id, title, status, due_date, priority, repeat, completed_at
                 FROM tasks ORDER BY id"
                .to_string(),
        };

        let mut stmt = self.db.prepare(&query)?;
        let rows = stmt.query_map([], raw_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(task_from_raw(row?)?);
        }
        Ok(tasks)
    }
}

type RawTask = (
    i64,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
);

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTask> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn task_from_raw(raw: RawTask) -> Result<Task> {
    let (id, title, status, due_date, priority, repeat, completed_at) = raw;
    Ok(Task {
        id,
        title,
        status: status.parse()?,
        due_date,
        priority: priority.parse()?,
        repeat: repeat.as_deref().map(|r| r.parse::<Repeat>()).transpose()?,
        completed_at,
    })
}
