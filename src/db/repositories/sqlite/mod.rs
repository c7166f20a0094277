//! SQLite repository backend.
//!
//! A dedicated worker thread owns the `rusqlite::Connection`; async
//! callers hand it closures over an mpsc channel and await the result on
//! a oneshot. This keeps the non-Send connection off the tokio runtime.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info};
use rusqlite::{params, params_from_iter, Connection, Row, ToSql};
use tokio::sync::oneshot;

mod migrations;

use migrations::run_migrations;

use crate::api::{ActivityId, CategoryId, EntryId};
use crate::db::repository::{
    ActivityRepository, CategoryRepository, EntryFilter, EntryRepository, ErrorContext,
    FullRepository, RepositoryError, RepositoryResult, SettingsRepository,
};
use crate::models::{
    Activity, ActivityInput, ActivityPatch, Category, CategoryInput, CategoryPatch, EntryInput,
    EntryPatch, RoundingMode, Settings, TimeEntry, WeekStart,
};

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct WorkerHandle {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

const DATE_FMT: &str = "%Y-%m-%d";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn parse_date(value: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FMT)
        .map_err(|err| RepositoryError::query(format!("invalid date '{value}': {err}")))
}

fn parse_datetime(value: &str) -> RepositoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| RepositoryError::query(format!("invalid datetime '{value}': {err}")))
}

fn category_from_row(row: &Row<'_>) -> RepositoryResult<Category> {
    Ok(Category {
        id: CategoryId::new(row.get(0)?),
        name: row.get(1)?,
        color_hex: row.get(2)?,
        icon_key: row.get(3)?,
        sort_order: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(6)?)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> RepositoryResult<Activity> {
    Ok(Activity {
        id: ActivityId::new(row.get(0)?),
        category_id: CategoryId::new(row.get(1)?),
        name: row.get(2)?,
        sort_order: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(5)?)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> RepositoryResult<TimeEntry> {
    Ok(TimeEntry {
        id: EntryId::new(row.get(0)?),
        date: parse_date(&row.get::<_, String>(1)?)?,
        category_id: CategoryId::new(row.get(2)?),
        activity_id: row.get::<_, Option<i64>>(3)?.map(ActivityId::new),
        duration_minutes: row.get(4)?,
        notes: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(7)?)?,
    })
}

fn settings_from_row(row: &Row<'_>) -> RepositoryResult<Settings> {
    let rounding_mode: String = row.get(0)?;
    let week_start: String = row.get(2)?;
    Ok(Settings {
        rounding_mode: RoundingMode::parse(&rounding_mode).ok_or_else(|| {
            RepositoryError::query(format!("unknown rounding mode '{rounding_mode}'"))
        })?,
        rounding_increment: row.get(1)?,
        week_start: WeekStart::parse(&week_start)
            .ok_or_else(|| RepositoryError::query(format!("unknown week start '{week_start}'")))?,
        primary_hex: row.get(3)?,
        accent_hex: row.get(4)?,
        glass_alpha: row.get(5)?,
        glass_blur_px: row.get(6)?,
    })
}

const CATEGORY_COLUMNS: &str = "id, name, color_hex, icon_key, sort_order, created_at, updated_at";
const ACTIVITY_COLUMNS: &str = "id, category_id, name, sort_order, created_at, updated_at";
const ENTRY_COLUMNS: &str =
    "id, date, category_id, activity_id, duration_minutes, notes, created_at, updated_at";
const SETTINGS_COLUMNS: &str =
    "rounding_mode, rounding_increment, week_start, primary_hex, accent_hex, glass_alpha, glass_blur_px";

/// SQLite-backed repository. Cheap to clone; clones share the worker.
#[derive(Clone)]
pub struct SqliteRepository {
    inner: Arc<WorkerHandle>,
    db_path: Arc<PathBuf>,
}

impl SqliteRepository {
    pub fn new(db_path: PathBuf) -> RepositoryResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                RepositoryError::configuration(format!(
                    "failed to create database directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("tracker-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(RepositoryError::from(err)
                            .with_operation("open_database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let init_result = run_migrations(&mut conn);
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .map_err(|err| {
                RepositoryError::configuration(format!(
                    "failed to spawn database worker thread: {err}"
                ))
            })?;

        ready_rx.recv().map_err(|_| {
            RepositoryError::connection("database worker exited before signaling readiness")
        })??;

        info!("Database initialized at {}", db_path.display());

        Ok(Self {
            inner: Arc::new(WorkerHandle {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut Connection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender.send(command).map_err(|err| {
            RepositoryError::connection(format!("failed to send command to DB thread: {err}"))
        })?;

        reply_rx
            .await
            .map_err(|_| RepositoryError::connection("database thread terminated unexpectedly"))?
    }
}

#[async_trait]
impl CategoryRepository for SqliteRepository {
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort_order, name"
            ))?;
            let mut rows = stmt.query([])?;
            let mut categories = Vec::new();
            while let Some(row) = rows.next()? {
                categories.push(category_from_row(row)?);
            }
            Ok(categories)
        })
        .await
    }

    async fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![id.value()])?;
            match rows.next()? {
                Some(row) => Ok(Some(category_from_row(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn insert_category(&self, input: CategoryInput) -> RepositoryResult<Category> {
        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO categories (name, color_hex, icon_key, sort_order, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.name,
                    input.color_hex,
                    input.icon_key,
                    input.sort_order,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )?;
            Ok(Category {
                id: CategoryId::new(conn.last_insert_rowid()),
                name: input.name,
                color_hex: input.color_hex,
                icon_key: input.icon_key,
                sort_order: input.sort_order,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> RepositoryResult<Category> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![id.value()])?;
            let mut category = match rows.next()? {
                Some(row) => category_from_row(row)?,
                None => {
                    return Err(RepositoryError::not_found_with_context(
                        format!("category {} not found", id),
                        ErrorContext::new("update_category")
                            .with_entity("category")
                            .with_entity_id(id),
                    ))
                }
            };
            drop(rows);
            drop(stmt);

            if let Some(name) = patch.name {
                category.name = name;
            }
            if let Some(color_hex) = patch.color_hex {
                category.color_hex = color_hex;
            }
            if let Some(icon_key) = patch.icon_key {
                category.icon_key = Some(icon_key);
            }
            if let Some(sort_order) = patch.sort_order {
                category.sort_order = sort_order;
            }
            category.updated_at = Utc::now();

            conn.execute(
                "UPDATE categories
                 SET name = ?1, color_hex = ?2, icon_key = ?3, sort_order = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    category.name,
                    category.color_hex,
                    category.icon_key,
                    category.sort_order,
                    category.updated_at.to_rfc3339(),
                    id.value(),
                ],
            )?;
            Ok(category)
        })
        .await
    }

    async fn delete_category(&self, id: CategoryId) -> RepositoryResult<bool> {
        self.execute(move |conn| {
            let deleted = conn.execute("DELETE FROM categories WHERE id = ?1", params![id.value()])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn count_entries_for_category(&self, id: CategoryId) -> RepositoryResult<u64> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM entries WHERE category_id = ?1",
                params![id.value()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn count_activities_for_category(&self, id: CategoryId) -> RepositoryResult<u64> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM activities WHERE category_id = ?1",
                params![id.value()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}

#[async_trait]
impl ActivityRepository for SqliteRepository {
    async fn list_activities(
        &self,
        category_id: Option<CategoryId>,
    ) -> RepositoryResult<Vec<Activity>> {
        self.execute(move |conn| {
            let mut activities = Vec::new();
            match category_id {
                Some(category_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {ACTIVITY_COLUMNS} FROM activities
                         WHERE category_id = ?1
                         ORDER BY category_id, sort_order, name"
                    ))?;
                    let mut rows = stmt.query(params![category_id.value()])?;
                    while let Some(row) = rows.next()? {
                        activities.push(activity_from_row(row)?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {ACTIVITY_COLUMNS} FROM activities
                         ORDER BY category_id, sort_order, name"
                    ))?;
                    let mut rows = stmt.query([])?;
                    while let Some(row) = rows.next()? {
                        activities.push(activity_from_row(row)?);
                    }
                }
            }
            Ok(activities)
        })
        .await
    }

    async fn get_activity(&self, id: ActivityId) -> RepositoryResult<Option<Activity>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![id.value()])?;
            match rows.next()? {
                Some(row) => Ok(Some(activity_from_row(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn insert_activity(&self, input: ActivityInput) -> RepositoryResult<Activity> {
        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO activities (category_id, name, sort_order, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    input.category_id.value(),
                    input.name,
                    input.sort_order,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )?;
            Ok(Activity {
                id: ActivityId::new(conn.last_insert_rowid()),
                category_id: input.category_id,
                name: input.name,
                sort_order: input.sort_order,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn update_activity(
        &self,
        id: ActivityId,
        patch: ActivityPatch,
    ) -> RepositoryResult<Activity> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![id.value()])?;
            let mut activity = match rows.next()? {
                Some(row) => activity_from_row(row)?,
                None => {
                    return Err(RepositoryError::not_found_with_context(
                        format!("activity {} not found", id),
                        ErrorContext::new("update_activity")
                            .with_entity("activity")
                            .with_entity_id(id),
                    ))
                }
            };
            drop(rows);
            drop(stmt);

            if let Some(name) = patch.name {
                activity.name = name;
            }
            if let Some(category_id) = patch.category_id {
                activity.category_id = category_id;
            }
            if let Some(sort_order) = patch.sort_order {
                activity.sort_order = sort_order;
            }
            activity.updated_at = Utc::now();

            conn.execute(
                "UPDATE activities
                 SET category_id = ?1, name = ?2, sort_order = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    activity.category_id.value(),
                    activity.name,
                    activity.sort_order,
                    activity.updated_at.to_rfc3339(),
                    id.value(),
                ],
            )?;
            Ok(activity)
        })
        .await
    }

    async fn delete_activity(&self, id: ActivityId) -> RepositoryResult<bool> {
        self.execute(move |conn| {
            let deleted = conn.execute("DELETE FROM activities WHERE id = ?1", params![id.value()])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn count_entries_for_activity(&self, id: ActivityId) -> RepositoryResult<u64> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM entries WHERE activity_id = ?1",
                params![id.value()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}

#[async_trait]
impl EntryRepository for SqliteRepository {
    async fn list_entries(&self, filter: EntryFilter) -> RepositoryResult<Vec<TimeEntry>> {
        self.execute(move |conn| {
            let mut clauses: Vec<&str> = Vec::new();
            let mut bind: Vec<Box<dyn ToSql>> = Vec::new();
            if let Some(from) = filter.date_from {
                clauses.push("date >= ?");
                bind.push(Box::new(format_date(from)));
            }
            if let Some(to) = filter.date_to {
                clauses.push("date <= ?");
                bind.push(Box::new(format_date(to)));
            }
            if let Some(category_id) = filter.category_id {
                clauses.push("category_id = ?");
                bind.push(Box::new(category_id.value()));
            }
            if let Some(activity_id) = filter.activity_id {
                clauses.push("activity_id = ?");
                bind.push(Box::new(activity_id.value()));
            }

            let where_clause = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM entries{where_clause} ORDER BY date DESC, id DESC"
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind.iter().map(|b| b.as_ref())))?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(entry_from_row(row)?);
            }
            Ok(entries)
        })
        .await
    }

    async fn get_entry(&self, id: EntryId) -> RepositoryResult<Option<TimeEntry>> {
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"))?;
            let mut rows = stmt.query(params![id.value()])?;
            match rows.next()? {
                Some(row) => Ok(Some(entry_from_row(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn insert_entry(&self, input: EntryInput) -> RepositoryResult<TimeEntry> {
        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO entries (date, category_id, activity_id, duration_minutes, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    format_date(input.date),
                    input.category_id.value(),
                    input.activity_id.map(|id| id.value()),
                    input.duration_minutes,
                    input.notes,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )?;
            Ok(TimeEntry {
                id: EntryId::new(conn.last_insert_rowid()),
                date: input.date,
                category_id: input.category_id,
                activity_id: input.activity_id,
                duration_minutes: input.duration_minutes,
                notes: input.notes,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn update_entry(&self, id: EntryId, patch: EntryPatch) -> RepositoryResult<TimeEntry> {
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"))?;
            let mut rows = stmt.query(params![id.value()])?;
            let mut entry = match rows.next()? {
                Some(row) => entry_from_row(row)?,
                None => {
                    return Err(RepositoryError::not_found_with_context(
                        format!("entry {} not found", id),
                        ErrorContext::new("update_entry")
                            .with_entity("entry")
                            .with_entity_id(id),
                    ))
                }
            };
            drop(rows);
            drop(stmt);

            if let Some(date) = patch.date {
                entry.date = date;
            }
            if let Some(category_id) = patch.category_id {
                entry.category_id = category_id;
            }
            if let Some(activity_id) = patch.activity_id {
                entry.activity_id = activity_id;
            }
            if let Some(duration_minutes) = patch.duration_minutes {
                entry.duration_minutes = duration_minutes;
            }
            if let Some(notes) = patch.notes {
                entry.notes = Some(notes);
            }
            entry.updated_at = Utc::now();

            conn.execute(
                "UPDATE entries
                 SET date = ?1, category_id = ?2, activity_id = ?3, duration_minutes = ?4,
                     notes = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    format_date(entry.date),
                    entry.category_id.value(),
                    entry.activity_id.map(|id| id.value()),
                    entry.duration_minutes,
                    entry.notes,
                    entry.updated_at.to_rfc3339(),
                    id.value(),
                ],
            )?;
            Ok(entry)
        })
        .await
    }

    async fn delete_entry(&self, id: EntryId) -> RepositoryResult<bool> {
        self.execute(move |conn| {
            let deleted = conn.execute("DELETE FROM entries WHERE id = ?1", params![id.value()])?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> RepositoryResult<Settings> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SETTINGS_COLUMNS} FROM settings WHERE id = 1"
            ))?;
            let mut rows = stmt.query([])?;
            if let Some(row) = rows.next()? {
                return settings_from_row(row);
            }
            drop(rows);
            drop(stmt);

            conn.execute("INSERT INTO settings (id) VALUES (1)", [])?;
            Ok(Settings::default())
        })
        .await
    }

    async fn put_settings(&self, settings: Settings) -> RepositoryResult<Settings> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO settings (id, rounding_mode, rounding_increment, week_start,
                                       primary_hex, accent_hex, glass_alpha, glass_blur_px)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     rounding_mode = excluded.rounding_mode,
                     rounding_increment = excluded.rounding_increment,
                     week_start = excluded.week_start,
                     primary_hex = excluded.primary_hex,
                     accent_hex = excluded.accent_hex,
                     glass_alpha = excluded.glass_alpha,
                     glass_blur_px = excluded.glass_blur_px",
                params![
                    settings.rounding_mode.as_str(),
                    settings.rounding_increment,
                    settings.week_start.as_str(),
                    settings.primary_hex,
                    settings.accent_hex,
                    settings.glass_alpha,
                    settings.glass_blur_px,
                ],
            )?;
            Ok(settings)
        })
        .await
    }
}

#[async_trait]
impl FullRepository for SqliteRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        self.execute(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}
