use super::{PersistenceError, PersistenceResult, SchedulerSnapshot, SchedulerStore};
use crate::event::{EventId, FixedEvent, NewFixedEvent};
use crate::grid::{self, Day};
use crate::task::{NewTask, Slot, SlotUpdate, Task, TaskId};
use crate::validation;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::Path;

pub struct SqliteStore {
    connection: Mutex<Connection>,
}

struct TaskRow {
    id: TaskId,
    user_id: String,
    name: String,
    duration_hours: i64,
    scheduled_day: Option<String>,
    scheduled_start_time: Option<String>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS fixed_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                day TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                duration_hours INTEGER NOT NULL,
                scheduled_day TEXT,
                scheduled_start_time TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_fixed_events_user ON fixed_events (user_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks (user_id);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn insert_fixed_event(
        conn: &Connection,
        user_id: &str,
        event: NewFixedEvent,
        start_hour: u8,
        end_hour: u8,
    ) -> PersistenceResult<FixedEvent> {
        conn.execute(
            "INSERT INTO fixed_events (user_id, name, day, start_time, end_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                event.name,
                event.day.as_str(),
                grid::format_hour(start_hour),
                grid::format_hour(end_hour),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(FixedEvent {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            name: event.name,
            day: event.day,
            start_hour,
            end_hour,
        })
    }

    fn insert_task(
        tx: &Transaction,
        user_id: &str,
        task: NewTask,
        duration: u8,
    ) -> PersistenceResult<Task> {
        let created_at = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO tasks (user_id, name, duration_hours, scheduled_day, scheduled_start_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                task.name,
                duration,
                task.slot.map(|slot| slot.day.as_str()),
                task.slot.map(|slot| slot.start_time()),
                created_at,
            ],
        )?;
        Ok(Task {
            id: tx.last_insert_rowid(),
            user_id: user_id.to_string(),
            name: task.name,
            duration_hours: duration,
            assigned_slot: task.slot,
        })
    }

    fn task_duration(tx: &Transaction, user_id: &str, id: TaskId) -> PersistenceResult<u8> {
        let duration: Option<i64> = tx
            .query_row(
                "SELECT duration_hours FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        let duration = duration.ok_or(PersistenceError::NotFound { kind: "task", id })?;
        u8::try_from(duration)
            .map_err(|_| PersistenceError::InvalidData(format!("task {id} has duration {duration}")))
    }
}

fn parse_day(raw: &str) -> PersistenceResult<Day> {
    raw.parse::<Day>()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

fn parse_hour(raw: &str) -> PersistenceResult<u8> {
    grid::parse_hour(raw).map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

impl TaskRow {
    fn into_task(self) -> PersistenceResult<Task> {
        let duration_hours = u8::try_from(self.duration_hours).map_err(|_| {
            PersistenceError::InvalidData(format!(
                "task {} has duration {}",
                self.id, self.duration_hours
            ))
        })?;
        let assigned_slot = match (self.scheduled_day, self.scheduled_start_time) {
            (Some(day), Some(start)) => Some(Slot::new(parse_day(&day)?, parse_hour(&start)?)),
            _ => None,
        };
        Ok(Task {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            duration_hours,
            assigned_slot,
        })
    }
}

impl SchedulerStore for SqliteStore {
    fn create_fixed_event(
        &self,
        user_id: &str,
        event: NewFixedEvent,
    ) -> PersistenceResult<FixedEvent> {
        let (start_hour, end_hour) = event.validate()?;
        let conn = self.connection.lock();
        let created = Self::insert_fixed_event(&conn, user_id, event, start_hour, end_hour)?;
        tracing::debug!(user_id, event_id = created.id, "stored fixed event");
        Ok(created)
    }

    fn delete_fixed_event(&self, user_id: &str, id: EventId) -> PersistenceResult<()> {
        let conn = self.connection.lock();
        let removed = conn.execute(
            "DELETE FROM fixed_events WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if removed == 0 {
            return Err(PersistenceError::NotFound {
                kind: "fixed event",
                id,
            });
        }
        Ok(())
    }

    fn create_tasks(&self, user_id: &str, tasks: Vec<NewTask>) -> PersistenceResult<Vec<Task>> {
        let durations = tasks
            .iter()
            .map(validation::validate_new_task)
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(tasks.len());
        for (task, duration) in tasks.into_iter().zip(durations) {
            created.push(Self::insert_task(&tx, user_id, task, duration)?);
        }
        tx.commit()?;
        Ok(created)
    }

    fn delete_task(&self, user_id: &str, id: TaskId) -> PersistenceResult<()> {
        let conn = self.connection.lock();
        let removed = conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if removed == 0 {
            return Err(PersistenceError::NotFound { kind: "task", id });
        }
        Ok(())
    }

    fn batch_reassign(&self, user_id: &str, updates: &[SlotUpdate]) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        // Dropping the transaction on any early return rolls every update back.
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE tasks SET scheduled_day = ?1, scheduled_start_time = ?2
                 WHERE id = ?3 AND user_id = ?4",
            )?;
            for update in updates {
                let duration = Self::task_duration(&tx, user_id, update.id)?;
                if let Some(slot) = &update.assigned_slot {
                    validation::validate_slot(slot, duration)?;
                }
                stmt.execute(params![
                    update.assigned_slot.map(|slot| slot.day.as_str()),
                    update.assigned_slot.map(|slot| slot.start_time()),
                    update.id,
                    user_id,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(user_id, count = updates.len(), "applied slot updates");
        Ok(())
    }

    fn list(&self, user_id: &str) -> PersistenceResult<SchedulerSnapshot> {
        let conn = self.connection.lock();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, day, start_time, end_time
             FROM fixed_events WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, EventId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut fixed_events = Vec::new();
        for row in rows {
            let (id, user_id, name, day, start, end) = row?;
            fixed_events.push(FixedEvent {
                id,
                user_id,
                name,
                day: parse_day(&day)?,
                start_hour: parse_hour(&start)?,
                end_hour: parse_hour(&end)?,
            });
        }

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, duration_hours, scheduled_day, scheduled_start_time
             FROM tasks WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(TaskRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                name: row.get(2)?,
                duration_hours: row.get(3)?,
                scheduled_day: row.get(4)?,
                scheduled_start_time: row.get(5)?,
            })
        })?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }

        Ok(SchedulerSnapshot {
            fixed_events,
            tasks,
        })
    }

    fn reset(&self, user_id: &str) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM fixed_events WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])?;
        tx.commit()?;
        Ok(())
    }

    fn replace_all(
        &self,
        user_id: &str,
        fixed_events: Vec<NewFixedEvent>,
        tasks: Vec<NewTask>,
    ) -> PersistenceResult<SchedulerSnapshot> {
        let hours = fixed_events
            .iter()
            .map(NewFixedEvent::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let durations = tasks
            .iter()
            .map(validation::validate_new_task)
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM fixed_events WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])?;

        let mut snapshot = SchedulerSnapshot::default();
        for (event, (start_hour, end_hour)) in fixed_events.into_iter().zip(hours) {
            snapshot
                .fixed_events
                .push(Self::insert_fixed_event(&tx, user_id, event, start_hour, end_hour)?);
        }
        for (task, duration) in tasks.into_iter().zip(durations) {
            snapshot
                .tasks
                .push(Self::insert_task(&tx, user_id, task, duration)?);
        }
        tx.commit()?;
        tracing::debug!(
            user_id,
            fixed_events = snapshot.fixed_events.len(),
            tasks = snapshot.tasks.len(),
            "replaced scheduler data"
        );
        Ok(snapshot)
    }
}
