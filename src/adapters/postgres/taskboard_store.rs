//! PostgreSQL implementation of the taskboard store.
//!
//! Each [`StoreTransaction`] wraps one database transaction. Reads inside it
//! use `SELECT ... FOR UPDATE`, so rows a mutation looked at stay locked
//! until commit or rollback. Versioned writes add `AND version = $n` and,
//! when nothing matched, look the row up again to tell "gone" from
//! "changed underneath us".

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use super::rows::{
    convert_all, version_from_db, version_to_db, BoardRow, TaskRow, UserRow, BOARD_COLUMNS,
    TASK_COLUMNS, TASK_ORDER, USER_COLUMNS,
};
use crate::config::DatabaseConfig;
use crate::domain::board::Board;
use crate::domain::foundation::{BoardId, DomainError, ErrorCode, TaskId, UserId, Version};
use crate::domain::optimistic_lock::{VersionConflict, Versioned};
use crate::domain::ordering::Slot;
use crate::domain::task::Task;
use crate::domain::user::User;
use crate::ports::{StoreTransaction, TaskboardStore};

/// PostgreSQL implementation of the [`TaskboardStore`] port.
#[derive(Clone)]
pub struct PostgresTaskboardStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresTaskboardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTaskboardStore")
            .field("pool", &"PgPool")
            .finish()
    }
}

impl PostgresTaskboardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool sized from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::database("Failed to connect to database", e))?;
        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to run migrations", e))
    }
}

/// SQLSTATEs Postgres raises when it aborts one side of a lock race.
const DEADLOCK_DETECTED: &str = "40P01";
const SERIALIZATION_FAILURE: &str = "40001";

fn is_lost_race(sqlstate: Option<&str>) -> bool {
    matches!(sqlstate, Some(DEADLOCK_DETECTED | SERIALIZATION_FAILURE))
}

fn db(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        let sqlstate = match &e {
            sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
            _ => None,
        };
        if is_lost_race(sqlstate.as_deref()) {
            tracing::debug!(context, error = %e, "transaction lost a lock race");
            DomainError::concurrent_update(format!("{}: concurrent update, retry", context))
        } else {
            DomainError::database(context, e)
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn duplicate_user_name(name: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DuplicateName,
        format!("User name already taken: {}", name),
    )
    .with_detail("field", "name")
}

#[async_trait]
impl TaskboardStore for PostgresTaskboardStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(db("Failed to start transaction"))?;
        Ok(Box::new(PostgresStoreTransaction { tx }))
    }

    async fn list_tasks(&self, board_id: Option<&BoardId>) -> Result<Vec<Task>, DomainError> {
        let rows: Vec<TaskRow> = match board_id {
            Some(board_id) => {
                let sql = format!(
                    "SELECT {} FROM tasks WHERE board_id = $1 {}",
                    TASK_COLUMNS, TASK_ORDER
                );
                sqlx::query_as::<_, TaskRow>(&sql)
                    .bind(board_id.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("SELECT {} FROM tasks {}", TASK_COLUMNS, TASK_ORDER);
                sqlx::query_as::<_, TaskRow>(&sql)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db("Failed to list tasks"))?;
        convert_all(rows)
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let row: Option<TaskRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db("Failed to fetch task"))?;
        row.map(Task::try_from).transpose()
    }

    async fn list_boards(&self) -> Result<Vec<Board>, DomainError> {
        let sql = format!("SELECT {} FROM boards ORDER BY disp_order, name", BOARD_COLUMNS);
        let rows: Vec<BoardRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db("Failed to list boards"))?;
        convert_all(rows)
    }

    async fn get_board(&self, id: &BoardId) -> Result<Option<Board>, DomainError> {
        let sql = format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS);
        let row: Option<BoardRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db("Failed to fetch board"))?;
        row.map(Board::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let sql = format!("SELECT {} FROM users ORDER BY name", USER_COLUMNS);
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db("Failed to list users"))?;
        convert_all(rows)
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db("Failed to fetch user"))?;
        row.map(User::try_from).transpose()
    }

    async fn get_user_by_name(&self, name: &str) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE name = $1", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db("Failed to fetch user"))?;
        row.map(User::try_from).transpose()
    }
}

/// One open database transaction.
struct PostgresStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

/// Which table a versioned write targets.
#[derive(Clone, Copy)]
enum Table {
    Tasks,
    Boards,
    Users,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Table::Tasks => "tasks",
            Table::Boards => "boards",
            Table::Users => "users",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Table::Tasks => "Task",
            Table::Boards => "Board",
            Table::Users => "User",
        }
    }

    fn not_found(self) -> ErrorCode {
        match self {
            Table::Tasks => ErrorCode::TaskNotFound,
            Table::Boards => ErrorCode::BoardNotFound,
            Table::Users => ErrorCode::UserNotFound,
        }
    }
}

impl PostgresStoreTransaction {
    /// Explains why a versioned write matched no rows.
    async fn version_miss(&mut self, table: Table, id: &str, expected: Version) -> DomainError {
        let sql = format!("SELECT version FROM {} WHERE id = $1", table.name());
        let stored: Result<Option<(i32,)>, sqlx::Error> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await;

        match stored {
            Ok(Some((stored,))) => VersionConflict {
                kind: table.kind(),
                id: id.to_string(),
                presented: expected,
                stored: version_from_db(stored),
            }
            .into(),
            Ok(None) => DomainError::new(
                table.not_found(),
                format!("{} not found: {}", table.kind(), id),
            ),
            Err(e) => DomainError::database("Failed to check version", e),
        }
    }

    async fn delete_versioned(
        &mut self,
        table: Table,
        id: &str,
        expected: Version,
    ) -> Result<(), DomainError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND version = $2", table.name());
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(version_to_db(expected))
            .execute(&mut *self.tx)
            .await
            .map_err(db("Failed to delete row"))?;

        if result.rows_affected() == 0 {
            return Err(self.version_miss(table, id, expected).await);
        }
        Ok(())
    }

    async fn set_orders(
        &mut self,
        table: Table,
        ids: Vec<String>,
        orders: Vec<i32>,
    ) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "UPDATE {table} AS t SET disp_order = v.disp_order \
             FROM UNNEST($1::text[], $2::int4[]) AS v(id, disp_order) \
             WHERE t.id = v.id",
            table = table.name()
        );
        sqlx::query(&sql)
            .bind(ids)
            .bind(orders)
            .execute(&mut *self.tx)
            .await
            .map_err(db("Failed to update positions"))?;
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for PostgresStoreTransaction {
    async fn find_task(&mut self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1 FOR UPDATE", TASK_COLUMNS);
        let row: Option<TaskRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db("Failed to fetch task"))?;
        row.map(Task::try_from).transpose()
    }

    async fn locate_task(&mut self, id: &TaskId) -> Result<Option<BoardId>, DomainError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT board_id FROM tasks WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db("Failed to locate task"))?;
        row.map(|(board_id,)| board_id.parse::<BoardId>())
            .transpose()
            .map_err(|e| DomainError::database("Invalid board id in tasks row", e))
    }

    async fn tasks_on_board(&mut self, board_id: &BoardId) -> Result<Vec<Task>, DomainError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE board_id = $1 {} FOR UPDATE",
            TASK_COLUMNS, TASK_ORDER
        );
        let rows: Vec<TaskRow> = sqlx::query_as(&sql)
            .bind(board_id.as_str())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db("Failed to fetch board tasks"))?;
        convert_all(rows)
    }

    async fn tasks_assigned_to(&mut self, user_id: &UserId) -> Result<Vec<Task>, DomainError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE assignee_user_id = $1 {} FOR UPDATE",
            TASK_COLUMNS, TASK_ORDER
        );
        let rows: Vec<TaskRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db("Failed to fetch assigned tasks"))?;
        convert_all(rows)
    }

    async fn insert_task(&mut self, task: &Task) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, name, description, assignee_user_id, board_id,
                disp_order, created_at, is_closed, estimate_size, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(task.id().as_str())
        .bind(task.name())
        .bind(task.description())
        .bind(task.assignee().map(UserId::as_str))
        .bind(task.board_id().as_str())
        .bind(task.disp_order())
        .bind(task.created_at().as_datetime())
        .bind(task.is_closed())
        .bind(task.estimate_size())
        .bind(version_to_db(task.version()))
        .execute(&mut *self.tx)
        .await
        .map_err(db("Failed to insert task"))?;
        Ok(())
    }

    async fn update_task(&mut self, task: &Task, expected: Version) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks SET
                name = $3,
                description = $4,
                assignee_user_id = $5,
                board_id = $6,
                disp_order = $7,
                is_closed = $8,
                estimate_size = $9,
                version = $10
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(task.id().as_str())
        .bind(version_to_db(expected))
        .bind(task.name())
        .bind(task.description())
        .bind(task.assignee().map(UserId::as_str))
        .bind(task.board_id().as_str())
        .bind(task.disp_order())
        .bind(task.is_closed())
        .bind(task.estimate_size())
        .bind(version_to_db(task.version()))
        .execute(&mut *self.tx)
        .await
        .map_err(db("Failed to update task"))?;

        if result.rows_affected() == 0 {
            return Err(self.version_miss(Table::Tasks, task.id().as_str(), expected).await);
        }
        Ok(())
    }

    async fn set_task_orders(&mut self, orders: &[Slot<TaskId>]) -> Result<(), DomainError> {
        let ids = orders.iter().map(|s| s.key.as_str().to_string()).collect();
        let positions = orders.iter().map(|s| s.disp_order).collect();
        self.set_orders(Table::Tasks, ids, positions).await
    }

    async fn delete_task(&mut self, id: &TaskId, expected: Version) -> Result<(), DomainError> {
        self.delete_versioned(Table::Tasks, id.as_str(), expected).await
    }

    async fn find_board(&mut self, id: &BoardId) -> Result<Option<Board>, DomainError> {
        let sql = format!("SELECT {} FROM boards WHERE id = $1 FOR UPDATE", BOARD_COLUMNS);
        let row: Option<BoardRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db("Failed to fetch board"))?;
        row.map(Board::try_from).transpose()
    }

    async fn boards(&mut self) -> Result<Vec<Board>, DomainError> {
        let sql = format!(
            "SELECT {} FROM boards ORDER BY disp_order, name FOR UPDATE",
            BOARD_COLUMNS
        );
        let rows: Vec<BoardRow> = sqlx::query_as(&sql)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db("Failed to fetch boards"))?;
        convert_all(rows)
    }

    async fn insert_board(&mut self, board: &Board) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO boards (id, name, is_system, disp_order, version) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(board.id().as_str())
        .bind(board.name())
        .bind(board.is_system())
        .bind(board.disp_order())
        .bind(version_to_db(board.version()))
        .execute(&mut *self.tx)
        .await
        .map_err(db("Failed to insert board"))?;
        Ok(())
    }

    async fn update_board(&mut self, board: &Board, expected: Version) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE boards SET name = $3, disp_order = $4, version = $5 \
             WHERE id = $1 AND version = $2",
        )
        .bind(board.id().as_str())
        .bind(version_to_db(expected))
        .bind(board.name())
        .bind(board.disp_order())
        .bind(version_to_db(board.version()))
        .execute(&mut *self.tx)
        .await
        .map_err(db("Failed to update board"))?;

        if result.rows_affected() == 0 {
            return Err(self.version_miss(Table::Boards, board.id().as_str(), expected).await);
        }
        Ok(())
    }

    async fn set_board_orders(&mut self, orders: &[Slot<BoardId>]) -> Result<(), DomainError> {
        let ids = orders.iter().map(|s| s.key.as_str().to_string()).collect();
        let positions = orders.iter().map(|s| s.disp_order).collect();
        self.set_orders(Table::Boards, ids, positions).await
    }

    async fn delete_board(&mut self, id: &BoardId, expected: Version) -> Result<(), DomainError> {
        self.delete_versioned(Table::Boards, id.as_str(), expected).await
    }

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1 FOR UPDATE", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db("Failed to fetch user"))?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_name(&mut self, name: &str) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE name = $1 FOR UPDATE", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db("Failed to fetch user"))?;
        row.map(User::try_from).transpose()
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO users (id, name, password_hash, avatar, version) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id().as_str())
        .bind(user.name())
        .bind(user.password_hash().as_str())
        .bind(user.avatar())
        .bind(version_to_db(user.version()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_user_name(user.name())
            } else {
                DomainError::database("Failed to insert user", e)
            }
        })?;
        Ok(())
    }

    async fn update_user(&mut self, user: &User, expected: Version) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET name = $3, password_hash = $4, avatar = $5, version = $6
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(user.id().as_str())
        .bind(version_to_db(expected))
        .bind(user.name())
        .bind(user.password_hash().as_str())
        .bind(user.avatar())
        .bind(version_to_db(user.version()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_user_name(user.name())
            } else {
                DomainError::database("Failed to update user", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(self.version_miss(Table::Users, user.id().as_str(), expected).await);
        }
        Ok(())
    }

    async fn delete_user(&mut self, id: &UserId, expected: Version) -> Result<(), DomainError> {
        self.delete_versioned(Table::Users, id.as_str(), expected).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(db("Failed to commit transaction"))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(db("Failed to roll back transaction"))
    }
}
