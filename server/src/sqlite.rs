//! SQLite-backed `TodoStore`.
//!
//! # Design
//! Every trait method is a single SQL statement, so SQLite's per-statement
//! atomicity is the only transaction boundary needed. List filters are
//! compiled from `Filter::conditions` into a `WHERE` clause with bound
//! parameters; column names come from `Field::as_str`, never from input.
//!
//! The table is created on connect if missing. There are no migrations.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use todo_core::{CreateTodo, Filter, FilterValue, StoreError, Todo, TodoStore};
use tracing::info;

const COLUMNS: &str = "id, title, description, completed, deadline_at, created_at, updated_at";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    completed BOOLEAN NOT NULL DEFAULT 0,
    deadline_at DATETIME,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL
)";

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: String,
    completed: bool,
    deadline_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            deadline_at: row.deadline_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // each connection to an in-memory database would see its own copy
        let max_connections = if url.contains(":memory:") || url.contains("mode=memory") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!(url, "connected to sqlite");
        Ok(Self { pool })
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn insert(&self, input: CreateTodo, now: NaiveDateTime) -> Result<Todo, StoreError> {
        let sql = format!(
            "INSERT INTO todos (title, description, completed, deadline_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );
        let row: TodoRow = sqlx::query_as(&sql)
            .bind(input.title)
            .bind(input.description)
            .bind(input.completed)
            .bind(input.deadline_at)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.into())
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM todos WHERE id = ?");
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(Todo::from))
    }

    async fn query(&self, filter: &Filter) -> Result<Vec<Todo>, StoreError> {
        let mut builder = select_matching(filter);
        let rows: Vec<TodoRow> = builder
            .build_query_as::<TodoRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, StoreError> {
        let sql = format!(
            "UPDATE todos SET title = ?, description = ?, completed = ?, deadline_at = ?, \
             created_at = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        );
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.completed)
            .bind(todo.deadline_at)
            .bind(todo.created_at)
            .bind(todo.updated_at)
            .bind(todo.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(Todo::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(result.rows_affected() > 0)
    }
}

/// `SELECT ... WHERE <conditions> ORDER BY id` for a filter.
fn select_matching(filter: &Filter) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!("SELECT {COLUMNS} FROM todos"));
    for (i, condition) in filter.conditions().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(condition.field.as_str());
        builder.push(format_args!(" {} ", condition.op.as_sql()));
        match &condition.value {
            FilterValue::Int(value) => builder.push_bind(*value),
            FilterValue::Text(value) => builder.push_bind(value.clone()),
            FilterValue::Bool(value) => builder.push_bind(*value),
            FilterValue::Timestamp(value) => builder.push_bind(*value),
        };
    }
    builder.push(" ORDER BY id");
    builder
}
