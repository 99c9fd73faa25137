use crate::domain::{models::table::Table, ports::TableRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTableRepo {
    pool: SqlitePool,
}

impl SqliteTableRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableRepository for SqliteTableRepo {
    async fn upsert_many(&self, wedding_id: &str, tables: &[(String, i32)]) -> Result<Vec<Table>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut saved = Vec::with_capacity(tables.len());

        for (name, capacity) in tables {
            let table = Table::new(wedding_id.to_string(), name.clone(), *capacity);
            let row = sqlx::query_as::<_, Table>(
                "INSERT INTO seating_tables (id, wedding_id, name, capacity, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT (wedding_id, name) DO UPDATE SET capacity = excluded.capacity, updated_at = excluded.updated_at
                 RETURNING *"
            )
                .bind(&table.id)
                .bind(&table.wedding_id)
                .bind(&table.name)
                .bind(table.capacity)
                .bind(table.created_at)
                .bind(table.updated_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            saved.push(row);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }
}
