use crate::domain::{models::wedding::Wedding, ports::WeddingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresWeddingRepo {
    pool: PgPool,
}

impl PostgresWeddingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeddingRepository for PostgresWeddingRepo {
    async fn create(&self, wedding: &Wedding) -> Result<Wedding, AppError> {
        sqlx::query_as::<_, Wedding>(
            "INSERT INTO weddings (id, slug, couple_names, wedding_date, timezone, default_rsvp_deadline, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"
        )
            .bind(&wedding.id)
            .bind(&wedding.slug)
            .bind(&wedding.couple_names)
            .bind(wedding.wedding_date)
            .bind(&wedding.timezone)
            .bind(wedding.default_rsvp_deadline)
            .bind(wedding.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Wedding>, AppError> {
        sqlx::query_as::<_, Wedding>("SELECT * FROM weddings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Wedding>, AppError> {
        sqlx::query_as::<_, Wedding>("SELECT * FROM weddings WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
