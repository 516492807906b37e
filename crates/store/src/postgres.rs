use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ProductId, Version};
use domain::Product;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use crate::{
    CommitPlan, InsertOp, OutboxRow, ProductRow, Result, StoreError,
    executor::{CommitExecutor, ProductStore},
    plan::ConditionalUpdate,
};

/// PostgreSQL-backed catalog store and commit executor.
///
/// Atomicity comes entirely from the database transaction; the only logic
/// layered on top is the rows-affected check that turns a stale conditional
/// update into `ConcurrentModification`.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let image = ProductRow {
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            base_price_numerator: row.try_get("base_price_numerator")?,
            base_price_denominator: row.try_get("base_price_denominator")?,
            discount_percent: row.try_get("discount_percent")?,
            discount_start_date: row.try_get("discount_start_date")?,
            discount_end_date: row.try_get("discount_end_date")?,
            status: row.try_get("status")?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            archived_at: row.try_get::<Option<DateTime<Utc>>, _>("archived_at")?,
        };
        image.into_product()
    }

    fn build_update(update: &ConditionalUpdate) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE products SET version = version + 1");
        let set = &update.set;
        if let Some(name) = &set.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &set.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(category) = &set.category {
            qb.push(", category = ").push_bind(category);
        }
        if let Some((numerator, denominator)) = set.base_price {
            qb.push(", base_price_numerator = ").push_bind(numerator);
            qb.push(", base_price_denominator = ").push_bind(denominator);
        }
        match set.discount {
            Some(Some(d)) => {
                qb.push(", discount_percent = ").push_bind(d.percent);
                qb.push(", discount_start_date = ").push_bind(d.start_date);
                qb.push(", discount_end_date = ").push_bind(d.end_date);
            }
            Some(None) => {
                qb.push(
                    ", discount_percent = NULL, discount_start_date = NULL, \
                     discount_end_date = NULL",
                );
            }
            None => {}
        }
        if let Some(status) = &set.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(updated_at) = set.updated_at {
            qb.push(", updated_at = ").push_bind(updated_at);
        }
        if let Some(archived_at) = set.archived_at {
            qb.push(", archived_at = ").push_bind(archived_at);
        }
        qb.push(" WHERE product_id = ")
            .push_bind(update.product_id.as_str());
        qb.push(" AND version = ")
            .push_bind(update.expected_version.as_i64());
        qb
    }
}

#[async_trait]
impl ProductStore for PostgresCatalog {
    async fn get(&self, id: &ProductId) -> Result<Product> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT product_id, name, description, category,
                   base_price_numerator, base_price_denominator,
                   discount_percent, discount_start_date, discount_end_date,
                   status, version, created_at, updated_at, archived_at
            FROM products
            WHERE product_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}

#[async_trait]
impl CommitExecutor for PostgresCatalog {
    async fn execute(&self, plan: CommitPlan) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Conditional updates first; any row-count mismatch aborts the whole
        // transaction before a single insert lands.
        for update in plan.updates() {
            let result = Self::build_update(update).build().execute(&mut *tx).await?;
            if result.rows_affected() != 1 {
                metrics::counter!("catalog_commit_conflicts").increment(1);
                tracing::warn!(
                    product_id = %update.product_id,
                    expected_version = %update.expected_version,
                    rows_affected = result.rows_affected(),
                    "conditional update missed its expected version"
                );
                return Err(StoreError::ConcurrentModification {
                    product_id: update.product_id.clone(),
                    expected_version: update.expected_version,
                });
            }
        }

        for op in plan.inserts() {
            match op {
                InsertOp::Product(row) => insert_product(&mut tx, row).await?,
                InsertOp::Outbox(row) => insert_outbox(&mut tx, row).await?,
            }
        }

        tx.commit().await?;
        metrics::counter!("catalog_commits_applied").increment(1);
        Ok(())
    }
}

async fn insert_product(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    row: &ProductRow,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO products (
            product_id, name, description, category,
            base_price_numerator, base_price_denominator,
            discount_percent, discount_start_date, discount_end_date,
            status, version, created_at, updated_at, archived_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(row.product_id.as_str())
    .bind(&row.name)
    .bind(&row.description)
    .bind(&row.category)
    .bind(row.base_price_numerator)
    .bind(row.base_price_denominator)
    .bind(row.discount_percent)
    .bind(row.discount_start_date)
    .bind(row.discount_end_date)
    .bind(&row.status)
    .bind(row.version)
    .bind(row.created_at)
    .bind(row.updated_at)
    .bind(row.archived_at)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(_) => Ok(()),
        // A unique-key hit on the primary key is a creation race, reported
        // the same way a stale conditional update is.
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            metrics::counter!("catalog_commit_conflicts").increment(1);
            tracing::warn!(
                product_id = %row.product_id,
                "product row already exists"
            );
            Err(StoreError::ConcurrentModification {
                product_id: row.product_id.clone(),
                expected_version: Version::new(0),
            })
        }
        Err(e) => Err(e.into()),
    }
}

async fn insert_outbox(tx: &mut sqlx::Transaction<'_, Postgres>, row: &OutboxRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO outbox_events (
            event_id, event_type, aggregate_id, payload, status, created_at, processed_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(row.event_id.as_uuid())
    .bind(&row.event_type)
    .bind(row.aggregate_id.as_str())
    .bind(&row.payload)
    .bind(&row.status)
    .bind(row.created_at)
    .bind(row.processed_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
