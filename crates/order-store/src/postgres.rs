use std::time::{Duration, Instant};

use async_trait::async_trait;
use domain::{OrderNumber, SubmittedOrder};
use sqlx::{
    PgPool, Postgres, Row, Transaction,
    postgres::{PgPoolOptions, PgRow},
};

use crate::{
    PersistenceError, Result,
    store::{OrderStore, StoredOrderLine, validate_batch},
};

/// Upper bound on staging a single batch insert unless configured otherwise.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    /// Opens a connection pool to `url`.
    ///
    /// `timeout` bounds acquiring a connection and staging each batch insert.
    pub async fn connect(url: &str, max_connections: u32, timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(url)
            .await?;

        Ok(Self::new(pool).with_statement_timeout(timeout))
    }

    /// Sets the bound on beginning a batch and inserting its lines.
    ///
    /// The final COMMIT is not bounded.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begins a transaction and inserts every line without committing.
    async fn stage_lines(&self, order: &SubmittedOrder) -> Result<Transaction<'static, Postgres>> {
        let order_number = order.order_number().as_str();
        let timestamp = order.timestamp_iso();

        let mut tx = self.pool.begin().await?;

        for line in order.lines() {
            let row = StoredOrderLine::from_line(0, order, line)?;

            sqlx::query(
                r#"
                INSERT INTO orders (order_number, timestamp, category, product, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6::NUMERIC, $7::NUMERIC)
                "#,
            )
            .bind(order_number)
            .bind(&timestamp)
            .bind(&row.category)
            .bind(&row.product)
            .bind(row.quantity)
            .bind(row.unit_price)
            .bind(row.total_price)
            .execute(&mut *tx)
            .await?;
        }

        Ok(tx)
    }

    async fn insert_in_transaction(&self, order: &SubmittedOrder) -> Result<usize> {
        // Dropping the staged transaction on timeout rolls it back.
        let tx = tokio::time::timeout(self.statement_timeout, self.stage_lines(order))
            .await
            .unwrap_or(Err(PersistenceError::Timeout(self.statement_timeout)))?;

        // COMMIT is not bounded; its reply decides the result.
        tx.commit().await?;
        Ok(order.line_count())
    }

    fn row_to_line(row: PgRow) -> Result<StoredOrderLine> {
        Ok(StoredOrderLine {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            timestamp: row.try_get("timestamp")?,
            category: row.try_get("category")?,
            product: row.try_get("product")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            total_price: row.try_get("total_price")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(include_str!("../../../migrations/001_create_orders_table.sql"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number(), lines = order.line_count()))]
    async fn insert_batch(&self, order: &SubmittedOrder) -> Result<usize> {
        validate_batch(order)?;

        let started = Instant::now();
        let result = self.insert_in_transaction(order).await;

        metrics::histogram!("order_store_insert_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        if let Err(ref e) = result {
            tracing::warn!(error = %e, "order batch rolled back");
        }
        result
    }

    async fn lines_for_order(&self, order_number: &OrderNumber) -> Result<Vec<StoredOrderLine>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_number, timestamp, category, product, quantity,
                   unit_price::BIGINT AS unit_price, total_price::BIGINT AS total_price
            FROM orders
            WHERE order_number = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_number.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_line).collect()
    }
}
