//! PostgreSQL integration tests
//!
//! These tests start a PostgreSQL container and need a running Docker daemon.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;
use std::time::Duration;

use domain::{Money, OrderCart, OrderIdGenerator, OrderNumber, RandomOrderIds, SubmittedOrder};
use order_store::{OrderStore, PersistenceError, PostgresOrderStore};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool, schema ensured and table cleared
async fn get_test_store() -> PostgresOrderStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    let store = PostgresOrderStore::new(pool);
    store.ensure_schema().await.unwrap();

    sqlx::query("TRUNCATE TABLE orders RESTART IDENTITY")
        .execute(store.pool())
        .await
        .unwrap();

    store
}

async fn row_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn three_beers() -> SubmittedOrder {
    let mut cart = OrderCart::new();
    for _ in 0..3 {
        cart.add_item("BIER", "Feldschlösschen", Money::new(5)).unwrap();
    }
    SubmittedOrder::from_cart(RandomOrderIds::new().next(), &cart)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn insert_batch_and_read_back() {
    let store = get_test_store().await;
    let order = three_beers();

    let written = store.insert_batch(&order).await.unwrap();
    assert_eq!(written, 1);

    let rows = store.lines_for_order(order.order_number()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, "BIER");
    assert_eq!(rows[0].product, "Feldschlösschen");
    assert_eq!(rows[0].quantity, 3);
    assert_eq!(rows[0].unit_price, 5);
    assert_eq!(rows[0].total_price, 15);
    assert_eq!(rows[0].timestamp, order.timestamp_iso());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn every_line_shares_order_number() {
    let store = get_test_store().await;

    let mut cart = OrderCart::new();
    cart.add_item("BIER", "Pabst", Money::new(5)).unwrap();
    cart.add_item("ESSEN", "Hot Dog", Money::new(5)).unwrap();
    cart.add_item("DIVERSES", "Aperol Spritz", Money::new(10)).unwrap();
    let order = SubmittedOrder::from_cart(RandomOrderIds::new().next(), &cart);

    store.insert_batch(&order).await.unwrap();

    let rows = store.lines_for_order(order.order_number()).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.order_number == order.order_number().as_str()));
    assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn ensure_schema_is_idempotent() {
    let store = get_test_store().await;
    store.ensure_schema().await.unwrap();
    store.ensure_schema().await.unwrap();
    assert_eq!(row_count(store.pool()).await, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn failed_batch_leaves_table_unchanged() {
    let store = get_test_store().await;
    store.insert_batch(&three_beers()).await.unwrap();

    // Break the table mid-batch: the second row violates a new constraint.
    sqlx::query("ALTER TABLE orders ADD CONSTRAINT no_hot_dogs CHECK (product <> 'Hot Dog')")
        .execute(store.pool())
        .await
        .unwrap();

    let mut cart = OrderCart::new();
    cart.add_item("BIER", "Pabst", Money::new(5)).unwrap();
    cart.add_item("ESSEN", "Hot Dog", Money::new(5)).unwrap();
    let order = SubmittedOrder::from_cart(RandomOrderIds::new().next(), &cart);

    let err = store.insert_batch(&order).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Database(_)));
    assert_eq!(row_count(store.pool()).await, 1);
    assert!(store.lines_for_order(order.order_number()).await.unwrap().is_empty());

    sqlx::query("ALTER TABLE orders DROP CONSTRAINT no_hot_dogs")
        .execute(store.pool())
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn lock_contention_surfaces_as_timeout() {
    let store = get_test_store()
        .await
        .with_statement_timeout(Duration::from_millis(300));

    let mut blocker = store.pool().begin().await.unwrap();
    sqlx::query("LOCK TABLE orders IN ACCESS EXCLUSIVE MODE")
        .execute(&mut *blocker)
        .await
        .unwrap();

    let order = three_beers();
    let err = store.insert_batch(&order).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Timeout(_)));

    blocker.rollback().await.unwrap();
    assert!(
        store
            .lines_for_order(&OrderNumber::from(order.order_number().as_str()))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn slow_commit_is_awaited_past_the_insert_bound() {
    let store = get_test_store()
        .await
        .with_statement_timeout(Duration::from_millis(200));

    // A deferred trigger runs at COMMIT and outlasts the insert bound.
    sqlx::raw_sql(
        r#"
        CREATE OR REPLACE FUNCTION slow_commit() RETURNS trigger AS $$
        BEGIN
            PERFORM pg_sleep(0.6);
            RETURN NULL;
        END
        $$ LANGUAGE plpgsql;

        CREATE CONSTRAINT TRIGGER slow_commit
            AFTER INSERT ON orders
            DEFERRABLE INITIALLY DEFERRED
            FOR EACH ROW EXECUTE FUNCTION slow_commit();
        "#,
    )
    .execute(store.pool())
    .await
    .unwrap();

    let order = three_beers();
    let result = store.insert_batch(&order).await;

    sqlx::raw_sql("DROP TRIGGER slow_commit ON orders; DROP FUNCTION slow_commit();")
        .execute(store.pool())
        .await
        .unwrap();

    assert_eq!(result.unwrap(), 1);
    assert_eq!(
        store.lines_for_order(order.order_number()).await.unwrap().len(),
        1
    );
}
