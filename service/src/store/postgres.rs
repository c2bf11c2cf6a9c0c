// review_service/src/store/postgres.rs

use anyhow::Context;
use async_trait::async_trait;
use review_gate::{Case, CaseStore, HoldFlag, InsertOutcome, Order, OrderAttributes, OrderGateway, OrderState};
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::models::CaseRecord;

const SCHEMA: &str = include_str!("../../schema.sql");

/// Creates the tables when they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
  sqlx::raw_sql(SCHEMA).execute(pool).await?;
  Ok(())
}

/// `review_cases` access. Uniqueness of `order_id` is enforced by the table.
#[derive(Clone)]
pub struct PgCaseStore {
  pool: PgPool,
}

impl PgCaseStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CaseStore for PgCaseStore {
  async fn exists(&self, order_id: &str) -> anyhow::Result<bool> {
    let found: Option<(i32,)> = sqlx::query_as(r#"SELECT 1 FROM review_cases WHERE order_id = $1"#)
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(found.is_some())
  }

  #[instrument(skip_all, fields(order_id = %case.order_id))]
  async fn insert_new(&self, case: &Case) -> anyhow::Result<InsertOutcome> {
    let row = CaseRecord::from(case);
    let result = sqlx::query(
      r#"
      INSERT INTO review_cases
        (order_id, code, status, positive_action, negative_action, guarantee, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
      ON CONFLICT (order_id) DO NOTHING
      "#,
    )
    .bind(&row.order_id)
    .bind(&row.code)
    .bind(&row.status)
    .bind(&row.positive_action)
    .bind(&row.negative_action)
    .bind(&row.guarantee)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() > 0 {
      Ok(InsertOutcome::Inserted)
    } else {
      debug!("Case row already present.");
      Ok(InsertOutcome::Conflict)
    }
  }

  async fn find(&self, order_id: &str) -> anyhow::Result<Option<Case>> {
    let row: Option<CaseRecord> = sqlx::query_as(
      r#"
      SELECT order_id, code, status, positive_action, negative_action, guarantee, created_at, updated_at
      FROM review_cases WHERE order_id = $1
      "#,
    )
    .bind(order_id)
    .fetch_optional(&self.pool)
    .await?;

    row
      .map(Case::try_from)
      .transpose()
      .with_context(|| format!("malformed review_cases row for order '{}'", order_id))
  }

  #[instrument(skip_all, fields(order_id = %case.order_id))]
  async fn record_submission(&self, case: &Case) -> anyhow::Result<bool> {
    let row = CaseRecord::from(case);
    let result = sqlx::query(
      r#"
      UPDATE review_cases
      SET code = $2, status = $3, updated_at = $4
      WHERE order_id = $1 AND status = 'new'
      "#,
    )
    .bind(&row.order_id)
    .bind(&row.code)
    .bind(&row.status)
    .bind(row.updated_at)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      debug!("Case no longer new; submission not recorded.");
      return Ok(false);
    }
    Ok(true)
  }
}

/// Mirrors order snapshots into `orders` and applies holds there.
///
/// The first write of an order inserts its snapshot. After that, backfilled
/// attributes are written with `COALESCE` so a stored value is never
/// overwritten, and only `hold` changes the stored state.
#[derive(Clone)]
pub struct PgOrderGateway {
  pool: PgPool,
}

impl PgOrderGateway {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn insert_if_absent(&self, order: &Order) -> Result<(), sqlx::Error> {
    let hold_flag = match order.hold_flag {
      HoldFlag::Unset => "unset",
      HoldFlag::Allowed => "allowed",
      HoldFlag::Disallowed => "disallowed",
    };

    sqlx::query(
      r#"
      INSERT INTO orders
        (id, store_code, state, payment_method, email_sent, hold_flag, origin_store_code, x_forwarded_for, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
      ON CONFLICT (id) DO NOTHING
      "#,
    )
    .bind(&order.id)
    .bind(&order.store_code)
    .bind(order.state.as_str())
    .bind(&order.payment_method)
    .bind(order.email_sent)
    .bind(hold_flag)
    .bind(&order.origin_store_code)
    .bind(&order.x_forwarded_for)
    .execute(&self.pool)
    .await?;
    Ok(())
  }
}

#[async_trait]
impl OrderGateway for PgOrderGateway {
  async fn stored_attributes(&self, order_id: &str) -> anyhow::Result<OrderAttributes> {
    let row: Option<(Option<String>, Option<String>)> =
      sqlx::query_as(r#"SELECT origin_store_code, x_forwarded_for FROM orders WHERE id = $1"#)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

    Ok(
      row
        .map(|(origin_store_code, x_forwarded_for)| OrderAttributes {
          origin_store_code,
          x_forwarded_for,
        })
        .unwrap_or_default(),
    )
  }

  #[instrument(skip_all, fields(order_id = %order.id))]
  async fn save_attributes(&self, order: &Order) -> anyhow::Result<()> {
    self.insert_if_absent(order).await?;
    sqlx::query(
      r#"
      UPDATE orders SET
        origin_store_code = COALESCE(NULLIF(origin_store_code, ''), $2),
        x_forwarded_for = COALESCE(NULLIF(x_forwarded_for, ''), $3),
        updated_at = NOW()
      WHERE id = $1
      "#,
    )
    .bind(&order.id)
    .bind(&order.origin_store_code)
    .bind(&order.x_forwarded_for)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  #[instrument(skip_all, fields(order_id = %order.id))]
  async fn hold(&self, order: &Order) -> anyhow::Result<()> {
    self.insert_if_absent(order).await?;
    sqlx::query(r#"UPDATE orders SET state = $2, updated_at = NOW() WHERE id = $1"#)
      .bind(&order.id)
      .bind(OrderState::Held.as_str())
      .execute(&self.pool)
      .await?;
    debug!("Order state persisted as held.");
    Ok(())
  }
}
