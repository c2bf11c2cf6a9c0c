// review_service/src/models/case_record.rs

use chrono::{DateTime, Utc};
use review_gate::{Case, Guarantee, ReviewError};
use sqlx::FromRow;

/// A row of `review_cases`. Enum columns are stored as their snake_case names.
#[derive(Debug, Clone, FromRow)]
pub struct CaseRecord {
  pub order_id: String,
  pub code: Option<String>,
  pub status: String,
  pub positive_action: String,
  pub negative_action: String,
  pub guarantee: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<&Case> for CaseRecord {
  fn from(case: &Case) -> Self {
    Self {
      order_id: case.order_id.clone(),
      code: case.code.clone(),
      status: case.status.as_str().to_string(),
      positive_action: case.positive_action.as_str().to_string(),
      negative_action: case.negative_action.as_str().to_string(),
      guarantee: case.guarantee.map(|g| g.as_str().to_string()),
      created_at: case.created_at,
      updated_at: case.updated_at,
    }
  }
}

impl TryFrom<CaseRecord> for Case {
  type Error = ReviewError;

  fn try_from(row: CaseRecord) -> Result<Self, Self::Error> {
    Ok(Case {
      status: row.status.parse()?,
      positive_action: row.positive_action.parse()?,
      negative_action: row.negative_action.parse()?,
      guarantee: row.guarantee.as_deref().map(str::parse::<Guarantee>).transpose()?,
      order_id: row.order_id,
      code: row.code,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}
