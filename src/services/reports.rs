use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::models::session::OpenSession;
use crate::utils::error::AppError;

/// Row shape of `cal_revenue`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionRevenue {
    pub session_id: i64,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RevenueStats {
    pub total_revenue: Decimal,
    pub detail: Vec<SessionRevenue>,
}

pub async fn open_sessions(pool: &PgPool, event_id: i64) -> Result<Vec<OpenSession>, AppError> {
    let rows = sqlx::query_as("SELECT * FROM sp_get_open_sessions($1)")
        .bind(event_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn event_revenue(
    pool: &PgPool,
    event_id: i64,
    min_revenue: Decimal,
) -> Result<Vec<SessionRevenue>, AppError> {
    let rows = sqlx::query_as("SELECT * FROM cal_revenue($1, $2)")
        .bind(event_id)
        .bind(min_revenue)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn organizer_revenue(
    pool: &PgPool,
    organizer_id: i64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Decimal, AppError> {
    let total = sqlx::query_scalar("SELECT calculate_organizer_revenue($1, $2, $3)")
        .bind(organizer_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn customer_ticket_count(
    pool: &PgPool,
    customer_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<i32, AppError> {
    let count = sqlx::query_scalar("SELECT count_customer_tickets($1, $2, $3)")
        .bind(customer_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Overall revenue of an event: `cal_revenue` with no floor, summed here.
pub async fn revenue_stats(pool: &PgPool, event_id: i64) -> Result<RevenueStats, AppError> {
    let detail = event_revenue(pool, event_id, Decimal::ZERO).await?;
    let total_revenue = detail.iter().map(|row| row.revenue).sum();
    Ok(RevenueStats {
        total_revenue,
        detail,
    })
}
