use sqlx::PgConnection;

use crate::models::user::{RoleTarget, UserRole};
use crate::utils::error::AppError;

/// Ensure `user_id` holds the `target` capability, upgrading the stored role
/// label when the user currently holds only the other single role.
///
/// Runs on the caller's transaction connection: the membership insert and the
/// label update must commit or roll back with the surrounding operation. No
/// row lock is taken; two concurrent upgrades for one user can at worst lose
/// a label write, which the next call repairs.
pub async fn ensure_role(
    conn: &mut PgConnection,
    user_id: i64,
    target: RoleTarget,
) -> Result<UserRole, AppError> {
    let stored: Option<String> =
        sqlx::query_scalar("SELECT user_type FROM app_user WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

    let stored = stored.ok_or_else(|| AppError::NotFound(format!("User {} does not exist", user_id)))?;

    let current = UserRole::parse(&stored).ok_or_else(|| {
        AppError::InternalServerError(format!("User {} has unrecognized role '{}'", user_id, stored))
    })?;

    ensure_membership(conn, user_id, target).await?;

    let next = current.upgraded_with(target);
    if next != current {
        sqlx::query("UPDATE app_user SET user_type = $1 WHERE user_id = $2")
            .bind(next.as_str())
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        tracing::info!(
            user_id,
            from = current.as_str(),
            to = next.as_str(),
            "User role upgraded"
        );
    }

    Ok(next)
}

async fn ensure_membership(
    conn: &mut PgConnection,
    user_id: i64,
    target: RoleTarget,
) -> Result<(), AppError> {
    let (probe, insert) = match target {
        RoleTarget::Customer => (
            "SELECT user_id FROM customer WHERE user_id = $1",
            "INSERT INTO customer (user_id) VALUES ($1)",
        ),
        RoleTarget::Organizer => (
            "SELECT user_id FROM organizer WHERE user_id = $1",
            "INSERT INTO organizer (user_id) VALUES ($1)",
        ),
    };

    let existing: Option<i64> = sqlx::query_scalar(probe)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    if existing.is_none() {
        sqlx::query(insert).bind(user_id).execute(&mut *conn).await?;
        tracing::debug!(user_id, ?target, "Inserted membership row");
    }

    Ok(())
}
