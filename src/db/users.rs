//! User Repository

use sqlx::PgPool;

use crate::models::user::User;

pub async fn create(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Login lookup: the identifier matches either username or email.
pub async fn find_by_username_or_email(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1 OR email = $1")
        .bind(identifier)
        .fetch_optional(pool)
        .await
}

/// Uniqueness check for registration and profile updates; `exclude`
/// skips the caller's own row.
pub async fn username_or_email_taken(
    pool: &PgPool,
    username: Option<&str>,
    email: Option<&str>,
    exclude: Option<i32>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE (username = $1 OR email = $2)
              AND ($3::int IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(exclude)
    .fetch_one(pool)
    .await
}

/// Partial update; absent fields keep their current values.
pub async fn update(
    pool: &PgPool,
    id: i32,
    username: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            username = COALESCE($2, username),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
}

/// Deletes a user and their favorites in one transaction.
pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM user_pokemon WHERE user_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(
    pool: &PgPool,
    page: u32,
    per_page: u32,
) -> Result<(Vec<User>, i64), sqlx::Error> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id LIMIT $1 OFFSET $2")
        .bind(per_page as i64)
        .bind(page.saturating_sub(1) as i64 * per_page as i64)
        .fetch_all(pool)
        .await?;
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok((users, total))
}
