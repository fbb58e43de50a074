use crate::is_unique_violation;
use freetunes_core::{error::Result, types::*, TunesError};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

const USER_COLUMNS: &str = "id, email, username, fullname, description, picture, \
                            is_active, is_banned, created_at, updated_at";

fn map_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        fullname: row.get("fullname"),
        description: row.get("description"),
        picture: row.get("picture"),
        is_active: row.get::<i64, _>("is_active") != 0,
        is_banned: row.get::<i64, _>("is_banned") != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_summary(row: &SqliteRow) -> UserSummary {
    UserSummary {
        id: row.get("id"),
        username: row.get("username"),
        fullname: row.get("fullname"),
        description: row.get("description"),
        picture: row.get("picture"),
    }
}

/// Create a new, not yet verified account
///
/// Username and e-mail must both be unused.
pub async fn create(pool: &SqlitePool, user: &CreateUser) -> Result<UserId> {
    if username_exists(pool, &user.username).await? {
        return Err(TunesError::invariant("Username already taken"));
    }
    if email_exists(pool, &user.email).await? {
        return Err(TunesError::invariant("Email already registered"));
    }

    let id = UserId::generate();
    let now = crate::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, username, password, fullname, is_active, is_banned,
                           created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 0, 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.fullname)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            TunesError::invariant("Username or email already taken")
        } else {
            e.into()
        }
    })?;

    Ok(id)
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(map_user))
}

/// Get user by e-mail address
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(map_user))
}

/// Look up login material by username or e-mail
pub async fn find_credentials(
    pool: &SqlitePool,
    username_or_email: &str,
) -> Result<Option<UserCredentials>> {
    let row = sqlx::query(
        "SELECT id, password, is_active FROM users WHERE username = ? OR email = ? LIMIT 1",
    )
    .bind(username_or_email)
    .bind(username_or_email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| UserCredentials {
        id: row.get("id"),
        password_hash: row.get("password"),
        is_active: row.get::<i64, _>("is_active") != 0,
    }))
}

fn expect_updated(result: sqlx::sqlite::SqliteQueryResult) -> Result<()> {
    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("User not found"));
    }
    Ok(())
}

/// Update the editable profile fields
pub async fn update_profile(pool: &SqlitePool, id: &UserId, update: &UpdateUser) -> Result<()> {
    let result = sqlx::query(
        "UPDATE users SET fullname = ?, description = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&update.fullname)
    .bind(&update.description)
    .bind(crate::now())
    .bind(id)
    .execute(pool)
    .await?;

    expect_updated(result)
}

pub async fn set_picture(pool: &SqlitePool, id: &UserId, location: &str) -> Result<()> {
    let result = sqlx::query("UPDATE users SET picture = ?, updated_at = ? WHERE id = ?")
        .bind(location)
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await?;

    expect_updated(result)
}

/// Mark the account as verified
pub async fn activate(pool: &SqlitePool, id: &UserId) -> Result<()> {
    let result = sqlx::query("UPDATE users SET is_active = 1, updated_at = ? WHERE id = ?")
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await?;

    expect_updated(result)
}

pub async fn update_password(pool: &SqlitePool, id: &UserId, password_hash: &str) -> Result<()> {
    let result = sqlx::query("UPDATE users SET password = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await?;

    expect_updated(result)
}

/// Change the e-mail address of an account that is not verified yet
pub async fn update_email(pool: &SqlitePool, id: &UserId, email: &str) -> Result<()> {
    let user = get_by_id(pool, id)
        .await?
        .ok_or_else(|| TunesError::not_found("User not found"))?;

    if user.is_active {
        return Err(TunesError::invariant(
            "Email can only be changed before the account is verified",
        ));
    }
    if user.email != email && email_exists(pool, email).await? {
        return Err(TunesError::invariant("Email already registered"));
    }

    let result = sqlx::query("UPDATE users SET email = ?, updated_at = ? WHERE id = ?")
        .bind(email)
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TunesError::invariant("Email already registered")
            } else {
                e.into()
            }
        })?;

    expect_updated(result)
}

/// Ban or unban an account
pub async fn set_banned(pool: &SqlitePool, id: &UserId, banned: bool) -> Result<()> {
    let result = sqlx::query("UPDATE users SET is_banned = ?, updated_at = ? WHERE id = ?")
        .bind(i64::from(banned))
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await?;

    expect_updated(result)
}

/// Search active, non-banned users
pub async fn search(pool: &SqlitePool, filter: &UserFilter, page: Page) -> Result<Vec<UserSummary>> {
    let page = page.normalized();
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, username, fullname, description, picture FROM users \
         WHERE is_active = 1 AND is_banned = 0",
    );

    if let Some(fullname) = criterion(filter.fullname.as_ref()) {
        qb.push(" AND fullname LIKE '%' || ")
            .push_bind(fullname.to_owned())
            .push(" || '%'");
    }
    if let Some(username) = criterion(filter.username.as_ref()) {
        qb.push(" AND username LIKE '%' || ")
            .push_bind(username.to_owned())
            .push(" || '%'");
    }

    qb.push(" ORDER BY username LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);

    let rows = qb.build().fetch_all(pool).await?;
    Ok(rows.iter().map(map_summary).collect())
}

/// Active, non-banned users ordered by follower count
pub async fn popular(pool: &SqlitePool, page: Page) -> Result<Vec<PopularUser>> {
    let page = page.normalized();
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, u.fullname, u.description, u.picture,
               COUNT(f.id) AS followers
        FROM users u
        LEFT JOIN follower_artist f ON f.artist_id = u.id
        WHERE u.is_active = 1 AND u.is_banned = 0
        GROUP BY u.id
        ORDER BY followers DESC, u.username ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| PopularUser {
            user: map_summary(row),
            followers: row.get("followers"),
        })
        .collect())
}

/// Artists the user follows, banned accounts excluded
pub async fn followed_by(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<UserSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, u.fullname, u.description, u.picture
        FROM follower_artist f
        JOIN users u ON u.id = f.artist_id
        WHERE f.user_id = ? AND u.is_banned = 0
        ORDER BY u.username
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_summary).collect())
}

/// Number of distinct songs the user has played
pub async fn listened_count(pool: &SqlitePool, user_id: &UserId) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS total FROM history WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get("total"))
}

/// Number of songs the user has liked
pub async fn liked_count(pool: &SqlitePool, user_id: &UserId) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS total FROM user_song_likes WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get("total"))
}
