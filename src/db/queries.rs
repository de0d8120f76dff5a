use crate::db::models::{Category, Donor, PrayerDay, PrayerSchedule, User};
use sqlx::{PgPool, Result};
use uuid::Uuid;

/// Postgres unique-violation (23505). The unique index on
/// `donors.payment_ref_id` is the authority for idempotent confirmation;
/// callers map this to their conflict error.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

// --- Donor Queries ---

pub async fn insert_donor(pool: &PgPool, donor: &Donor) -> Result<Donor> {
    sqlx::query_as::<_, Donor>(
        r#"
        INSERT INTO donors (
            id, user_id, name, number, email, category, amount,
            payment_method, payment_ref_id, payment_date, status, receipt_url
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(donor.id)
    .bind(&donor.user_id)
    .bind(&donor.name)
    .bind(&donor.number)
    .bind(&donor.email)
    .bind(&donor.category)
    .bind(&donor.amount)
    .bind(&donor.payment_method)
    .bind(&donor.payment_ref_id)
    .bind(donor.payment_date)
    .bind(&donor.status)
    .bind(&donor.receipt_url)
    .fetch_one(pool)
    .await
}

pub async fn find_donor_by_payment_ref(
    pool: &PgPool,
    payment_ref_id: &str,
) -> Result<Option<Donor>> {
    sqlx::query_as::<_, Donor>("SELECT * FROM donors WHERE payment_ref_id = $1")
        .bind(payment_ref_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_donors(pool: &PgPool) -> Result<Vec<Donor>> {
    sqlx::query_as::<_, Donor>("SELECT * FROM donors ORDER BY payment_date DESC")
        .fetch_all(pool)
        .await
}

pub async fn list_donations_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<Donor>> {
    sqlx::query_as::<_, Donor>(
        "SELECT * FROM donors WHERE user_id = $1 ORDER BY payment_date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

// --- Category Queries ---

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn find_category_by_name(pool: &PgPool, name: &str) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn insert_category(pool: &PgPool, category: &Category) -> Result<Category> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(category.id)
    .bind(&category.name)
    .fetch_one(pool)
    .await
}

pub async fn update_category(pool: &PgPool, id: Uuid, name: &str) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn delete_category(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// --- User Queries ---

pub async fn insert_user(pool: &PgPool, user: &User) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (
            id, unique_id, full_name, email, phone, photo,
            password_hash, role, session_active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&user.unique_id)
    .bind(&user.full_name)
    .bind(&user.email)
    .bind(&user.phone)
    .bind(&user.photo)
    .bind(&user.password_hash)
    .bind(&user.role)
    .bind(user.session_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(pool)
    .await
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at")
        .fetch_all(pool)
        .await
}

pub async fn update_user_profile(
    pool: &PgPool,
    email: &str,
    full_name: Option<&str>,
    phone: Option<&str>,
    photo: Option<&str>,
) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            full_name = COALESCE($2, full_name),
            phone = COALESCE($3, phone),
            photo = COALESCE($4, photo),
            updated_at = NOW()
        WHERE email = $1
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(full_name)
    .bind(phone)
    .bind(photo)
    .fetch_optional(pool)
    .await
}

pub async fn set_session_active(pool: &PgPool, unique_id: &str, active: bool) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET session_active = $2, updated_at = NOW() WHERE unique_id = $1",
    )
    .bind(unique_id)
    .bind(active)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// --- Prayer Schedule Queries ---

pub async fn list_prayer_schedules(pool: &PgPool) -> Result<Vec<PrayerSchedule>> {
    sqlx::query_as::<_, PrayerSchedule>("SELECT * FROM prayer_times ORDER BY year, month")
        .fetch_all(pool)
        .await
}

pub async fn find_prayer_schedule(
    pool: &PgPool,
    month: &str,
    year: &str,
) -> Result<Option<PrayerSchedule>> {
    sqlx::query_as::<_, PrayerSchedule>(
        "SELECT * FROM prayer_times WHERE month = $1 AND year = $2",
    )
    .bind(month)
    .bind(year)
    .fetch_optional(pool)
    .await
}

pub async fn insert_prayer_schedule(
    pool: &PgPool,
    schedule: &PrayerSchedule,
) -> Result<PrayerSchedule> {
    sqlx::query_as::<_, PrayerSchedule>(
        "INSERT INTO prayer_times (id, month, year, days) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(schedule.id)
    .bind(&schedule.month)
    .bind(&schedule.year)
    .bind(&schedule.days)
    .fetch_one(pool)
    .await
}

pub async fn update_prayer_days(
    pool: &PgPool,
    id: Uuid,
    days: &[PrayerDay],
) -> Result<PrayerSchedule> {
    sqlx::query_as::<_, PrayerSchedule>(
        "UPDATE prayer_times SET days = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(sqlx::types::Json(days))
    .fetch_one(pool)
    .await
}

pub async fn delete_prayer_schedule(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM prayer_times WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
