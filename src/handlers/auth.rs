use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::db::models::{PublicUser, User};
use crate::db::queries;
use crate::error::StatusError;
use crate::validation::validate_required;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, StatusError> {
    let required = [
        ("full_name", &req.full_name),
        ("email", &req.email),
        ("phone", &req.phone),
        ("password", &req.password),
    ];
    for (field, value) in required {
        if validate_required(field, value).is_err() {
            return Err(StatusError::bad_request(format!("{} is required", field)));
        }
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        StatusError::internal("Server Error")
    })?;

    let user = User::new(
        req.full_name,
        req.email,
        req.phone,
        password_hash,
        req.photo,
    );

    // Email/phone uniqueness is enforced by the store, not a linear scan.
    let saved = queries::insert_user(&state.db, &user).await.map_err(|e| {
        if queries::is_unique_violation(&e) {
            StatusError::conflict("Email or phone already in use")
        } else {
            StatusError::from(e)
        }
    })?;

    Ok(Json(json!({
        "status": 1,
        "msg": "Signup successful",
        "user": PublicUser::from(&saved),
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(StatusError::bad_request("Invalid Credentials"));
    }

    // Deliberately vague on both unknown email and wrong password.
    let user = queries::find_user_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| StatusError::bad_request("Invalid Credentials"))?;

    let matches = bcrypt::verify(&req.password, &user.password_hash).map_err(|e| {
        tracing::error!(error = %e, "password verification failed");
        StatusError::internal("Server Error")
    })?;
    if !matches {
        return Err(StatusError::bad_request("Invalid Credentials"));
    }

    queries::set_session_active(&state.db, &user.unique_id, true).await?;

    Ok(Json(json!({
        "status": 1,
        "msg": "Login successful",
        "user": PublicUser::from(&user),
    })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, StatusError> {
    if req.email.trim().is_empty() {
        return Err(StatusError::bad_request("Email is required"));
    }

    let updated = queries::update_user_profile(
        &state.db,
        &req.email,
        req.full_name.as_deref(),
        req.phone.as_deref(),
        req.photo.as_deref(),
    )
    .await?
    .ok_or_else(|| StatusError::not_found("User not found"))?;

    Ok(Json(json!({
        "status": 1,
        "msg": "Profile updated successfully",
        "user": PublicUser::from(&updated),
    })))
}

pub async fn get_users(State(state): State<AppState>) -> Result<impl IntoResponse, StatusError> {
    let users = queries::list_users(&state.db).await?;
    if users.is_empty() {
        return Err(StatusError::not_found("No users found"));
    }

    Ok(Json(json!({
        "status": 1,
        "msg": "Users fetched successfully",
        "users": users,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, StatusError> {
    let updated = queries::set_session_active(&state.db, &user_id, false).await?;
    if !updated {
        return Err(StatusError::not_found("User not found"));
    }

    Ok(Json(json!({
        "status": 1,
        "msg": "Logout successful",
    })))
}
