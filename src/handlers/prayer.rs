use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::AppState;
use crate::db::models::{PrayerDay, PrayerSchedule, PrayerTimesPair};
use crate::db::queries;
use crate::error::StatusError;

#[derive(Debug, Deserialize)]
pub struct AddPrayerTimeRequest {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub days: Vec<PrayerDay>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePrayerTimeRequest {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "updatedTimes")]
    pub updated_times: HashMap<String, PrayerTimesPair>,
}

#[derive(Debug, Deserialize)]
pub struct PrayerTimesQuery {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub year: String,
}

pub async fn get_prayers(State(state): State<AppState>) -> Result<impl IntoResponse, StatusError> {
    let prayers = queries::list_prayer_schedules(&state.db).await?;

    Ok(Json(json!({
        "status": 1,
        "msg": "Prayers fetched successfully",
        "prayers": prayers,
    })))
}

/// Creates the month/year schedule, or merges into it: only days whose date
/// is not already present are appended.
pub async fn add_prayer_time(
    State(state): State<AppState>,
    Json(req): Json<AddPrayerTimeRequest>,
) -> Result<impl IntoResponse, StatusError> {
    if req.month.trim().is_empty() || req.year.trim().is_empty() {
        return Err(StatusError::bad_request("Month and year are required"));
    }

    match queries::find_prayer_schedule(&state.db, &req.month, &req.year).await? {
        Some(existing) => {
            let existing_dates: HashSet<&str> =
                existing.days.0.iter().map(|day| day.date.as_str()).collect();

            let new_days: Vec<PrayerDay> = req
                .days
                .into_iter()
                .filter(|day| !existing_dates.contains(day.date.as_str()))
                .collect();

            if new_days.is_empty() {
                return Err(StatusError::bad_request(
                    "All dates already exist for this month.",
                ));
            }

            let mut days = existing.days.0.clone();
            days.extend(new_days);
            let updated = queries::update_prayer_days(&state.db, existing.id, &days).await?;

            Ok(Json(json!({
                "status": 1,
                "msg": "New prayer times added successfully.",
                "data": updated,
            })))
        }
        None => {
            let schedule = PrayerSchedule::new(req.month, req.year, req.days);
            let saved = queries::insert_prayer_schedule(&state.db, &schedule).await?;

            Ok(Json(json!({
                "status": 1,
                "msg": "Prayer times added successfully.",
                "data": saved,
            })))
        }
    }
}

/// Overwrites individual prayers on one day. Only prayers already present on
/// the day entry change; Jumma is skipped when the day has none.
pub async fn update_prayer_time(
    State(state): State<AppState>,
    Json(req): Json<UpdatePrayerTimeRequest>,
) -> Result<impl IntoResponse, StatusError> {
    let existing = queries::find_prayer_schedule(&state.db, &req.month, &req.year)
        .await?
        .ok_or_else(|| StatusError::not_found("No prayer times found for this month."))?;

    let mut days = existing.days.0.clone();
    let day_entry = days
        .iter_mut()
        .find(|day| day.date == req.date)
        .ok_or_else(|| {
            StatusError::not_found(format!("No prayer times found for date {}.", req.date))
        })?;

    day_entry.apply_updates(&req.updated_times);

    let updated = queries::update_prayer_days(&state.db, existing.id, &days).await?;

    Ok(Json(json!({
        "status": 1,
        "msg": "Prayer time updated successfully.",
        "data": updated,
    })))
}

pub async fn get_prayer_times(
    State(state): State<AppState>,
    Query(query): Query<PrayerTimesQuery>,
) -> Result<impl IntoResponse, StatusError> {
    let schedule = queries::find_prayer_schedule(&state.db, &query.month, &query.year)
        .await?
        .ok_or_else(|| StatusError::not_found("No prayer times found for this month."))?;

    Ok(Json(json!({
        "status": 1,
        "msg": "Prayer times fetched successfully.",
        "data": schedule,
    })))
}

pub async fn delete_prayer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusError> {
    let deleted = queries::delete_prayer_schedule(&state.db, id).await?;
    if !deleted {
        return Err(StatusError::not_found("Prayer not found"));
    }

    Ok(Json(json!({
        "status": 1,
        "msg": "Prayer deleted successfully.",
    })))
}
