use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::types::BigDecimal;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::AppState;
use crate::db::models::Donor;
use crate::db::queries;
use crate::error::AppError;
use crate::stripe::CheckoutSessionParams;
use crate::validation::{validate_payment_method, validate_positive_amount, validate_required};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, rename = "paymentMethod")]
    pub payment_method: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DonatorsQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DonationsByUserQuery {
    pub user_unique_id: Option<String>,
}

fn validate_create_payment(req: &CreatePaymentRequest) -> Result<(), AppError> {
    let required = [
        ("user_id", &req.user_id),
        ("name", &req.name),
        ("number", &req.number),
        ("email", &req.email),
        ("category", &req.category),
    ];
    for (field, value) in required {
        if validate_required(field, value).is_err() {
            return Err(AppError::Validation("Missing required fields".to_string()));
        }
    }

    if validate_positive_amount("amount", req.amount).is_err() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    if validate_required("paymentMethod", &req.payment_method).is_err() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    validate_payment_method("paymentMethod", &req.payment_method)
        .map_err(|_| AppError::Validation("Invalid or unsupported payment method".to_string()))?;

    Ok(())
}

/// Opens a hosted checkout session. No local state is written; the intent
/// lives in the session metadata until confirmation.
#[utoipa::path(
    post,
    path = "/api/payments/create-payment",
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, description = "Checkout session created"),
        (status = 400, description = "Missing field or unsupported payment method"),
        (status = 502, description = "Payment provider failure")
    ),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_payment(&req)?;

    let mut metadata = HashMap::new();
    metadata.insert("user_id".to_string(), req.user_id.clone());
    metadata.insert("name".to_string(), req.name.clone());
    metadata.insert("number".to_string(), req.number.clone());
    metadata.insert("email".to_string(), req.email.clone());
    metadata.insert("category".to_string(), req.category.clone());
    metadata.insert("amount".to_string(), req.amount.to_string());
    metadata.insert("paymentMethod".to_string(), req.payment_method.clone());

    let params = CheckoutSessionParams {
        payment_method: req.payment_method.clone(),
        customer_email: req.email.clone(),
        product_name: req.category.clone(),
        unit_amount: (req.amount * 100.0).round() as i64,
        success_url: state.checkout.success_url.clone(),
        cancel_url: state.checkout.cancel_url.clone(),
        metadata,
    };

    let session = state.stripe.create_checkout_session(&params).await?;
    tracing::info!(session_id = %session.id, "checkout session created");

    Ok(Json(json!({
        "sessionId": session.id,
        "checkoutUrl": session.url,
    })))
}

/// Confirms a completed checkout session and persists the donor record
/// exactly once. The unique index on `payment_ref_id` is the authority under
/// concurrent confirmation; the upfront lookup only short-circuits retries.
#[utoipa::path(
    post,
    path = "/api/payments/confirm-payment",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Donor record persisted", body = Donor),
        (status = 400, description = "Missing session id"),
        (status = 402, description = "Payment not completed"),
        (status = 409, description = "Session already processed"),
        (status = 502, description = "Payment provider failure")
    ),
    tag = "Payments"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.session_id.trim().is_empty() {
        return Err(AppError::Validation("Session ID is required".to_string()));
    }

    if queries::find_donor_by_payment_ref(&state.db, &req.session_id)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateProcessing(
            "Payment session already processed".to_string(),
        ));
    }

    let session = state
        .stripe
        .retrieve_checkout_session(&req.session_id)
        .await?;
    if session.payment_status != "paid" {
        return Err(AppError::PaymentIncomplete(
            "Payment not completed".to_string(),
        ));
    }

    // Both hops are optional: a missing intent or charge yields an empty
    // receipt URL, never a failure.
    let payment_intent = match &session.payment_intent {
        Some(intent_id) => Some(state.stripe.retrieve_payment_intent(intent_id).await?),
        None => None,
    };
    let charge = match payment_intent.as_ref().and_then(|pi| pi.latest_charge.as_ref()) {
        Some(charge_id) => Some(state.stripe.retrieve_charge(charge_id).await?),
        None => None,
    };
    let receipt_url = charge.and_then(|c| c.receipt_url);

    let metadata = &session.metadata;
    let amount = metadata
        .get("amount")
        .and_then(|raw| raw.parse::<BigDecimal>().ok())
        .or_else(|| {
            session
                .amount_total
                .map(|total| BigDecimal::from(total) / BigDecimal::from(100))
        })
        .ok_or_else(|| {
            AppError::PaymentProvider("Checkout session carries no amount".to_string())
        })?;
    let payment_method = metadata
        .get("paymentMethod")
        .cloned()
        .or_else(|| session.payment_method_types.first().cloned())
        .unwrap_or_else(|| "unknown".to_string());
    let payment_ref_id = session
        .payment_intent
        .clone()
        .unwrap_or_else(|| session.id.clone());

    let donor = Donor::new(
        metadata.get("user_id").cloned().unwrap_or_default(),
        metadata.get("name").cloned().unwrap_or_default(),
        metadata.get("number").cloned().unwrap_or_default(),
        metadata.get("email").cloned().unwrap_or_default(),
        metadata.get("category").cloned().unwrap_or_default(),
        amount,
        payment_method,
        payment_ref_id,
        receipt_url,
    );

    let saved = queries::insert_donor(&state.db, &donor).await.map_err(|e| {
        if queries::is_unique_violation(&e) {
            AppError::DuplicateProcessing("Payment session already processed".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(payment_ref_id = %saved.payment_ref_id, "donor record saved");

    Ok(Json(json!({
        "success": true,
        "message": "Donor details saved successfully",
        "donor": saved,
    })))
}

/// Donor lookup by checkout session, or the full list when no session id is
/// given. Response shapes match the original clients exactly.
#[utoipa::path(
    get,
    path = "/api/payments/get-donators",
    params(("session_id" = Option<String>, Query, description = "Checkout session or payment intent id")),
    responses(
        (status = 200, description = "Donor or full donor list"),
        (status = 404, description = "No donor for the given session id")
    ),
    tag = "Payments"
)]
pub async fn get_donators(
    State(state): State<AppState>,
    Query(query): Query<DonatorsQuery>,
) -> Result<Response, AppError> {
    if let Some(session_id) = query.session_id.filter(|sid| !sid.trim().is_empty()) {
        return match queries::find_donor_by_payment_ref(&state.db, &session_id).await? {
            Some(donor) => Ok(Json(json!({
                "status": 1,
                "success": true,
                "donor": donor,
                "msg": "Donor details fetched successfully",
            }))
            .into_response()),
            None => Ok((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "status": 2,
                    "error": "Donor not found",
                    "msg": "No donor found with the provided session ID",
                })),
            )
                .into_response()),
        };
    }

    let all_donors = queries::list_donors(&state.db).await?;
    Ok(Json(json!({
        "status": 1,
        "success": true,
        "allDonors": all_donors,
        "msg": "All donor details fetched successfully",
    }))
    .into_response())
}

/// All donations for one user, newest first. An empty result is a 404 by
/// original contract, unlike the unfiltered listing.
#[utoipa::path(
    get,
    path = "/api/payments/get-donations-by-user",
    params(("user_unique_id" = Option<String>, Query, description = "Opaque user id")),
    responses(
        (status = 200, description = "Donations for the user"),
        (status = 400, description = "Missing user id"),
        (status = 404, description = "No donations for the user")
    ),
    tag = "Payments"
)]
pub async fn get_donations_by_user(
    State(state): State<AppState>,
    Query(query): Query<DonationsByUserQuery>,
) -> Result<Response, AppError> {
    let user_id = match query.user_unique_id.filter(|uid| !uid.trim().is_empty()) {
        Some(uid) => uid,
        None => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": 2,
                    "error": "user_unique_id is required",
                    "msg": "Please provide a valid user_unique_id",
                })),
            )
                .into_response());
        }
    };

    let donations = queries::list_donations_by_user(&state.db, &user_id).await?;
    if donations.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": 2,
                "error": "No donations found for this user",
                "msg": "No donations found for the provided user_unique_id",
            })),
        )
            .into_response());
    }

    Ok(Json(json!({
        "status": 1,
        "success": true,
        "donations": donations,
        "msg": "Donations fetched successfully",
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreatePaymentRequest {
        CreatePaymentRequest {
            user_id: "u1".to_string(),
            name: "A".to_string(),
            number: "1".to_string(),
            email: "a@x.com".to_string(),
            category: "Zakat".to_string(),
            amount: 50.0,
            payment_method: "card".to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_create_payment(&valid_request()).is_ok());
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut req = valid_request();
        req.name = String::new();
        let err = validate_create_payment(&req).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Missing required fields"));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut req = valid_request();
        req.amount = 0.0;
        assert!(validate_create_payment(&req).is_err());
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let mut req = valid_request();
        req.payment_method = "bitcoin".to_string();
        let err = validate_create_payment(&req).unwrap_err();
        assert!(
            matches!(err, AppError::Validation(msg) if msg == "Invalid or unsupported payment method")
        );
    }

    #[test]
    fn test_amount_converts_to_minor_units() {
        // round(amount * 100), matching the checkout contract
        assert_eq!((50.0_f64 * 100.0).round() as i64, 5000);
        assert_eq!((10.555_f64 * 100.0).round() as i64, 1056);
    }
}
