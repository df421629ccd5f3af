//! Notification API handlers.
//!
//! Thin adapters that turn HTTP input into a `NotificationRequest` and hand
//! it to the dispatcher. All validation happens in the dispatcher.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::NOTIFICATION_TAG;
use crate::api::dto::{
    EmailQuery, ErrorResponse, PushQuery, SendNotificationRequest, SendNotificationResponse,
    SmsQuery,
};
use crate::error::AppResult;
use crate::notifications::NotificationRequest;
use crate::state::AppState;

/// Creates notification routes.
///
/// Routes:
/// - POST /api/notifications        - Send a generic notification (JSON body)
/// - POST /api/notifications/email  - Send an email from query parameters
/// - POST /api/notifications/sms    - Send an SMS from query parameters
/// - POST /api/notifications/push   - Send a push notification from query parameters
pub fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(send_notification))
        .routes(routes!(send_email))
        .routes(routes!(send_sms))
        .routes(routes!(send_push))
}

/// POST /api/notifications - Send through any configured channel
///
/// A JSON `null` body is treated as an absent notification and rejected.
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = NOTIFICATION_TAG,
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification accepted by the provider", body = SendNotificationResponse),
        (status = 400, description = "Invalid notification", body = ErrorResponse),
        (status = 422, description = "No provider for the requested type", body = ErrorResponse),
        (status = 502, description = "Provider failed to deliver", body = ErrorResponse)
    )
)]
async fn send_notification(
    State(state): State<AppState>,
    payload: Result<Json<Option<SendNotificationRequest>>, JsonRejection>,
) -> AppResult<Json<SendNotificationResponse>> {
    let Json(payload) = payload?;
    let request = payload.map(NotificationRequest::from);

    state.notifications.dispatch(request.as_ref()).await?;

    let notification_type = request
        .as_ref()
        .and_then(NotificationRequest::notification_type)
        .unwrap_or_default()
        .to_ascii_uppercase();
    Ok(Json(SendNotificationResponse::sent(
        notification_type,
        "Notification sent successfully",
    )))
}

/// POST /api/notifications/email - Send an email
#[utoipa::path(
    post,
    path = "/api/notifications/email",
    tag = NOTIFICATION_TAG,
    params(EmailQuery),
    responses(
        (status = 200, description = "Email accepted by the provider", body = SendNotificationResponse),
        (status = 400, description = "Missing recipient or message", body = ErrorResponse),
        (status = 422, description = "Email channel not configured", body = ErrorResponse),
        (status = 502, description = "Provider failed to deliver", body = ErrorResponse)
    )
)]
async fn send_email(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> AppResult<Json<SendNotificationResponse>> {
    let to = params.to.clone().unwrap_or_default();
    let request = NotificationRequest::from_parts(
        Some("EMAIL".to_string()),
        params.to,
        params.subject,
        params.message,
        None,
    );

    state.notifications.send(&request).await?;
    Ok(Json(SendNotificationResponse::sent(
        "EMAIL",
        format!("Email sent to {}", to),
    )))
}

/// POST /api/notifications/sms - Send an SMS
#[utoipa::path(
    post,
    path = "/api/notifications/sms",
    tag = NOTIFICATION_TAG,
    params(SmsQuery),
    responses(
        (status = 200, description = "SMS accepted by the provider", body = SendNotificationResponse),
        (status = 400, description = "Missing recipient or message", body = ErrorResponse),
        (status = 422, description = "SMS channel not configured", body = ErrorResponse),
        (status = 502, description = "Provider failed to deliver", body = ErrorResponse)
    )
)]
async fn send_sms(
    State(state): State<AppState>,
    Query(params): Query<SmsQuery>,
) -> AppResult<Json<SendNotificationResponse>> {
    let to = params.to.clone().unwrap_or_default();
    let request = NotificationRequest::from_parts(
        Some("SMS".to_string()),
        params.to,
        None,
        params.message,
        None,
    );

    state.notifications.send(&request).await?;
    Ok(Json(SendNotificationResponse::sent(
        "SMS",
        format!("SMS sent to {}", to),
    )))
}

/// POST /api/notifications/push - Send a push notification
///
/// The device token is the destination and the title becomes the subject.
#[utoipa::path(
    post,
    path = "/api/notifications/push",
    tag = NOTIFICATION_TAG,
    params(PushQuery),
    responses(
        (status = 200, description = "Push notification accepted by the provider", body = SendNotificationResponse),
        (status = 400, description = "Missing token or message", body = ErrorResponse),
        (status = 422, description = "Push channel not configured", body = ErrorResponse),
        (status = 502, description = "Provider failed to deliver", body = ErrorResponse)
    )
)]
async fn send_push(
    State(state): State<AppState>,
    Query(params): Query<PushQuery>,
) -> AppResult<Json<SendNotificationResponse>> {
    let request = NotificationRequest::from_parts(
        Some("PUSH".to_string()),
        params.token,
        params.title,
        params.message,
        None,
    );

    state.notifications.send(&request).await?;
    Ok(Json(SendNotificationResponse::sent(
        "PUSH",
        "Push notification sent successfully",
    )))
}
