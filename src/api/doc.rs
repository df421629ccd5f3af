use utoipa::OpenApi;

pub const HEALTH_TAG: &str = "Health";
pub const NOTIFICATION_TAG: &str = "Notifications";

/// Path the generated OpenAPI document is served from
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notifier",
        description = "Routes outbound notifications to the configured delivery providers",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
        )
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = NOTIFICATION_TAG, description = "Notification dispatch endpoints"),
    )
)]
pub struct ApiDoc;
