use crate::ai::extract::DesignResult;
use crate::ai::prompts::DEFAULT_DIALECT;
use crate::architect::{Architect, Health, ModelAvailability};
use crate::error::{ArchitectError, Result};
use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

#[derive(Debug, Clone, Deserialize)]
pub struct DesignRequest {
    pub description: String,
    #[serde(default = "default_dialect")]
    pub database_type: String,
}

fn default_dialect() -> String {
    DEFAULT_DIALECT.to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub design: String,
    #[serde(default)]
    pub requirements: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    pub validation_feedback: String,
}

async fn health() -> Json<Health> {
    Json(Architect::health())
}

async fn models(State(architect): State<Architect>) -> Json<ModelAvailability> {
    Json(architect.list_models().await)
}

async fn design_database(
    State(architect): State<Architect>,
    Json(request): Json<DesignRequest>,
) -> Result<Json<DesignResult>> {
    let result = architect
        .design(&request.description, &request.database_type)
        .await?;
    Ok(Json(result))
}

async fn validate_design(
    State(architect): State<Architect>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>> {
    let validation_feedback = architect
        .validate(&request.design, &request.requirements)
        .await?;
    Ok(Json(ValidateResponse {
        validation_feedback,
    }))
}

pub fn router(architect: Architect) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/models", get(models))
        .route("/design-database", post(design_database))
        .route("/validate-design", post(validate_design))
        .with_state(architect)
}

/// Browser access for the listed origins. Credentials are allowed, so
/// methods and headers mirror the request instead of using a wildcard.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ArchitectError::Config {
                key: "CORS_ORIGINS".to_string(),
                reason: format!("'{origin}': {e}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
