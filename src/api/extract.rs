//! Request extractors that report failures as field violations.

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde_json::Value;

use crate::domain::{FieldViolation, ItemId};
use crate::error::AppError;

/// Raw JSON request body, left for the domain validators to inspect.
#[derive(Debug)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(body_violation(&rejection).into()),
        }
    }
}

fn body_violation(rejection: &JsonRejection) -> FieldViolation {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => FieldViolation::new(
            &["body"],
            "model_attributes_type",
            "Expected a JSON body with content-type application/json",
        ),
        other => FieldViolation::new(&["body"], "json_invalid", other.body_text()),
    }
}

/// The `{item_id}` path segment, parsed as an integer.
#[derive(Debug, Clone, Copy)]
pub struct ItemIdPath(pub ItemId);

#[async_trait]
impl<S> FromRequestParts<S> for ItemIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let invalid = || {
            FieldViolation::new(
                &["path", "item_id"],
                "int_parsing",
                "Input should be a valid integer, unable to parse string as an integer",
            )
        };

        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;
        let id = raw.parse::<i64>().map_err(|_| invalid())?;
        Ok(ItemIdPath(ItemId::new(id)))
    }
}
