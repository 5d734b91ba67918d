pub mod public;
pub mod teacher;

use crate::helper::cascade_helpers::Operation;
use crate::helper::ActionError;
use crate::models::ActionResponse;
use actix_web::{error, web, HttpResponse};
use serde::Serialize;

pub(crate) fn error_response(e: &ActionError) -> HttpResponse {
    let body = ActionResponse::failed(e.user_message());
    match e {
        ActionError::Unauthenticated => HttpResponse::Unauthorized().json(body),
        ActionError::NotOwner => HttpResponse::Forbidden().json(body),
        ActionError::NotFound(_) => HttpResponse::NotFound().json(body),
        ActionError::Validation(_) => HttpResponse::BadRequest().json(body),
        ActionError::IncompleteForPublish(_) => HttpResponse::UnprocessableEntity().json(body),
        ActionError::ExternalService(_) | ActionError::Persistence(_) => HttpResponse::InternalServerError().json(body),
    }
}

/// Maps an operation's outcome onto the `{id}` / `{success}` / `{error}` response shape.
pub(crate) fn respond<T>(op: Operation, result: Result<T, ActionError>, on_success: impl FnOnce(T) -> ActionResponse) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(on_success(value)),
        Err(e) => {
            if e.is_fault() {
                log::error!("{} failed: {}", op.name(), e);
            }
            error_response(&e)
        }
    }
}

/// Reads return the entity itself; failures use the same shape as operations.
pub(crate) fn respond_read<T: Serialize>(what: &str, result: Result<T, ActionError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            if e.is_fault() {
                log::error!("Failed to read {}: {}", what, e);
            }
            error_response(&e)
        }
    }
}

/// Malformed JSON bodies get the same `{error}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid request body: {}", err);
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(ActionResponse::failed(message))).into()
    })
}
