use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, status, Responder};
use rocket::serde::json::{self, Json};
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::util::add_schema_response;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of every non-2xx response, including the ones produced by catchers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> ErrorDetail {
        ErrorDetail { detail: detail.into() }
    }
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::Validation(_) => Status::UnprocessableEntity,
            ApiError::StoreUnavailable(_) => Status::ServiceUnavailable,
            ApiError::Database(_) | ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl From<DieselError> for ApiError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => ApiError::NotFound("Record not found".to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => ApiError::Conflict(info.message().to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => ApiError::Conflict(info.message().to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => ApiError::StoreUnavailable(info.message().to_string()),
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl<'a> From<json::Error<'a>> for ApiError {
    fn from(e: json::Error<'a>) -> Self {
        match e {
            json::Error::Parse(_, inner) => ApiError::Validation(inner.to_string()),
            json::Error::Io(inner) => ApiError::Validation(format!("could not read request body: {}", inner)),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let code = self.status();
        if code.code >= 500 {
            error!("{} {} failed: {}", request.method(), request.uri(), self);
        } else {
            debug!("{} {} rejected: {}", request.method(), request.uri(), self);
        }
        status::Custom(code, Json(ErrorDetail::new(self.to_string()))).respond_to(request)
    }
}

impl OpenApiResponderInner for ApiError {
    fn responses(gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();
        let schema = gen.json_schema::<ErrorDetail>();
        for code in [404, 409, 422, 500, 503] {
            add_schema_response(&mut responses, code, "application/json", schema.clone())?;
        }
        Ok(responses)
    }
}
