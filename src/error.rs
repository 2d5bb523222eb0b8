use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Dham not found: {0}")]
    DhamNotFound(String),

    #[error("Parent {kind} not found: {id}")]
    ParentNotFound { kind: &'static str, id: i32 },

    #[error("Maximum 99 {children} per {parent} reached")]
    CapacityExceeded {
        children: &'static str,
        parent: &'static str,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::DhamNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::ParentNotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::CapacityExceeded { .. } => (StatusCode::CONFLICT, self.to_string()),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ServerError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
