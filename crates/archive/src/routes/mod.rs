pub mod health;
pub mod readings;

pub use health::*;
pub use readings::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use wx_archive_core::{db, DateRangeError};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    BadDates(#[from] DateRangeError),
    #[error("No readings archived yet")]
    NotFound,
    #[error("Archive unavailable")]
    Storage(#[from] db::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadDates(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(e) => {
                error!("archive error: {}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        (status, self.to_string()).into_response()
    }
}
