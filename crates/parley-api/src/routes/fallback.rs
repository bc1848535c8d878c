use crate::error::ApiError;

/// Any route or method nothing else matched
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
