// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors), // 校验错误自动转换, 按字段返回
}

// 核心逻辑：将我们的错误转换为 HTTP 响应
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                // 后台记录详细错误
                tracing::error!("Database Error: {:?}", e);

                // 唯一约束冲突单独处理 (注册撞名的兜底)
                if e.to_string().contains("duplicate key") {
                    (StatusCode::CONFLICT, "Record already exists".to_string())
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database operation failed".to_string(),
                    )
                }
            },
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AppError::Validation(ref e) => {
                // 逐字段返回校验错误, 不压成一句话
                let body = Json(json!({
                    "status": "error",
                    "errors": e,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            },
        };

        let body = Json(json!({
            "status": "error",
            "message": error_message,
        }));

        (status, body).into_response()
    }
}
