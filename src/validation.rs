// src/validation.rs
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use validator::Validate;
use crate::AppError;

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // 1. 先用 Axum 原生的 Json 提取器解析 Body
        // JSON 非法 / 缺必填字段 / 字段类型不对, 这里统一返回 400
        let Json(value) = Json::<T>::from_request(req, state).await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        // 2. 执行 validator 的校验逻辑, 失败时按字段返回 AppError::Validation
        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
