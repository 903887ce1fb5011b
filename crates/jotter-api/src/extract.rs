//! Request extractors.
//!
//! Extractors here never touch the store. A unit of work is opened inside the
//! handler once the body has been read, so a slow upload holds no transaction
//! and no store lock.

use std::convert::Infallible;

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::{header, request::Parts, HeaderMap};
use axum::Json;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use jotter_core::UnitOfWork;

use crate::error::ApiError;
use crate::state::AppState;

/// Raw `Authorization` header value, if present and valid UTF-8.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// The `Authorization` header as presented, not yet checked.
#[derive(Debug, Clone, Default)]
pub struct Credentials(Option<String>);

impl Credentials {
    pub fn header(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Credentials {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Credentials(
            authorization_header(&parts.headers).map(str::to_string),
        ))
    }
}

/// JSON body whose rejections answer `400 {"error": ...}` like every other
/// client error.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// An authenticated caller together with the unit of work the request runs in.
///
/// The revocation lookup and the handler's reads and writes share one unit of
/// work. Handlers must call `commit` on success; dropping the session rolls
/// everything back.
pub struct AuthSession {
    pub user_id: Uuid,
    pub uow: Box<dyn UnitOfWork>,
}

impl AuthSession {
    /// Open a unit of work and authenticate `credentials` inside it.
    pub async fn open(state: &AppState, credentials: &Credentials) -> Result<Self, ApiError> {
        let mut uow = state.store.begin().await?;
        let user_id = state
            .accounts
            .validator()
            .authenticate(uow.as_mut(), credentials.header())
            .await?;
        Ok(AuthSession { user_id, uow })
    }

    pub async fn commit(self) -> Result<(), ApiError> {
        self.uow.commit().await?;
        Ok(())
    }
}
