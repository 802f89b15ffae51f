//! Caller identity extractor.
//!
//! The service trusts the `System-Design-User-Id` header; there is no
//! authentication beyond checking its shape.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use std::future::{Ready, ready};

use chirp_core::domain::AuthorId;

use super::error::AppError;

/// Header carrying the caller's user id.
pub static USER_ID_HEADER: &str = "System-Design-User-Id";

/// The calling user, taken from [`USER_ID_HEADER`].
///
/// ```ignore
/// async fn publish(caller: CallerId) -> impl Responder {
///     format!("Hello, {}!", caller.0)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CallerId(pub AuthorId);

impl FromRequest for CallerId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let raw = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        match AuthorId::parse(raw) {
            Ok(author) => ready(Ok(CallerId(author))),
            Err(_) => {
                tracing::debug!(header = %raw, "Rejected caller id");
                ready(Err(AppError::Unauthorized(
                    "Provided userId is not valid".to_string(),
                )))
            }
        }
    }
}
