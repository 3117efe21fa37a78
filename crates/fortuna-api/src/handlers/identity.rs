//! Request identity extraction
//!
//! Identity travels in the `X-User-Id` header; there are no sessions or
//! tokens. Handlers that need a user take a [`CurrentUser`] parameter and
//! the extractor rejects requests without a usable header.

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use fortuna_core::AppError;
use std::future::{ready, Ready};

/// Header carrying the logged-in user's ID
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The user a request is acting as
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

impl CurrentUser {
    /// The user's ID
    #[inline]
    pub fn id(&self) -> i64 {
        self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let parsed = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok());

        ready(parsed.map(CurrentUser).ok_or_else(|| {
            AppError::Validation(format!("missing or invalid {USER_ID_HEADER} header"))
        }))
    }
}
