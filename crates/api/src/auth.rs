//! Static API-token authentication.
//!
//! A request is authenticated when the configured token header, or an
//! `Authorization: Bearer` header, carries one of the known tokens.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, HeaderName, InvalidHeaderName};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::error::ApiError;

/// The user a verified token belongs to, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Token table plus the header it is read from.
#[derive(Debug, Clone)]
pub struct TokenAuth {
    header: HeaderName,
    tokens: HashMap<String, String>,
}

impl TokenAuth {
    /// Creates an empty token table reading tokens from `header`.
    pub fn new(header: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::try_from(header)?,
            tokens: HashMap::new(),
        })
    }

    /// Builds the token table from configuration.
    pub fn from_config(config: &Config) -> Result<Self, InvalidHeaderName> {
        let auth = Self::new(&config.token_header)?;
        Ok(match &config.api_token {
            Some(token) => auth.with_token(token, &config.api_user),
            None => auth,
        })
    }

    /// Accepts `token` on behalf of `user`.
    pub fn with_token(mut self, token: impl Into<String>, user: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user.into());
        self
    }

    /// Name of the header tokens are read from.
    pub fn header_name(&self) -> &str {
        self.header.as_str()
    }

    /// Returns true if no token would ever be accepted.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Checks the request headers against the token table.
    pub fn verify(&self, headers: &HeaderMap) -> Option<AuthenticatedUser> {
        let from_header = headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim);
        let from_bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        [from_header, from_bearer]
            .into_iter()
            .flatten()
            .find_map(|presented| self.lookup(presented))
    }

    fn lookup(&self, presented: &str) -> Option<AuthenticatedUser> {
        // Visit every entry so timing does not reveal which token matched.
        let mut user = None;
        for (token, owner) in &self.tokens {
            if constant_time_compare(presented, token) {
                user = Some(AuthenticatedUser(owner.clone()));
            }
        }
        user
    }
}

/// Constant-time string comparison.
///
/// Both inputs are padded to the same length with different fill bytes, so
/// neither the content nor the length leaks through timing.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let max_len = a.len().max(b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}

/// Middleware rejecting requests without a known token.
pub async fn require_token(
    State(auth): State<Arc<TokenAuth>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match auth.verify(req.headers()) {
        Some(user) => {
            tracing::debug!(user = %user.0, path = %req.uri().path(), "request authenticated");
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => {
            metrics::counter!("auth_rejections_total").increment(1);
            tracing::warn!(path = %req.uri().path(), "rejected request without valid API token");
            Err(ApiError::Unauthorized)
        }
    }
}
