//! Bearer-token authentication.
//!
//! Customers sign in with the storefront's identity provider, which issues HS256 access tokens signed with the
//! shared `HOSTING_JWT_SECRET`. This server only verifies them. [`TokenIssuer::issue_token`] exists for operators and
//! tests.
//!
//! Any handler that takes a [`JwtClaims`] argument is authenticated: a missing, malformed, expired or forged token
//! is rejected with a 401 before the handler runs.
use std::{fmt::Display, future::ready};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use provisioning_engine::db_types::Caller;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The customer's account id at the identity provider
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Unix timestamp
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: &str, email: &str, roles: Vec<Role>, expires_at: DateTime<Utc>) -> Self {
        Self { sub: sub.to_string(), email: email.to_string(), roles, exp: expires_at.timestamp() }
    }

    pub fn caller(&self) -> Caller {
        Caller::new(self.sub.as_str(), self.email.as_str())
    }

    pub fn has_roles(&self, required: &[Role]) -> bool {
        required.iter().all(|r| self.roles.contains(r))
    }
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn issue_token(&self, claims: &JwtClaims) -> Result<String, ServerError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServerError::BackendError(format!("Could not sign access token. {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map(|d| d.claims).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                    AuthError::PoorlyFormattedToken(e.to_string())
                },
                _ => AuthError::ValidationError(e.to_string()),
            }
        })
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::PoorlyFormattedToken("Expected a bearer token".to_string())),
    }
}

/// Verifies the request's access token. Verified claims are cached in the request extensions, so the ACL middleware
/// and the handler's extractor only decode the token once between them.
pub fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let cached = req.extensions().get::<JwtClaims>().cloned();
    if let Some(claims) = cached {
        return Ok(claims);
    }
    let issuer = req.app_data::<web::Data<TokenIssuer>>().ok_or_else(|| {
        error!("💻️ No token issuer has been registered with the app");
        ServerError::ConfigurationError("Authentication is not configured".to_string())
    })?;
    let token = bearer_token(req)?;
    let claims = issuer.verify(token).map_err(|e| {
        debug!("💻️ Rejected access token. {e}");
        e
    })?;
    trace!("💻️ Authenticated {}", claims.sub);
    req.extensions_mut().insert(claims.clone());
    Ok(claims)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}
