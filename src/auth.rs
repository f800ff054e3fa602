use actix_web::dev::ServiceRequest;
use actix_web::http::header::Header;
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader,
    Validation,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::context::{RequestContext, Resolver};
use crate::error::ApiError;
use crate::models::{Id, User};
use crate::repo::{Repo, UserRepo};
use crate::routes::AppState;

/// Issuer marker written into every token.
pub const ISSUER: &str = "convo";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Id,
    /// Issue time, nanoseconds since the epoch.
    #[serde(default)]
    pub signed: i64,
    #[serde(default)]
    pub iss: String,
    /// Never set by `issue`; tokens do not expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token signing failed")]
    Signing,
}

/// Signs and verifies identity tokens with one symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // any HMAC variant verifies; everything else is rejected as malformed
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Create a token for a user
    pub fn issue(&self, user_id: Id) -> Result<String, AuthError> {
        let claims = Claims {
            user_id,
            signed: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            iss: ISSUER.to_string(),
            exp: None,
        };
        encode(&JwtHeader::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::Signing)
    }

    /// Validate a token and return the user id it carries. Issue time is not checked.
    pub fn verify(&self, token: &str) -> Result<Id, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            })
    }
}

/// Identity of the caller, as currently stored (not as cached in the token).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Id,
    pub username: String,
}

impl From<User> for AuthUser {
    fn from(u: User) -> Self {
        Self { id: u.id, username: u.username }
    }
}

/// Turn a bearer token into a live user.
///
/// The user row is re-read on every call, so a renamed user shows the new name
/// and a deleted user is locked out without any token bookkeeping.
pub async fn authenticate(
    tokens: &TokenService,
    repo: &dyn Repo,
    bearer: Option<&str>,
) -> Result<AuthUser, ApiError> {
    let token = bearer
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::invalid("bad authorization header"))?;
    let user_id = tokens.verify(token).map_err(|e| {
        log::warn!("rejected token: {e}");
        ApiError::from(e)
    })?;
    match repo.find_user(user_id).await? {
        Some(user) => Ok(user.into()),
        None => {
            log::warn!("token for unknown user id {user_id}");
            Err(ApiError::invalid("no such user (bad user id)"))
        }
    }
}

/// Middleware stage requiring `Authorization: Bearer <token>`.
#[derive(Clone, Copy, Default)]
pub struct AuthGate;

#[async_trait(?Send)]
impl Resolver for AuthGate {
    async fn resolve(
        &self,
        state: &AppState,
        req: &ServiceRequest,
        ctx: &mut RequestContext,
    ) -> Result<(), ApiError> {
        let bearer = Authorization::<Bearer>::parse(req)
            .ok()
            .map(Authorization::into_scheme);
        let user = authenticate(
            &state.tokens,
            state.repo.as_ref(),
            bearer.as_ref().map(Bearer::token),
        )
        .await?;
        ctx.user = Some(user);
        Ok(())
    }
}
