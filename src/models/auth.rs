//! Session identity of the logged-in employee.

use std::future::{Ready, ready};

use actix_identity::{Identity, IdentityExt};
use actix_web::dev::Payload;
use actix_web::error::{ErrorUnauthorized, InternalError};
use actix_web::http::header;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::types::string_or_number;
use crate::domain::usuario::Role;

/// Claims the backend puts in its access tokens.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(deserialize_with = "string_or_number")]
    sub: String,
    exp: i64,
}

/// Employee stored in the identity cookie after a successful login.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub identificacion: String,
    pub nombre: String,
    pub correo: String,
    pub rucempresarial: Option<String>,
    /// Role description as resolved from `/roles/{id}`.
    pub rol: String,
    /// Backend bearer token.
    pub token: String,
    /// Token expiry, seconds since the epoch.
    pub exp: i64,
}

impl AuthenticatedUser {
    pub fn role(&self) -> Option<Role> {
        Role::from_descripcion(&self.rol)
    }

    /// Landing page of the user's role, `/` for unknown roles.
    pub fn home_path(&self) -> &'static str {
        self.role().map_or("/", Role::home_path)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.exp <= now
    }

    /// Stores the user in the identity cookie.
    pub fn login(&self, req: &HttpRequest) -> Result<Identity, actix_web::Error> {
        let id = serde_json::to_string(self).map_err(actix_web::error::ErrorInternalServerError)?;
        Identity::login(&req.extensions(), id).map_err(actix_web::error::ErrorInternalServerError)
    }
}

/// Reads the expiry of a backend token, checking its HS256 signature.
///
/// Returns the subject along with the expiry.
pub fn token_expiry(token: &str, secret: &str) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok((data.claims.sub, data.claims.exp))
}

fn access_denied() -> actix_web::Error {
    let response = HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/?message=access-denied"))
        .finish();
    InternalError::from_response("access denied", response).into()
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Ok(identity) = req.get_identity() else {
            return ready(Err(access_denied()));
        };
        let user = identity
            .id()
            .ok()
            .and_then(|id| serde_json::from_str::<AuthenticatedUser>(&id).ok());

        ready(match user {
            Some(user) if !user.is_expired(chrono::Utc::now().timestamp()) => Ok(user),
            Some(_) => {
                log::info!("Session token expired");
                identity.logout();
                Err(ErrorUnauthorized("session expired"))
            }
            None => {
                log::warn!("Unreadable session identity");
                identity.logout();
                Err(ErrorUnauthorized("invalid session"))
            }
        })
    }
}
