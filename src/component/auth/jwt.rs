use access_control::context::Viewer;
use actix_http::Payload;
use actix_web::{web::Data, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use tracing::debug;

use crate::state::AppState;

lazy_static::lazy_static! {
  pub static ref VALIDATION: Validation = Validation::new(Algorithm::HS256);
}

/// The viewer of the current request.
///
/// Resolved from an `Authorization: Bearer <token>` header. A missing or invalid token
/// is not an error: the request is evaluated for an anonymous viewer, whom the default
/// handlers never allow to edit.
#[derive(Debug, Clone)]
pub struct InlineViewer(pub Viewer);

impl InlineViewer {
  pub fn into_inner(self) -> Viewer {
    self.0
  }
}

impl FromRequest for InlineViewer {
  type Error = actix_web::Error;

  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let viewer = match req.app_data::<Data<AppState>>() {
      None => Viewer::anonymous(),
      Some(state) => viewer_from_request(req, state.config.jwt_secret.expose_secret().as_bytes()),
    };
    ready(Ok(InlineViewer(viewer)))
  }
}

fn viewer_from_request(req: &HttpRequest, secret: &[u8]) -> Viewer {
  let token = req
    .headers()
    .get("Authorization")
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer ")); // Authorization: Bearer <token>

  match token {
    None => Viewer::anonymous(),
    Some(token) => match InlineJWTClaims::verify(token, secret) {
      Ok(claims) => claims.into_viewer(),
      Err(err) => {
        debug!("ignore invalid bearer token: {}", err);
        Viewer::anonymous()
      },
    },
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InlineJWTClaims {
  pub sub: Option<String>,
  pub exp: i64,
  #[serde(default)]
  pub roles: Vec<String>,
  #[serde(default)]
  pub role: Option<String>,
}

impl InlineJWTClaims {
  pub fn verify(token: &str, secret: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
    Ok(decode(token, &DecodingKey::from_secret(secret), &VALIDATION)?.claims)
  }

  pub fn into_viewer(self) -> Viewer {
    let mut roles = self.roles;
    if let Some(role) = self.role {
      if !roles.contains(&role) {
        roles.push(role);
      }
    }
    match self.sub {
      Some(uid) => Viewer::new(uid, roles),
      None => Viewer { uid: None, roles },
    }
  }
}
