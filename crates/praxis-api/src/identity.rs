//! Caller identity extraction.
//!
//! Authentication is the deployment's concern (a gateway in front of this
//! service). The gateway asserts the verified identity via headers:
//!
//! | Header           | Required | Meaning                               |
//! |------------------|----------|---------------------------------------|
//! | `x-learner-id`   | yes      | UUID of the authenticated user        |
//! | `x-learner-name` | yes      | Display name (stamped on certificates)|
//! | `x-role`         | no       | `student` (default), `instructor`, `admin` |

use axum::{extract::FromRequestParts, http::request::Parts};
use praxis_core::identity::{Identity, Role};
use uuid::Uuid;

use crate::error::ApiError;

const LEARNER_ID: &str = "x-learner-id";
const LEARNER_NAME: &str = "x-learner-name";
const ROLE: &str = "x-role";

/// The authenticated caller, extracted from gateway headers.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
  parts
    .headers
    .get(name)
    .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))?
    .to_str()
    .map_err(|_| ApiError::Unauthorized(format!("malformed {name} header")))
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let learner_id = header(parts, LEARNER_ID)?
      .parse::<Uuid>()
      .map_err(|_| {
        ApiError::Unauthorized(format!("{LEARNER_ID} is not a UUID"))
      })?;
    let display_name = header(parts, LEARNER_NAME)?.to_owned();

    let role = match parts.headers.get(ROLE) {
      None => Role::Student,
      Some(v) => v
        .to_str()
        .ok()
        .and_then(|s| s.parse::<Role>().ok())
        .ok_or_else(|| {
          ApiError::Unauthorized(format!("unrecognised {ROLE} header"))
        })?,
    };

    Ok(Caller(Identity { learner_id, display_name, role }))
  }
}
