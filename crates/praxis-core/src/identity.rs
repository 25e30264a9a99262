//! Caller identity, threaded explicitly through every operation.
//!
//! Authentication lives upstream (a gateway verifies the token and forwards
//! the claims). This core trusts the supplied identity and only checks
//! ownership and role where an operation demands it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// The caller's role as asserted by the upstream gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Student,
  Instructor,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Student => "student",
      Self::Instructor => "instructor",
      Self::Admin => "admin",
    }
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "student" => Ok(Self::Student),
      "instructor" => Ok(Self::Instructor),
      "admin" => Ok(Self::Admin),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

/// The verified caller of an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub learner_id:   Uuid,
  /// Display name as asserted by the gateway; denormalised onto
  /// certificates at issue time.
  pub display_name: String,
  pub role:         Role,
}

impl Identity {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}
