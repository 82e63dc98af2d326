//! Credential verification for `join-admin`.
//!
//! Verification is pluggable through [`CredentialVerifier`]. The bundled
//! [`AcceptTruthy`] performs no real check: any truthy credential is let in.

use std::fmt::Debug;

use serde_json::Value;

/// Decides whether a `join-admin` credential grants admin-room membership.
pub trait CredentialVerifier: Send + Sync + Debug {
    /// Returns `true` if `credential` is accepted.
    fn verify(&self, credential: &Value) -> bool;
}

/// Accepts every truthy credential.
///
/// `null`, `false`, `0` and `""` are falsy; every other value, including
/// empty arrays and objects, is truthy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptTruthy;

impl CredentialVerifier for AcceptTruthy {
    fn verify(&self, credential: &Value) -> bool {
        is_truthy(credential)
    }
}

/// JavaScript-style truthiness of a JSON value.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
