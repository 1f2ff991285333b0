use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::types::{Principal, Role, User};

const SIGNING_KEY_BYTES: usize = 32;

/// Why a bearer credential could not be turned into a [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("missing token")]
    Missing,
    #[error("invalid authorization scheme")]
    InvalidScheme,
    #[error("invalid token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("invalid token: missing or invalid {0} claim")]
    MissingClaim(&'static str),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    user_id: i64,
    #[serde(default)]
    role: String,
    #[serde(default)]
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Issues and decodes HS256-signed bearer credentials.
pub struct CredentialVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issues a credential for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String> {
        self.issue_at(user.id, user.role, &user.username, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: i64,
        role: Role,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Credential("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: subject.to_string(),
            user_id,
            role: role.as_str().to_string(),
            iat: issued_at.timestamp(),
            exp: Some(expires_at.timestamp()),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Credential(format!("failed to sign token: {e}")))
    }

    /// Decodes a raw credential (without the `Bearer ` prefix) into a principal.
    pub fn decode(&self, token: &str) -> std::result::Result<Principal, CredentialError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                ErrorKind::MissingRequiredClaim(_) => CredentialError::MissingClaim("exp"),
                _ => CredentialError::Malformed,
            })?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(CredentialError::MissingClaim("username"));
        }
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| CredentialError::MissingClaim("role"))?;
        if claims.user_id <= 0 {
            return Err(CredentialError::MissingClaim("user_id"));
        }

        Ok(Principal::new(claims.user_id, role, claims.sub))
    }
}

/// Generates a random hex-encoded signing key.
#[must_use]
pub fn generate_signing_key() -> String {
    let mut bytes = [0u8; SIGNING_KEY_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Reads a signing key written by [`generate_signing_key`].
pub fn load_signing_key(path: &Path) -> Result<Vec<u8>> {
    let content = fs::read_to_string(path)?;
    let key = hex::decode(content.trim())
        .map_err(|e| Error::Config(format!("invalid signing key in {}: {e}", path.display())))?;
    if key.len() < SIGNING_KEY_BYTES {
        return Err(Error::Config(format!(
            "signing key in {} is too short",
            path.display()
        )));
    }
    Ok(key)
}
