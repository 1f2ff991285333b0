use super::CredentialError;

/// Extracts the raw credential from an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Result<&str, CredentialError> {
    match auth_header {
        Some(header) => {
            let token = header
                .strip_prefix("Bearer ")
                .ok_or(CredentialError::InvalidScheme)?
                .trim();
            if token.is_empty() {
                return Err(CredentialError::Missing);
            }
            Ok(token)
        }
        None => Err(CredentialError::Missing),
    }
}
