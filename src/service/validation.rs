use super::ServiceError;

const MAX_USERNAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;

fn is_valid_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

pub fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.is_empty() {
        return Err(ServiceError::invalid("username is required"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(ServiceError::invalid(format!(
            "username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username.chars().all(is_valid_username_char) {
        return Err(ServiceError::invalid(
            "username can only contain alphanumeric characters, hyphens, underscores, and periods",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.is_empty() {
        return Err(ServiceError::invalid("password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ServiceError::invalid("email is not valid")),
    }
}

pub fn require(field: &'static str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("anna.b_2").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("a@b.c").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("@b.c").is_err());
        assert!(validate_email("a@").is_err());
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("name", "Rex").is_ok());
        assert!(matches!(
            require("name", "   "),
            Err(ServiceError::InvalidInput(msg)) if msg == "name is required"
        ));
    }
}
