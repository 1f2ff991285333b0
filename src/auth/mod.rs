mod gate;
mod helpers;
mod middleware;
mod ownership;
mod password;
mod token;

pub use gate::{ForbiddenError, RouteClass, authorize};
pub use helpers::extract_bearer_token;
pub use middleware::{AuthError, RequireAdmin, RequireOwner, RequireStaff};
pub use ownership::{Owned, OwnershipError, authorize_fetched, check_ownership};
pub use password::PasswordManager;
pub use token::{CredentialError, CredentialVerifier, generate_signing_key, load_signing_key};
