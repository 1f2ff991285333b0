use thiserror::Error;

use crate::types::{Principal, Role};

/// Minimum privilege a group of routes requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    AdminOnly,
    StaffOrAbove,
    /// Any authenticated principal.
    OwnerOrAbove,
}

impl RouteClass {
    #[must_use]
    pub const fn minimum_role(self) -> Role {
        match self {
            RouteClass::AdminOnly => Role::Admin,
            RouteClass::StaffOrAbove => Role::Staff,
            RouteClass::OwnerOrAbove => Role::Owner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} access required", .required.minimum_role())]
pub struct ForbiddenError {
    pub required: RouteClass,
}

/// Checks the principal's role against the route class.
pub fn authorize(route: RouteClass, principal: &Principal) -> Result<(), ForbiddenError> {
    if principal.role >= route.minimum_role() {
        Ok(())
    } else {
        Err(ForbiddenError { required: route })
    }
}
