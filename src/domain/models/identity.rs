use serde::{Deserialize, Serialize};

/// Role asserted by the identity provider in front of this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Tenant,
}

/// The authenticated caller, as forwarded by the gateway. Authentication
/// itself happens upstream (Keycloak); this service only consumes the
/// asserted identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_act_on(&self, owner_user_id: &str) -> bool {
        self.is_admin() || self.user_id == owner_user_id
    }
}
