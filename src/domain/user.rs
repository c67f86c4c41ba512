use serde::{Deserialize, Serialize};

/// Identity claims extracted from a login token.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Claims {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub roles: Vec<String>,
}

/// Organisation unit the user is attached to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrgUnit {
    pub id: u32,
    pub name: String,
    pub parent: u32,
    pub level_name: String,
    pub is_country: bool,
}

/// Body of `POST /{db}/_user/` on the sync gateway admin API.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SyncGatewayUser {
    pub name: String,
    pub password: String,
    pub admin_channels: Vec<String>,
    pub all_channels: Vec<String>,
    pub disabled: bool,
    pub admin_roles: Vec<String>,
    pub roles: Vec<String>,
}

/// Credentials handed back to the device after login.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ProvisionedUser {
    pub name: String,
    pub password: String,
    pub admin_roles: Vec<String>,
    pub admin_channels: Vec<String>,
    pub geographic_info: Vec<OrgUnit>,
}
