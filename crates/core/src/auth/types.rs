use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Authenticated identity acting as the owner of wish-list operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub method: String,
}

impl Identity {
    /// Fixed identity for single-user deployments
    pub fn local() -> Self {
        Self {
            user_id: "local".to_string(),
            method: "none".to_string(),
        }
    }
}
