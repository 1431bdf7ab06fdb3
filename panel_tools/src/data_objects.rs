use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//----------------------------------------------   Envelopes  ----------------------------------------------------

/// A single resource, as the panel returns it: `{"object": "server", "attributes": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub object: String,
    pub attributes: T,
}

/// A page of resources: `{"object": "list", "data": [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<Envelope<T>>,
}

impl<T> ListEnvelope<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.data.into_iter().map(|e| e.attributes).collect()
    }
}

//----------------------------------------------   Accounts  ----------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: i64,
    pub uuid: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub root_admin: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

//----------------------------------------------   Servers  ----------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Megabytes
    pub memory: i64,
    #[serde(default)]
    pub swap: i64,
    /// Megabytes
    pub disk: i64,
    #[serde(default = "default_io")]
    pub io: i64,
    /// Percent of a single core. 200 is two full cores.
    pub cpu: i64,
}

fn default_io() -> i64 {
    500
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLimits {
    pub databases: i64,
    pub allocations: i64,
    pub backups: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: i64,
    pub uuid: String,
    /// The short id used in panel URLs
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub suspended: bool,
    pub limits: Limits,
    pub feature_limits: FeatureLimits,
    /// The owning account id
    pub user: i64,
    pub node: i64,
    pub allocation: i64,
    pub nest: i64,
    pub egg: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationRef {
    pub default: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewServer {
    pub name: String,
    pub user: i64,
    pub egg: i64,
    pub docker_image: String,
    pub startup: String,
    pub environment: HashMap<String, String>,
    pub limits: Limits,
    pub feature_limits: FeatureLimits,
    pub allocation: AllocationRef,
    pub start_on_completion: bool,
}

//----------------------------------------------   Infrastructure  ----------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: i64,
    pub name: String,
    pub fqdn: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
    pub memory: i64,
    pub disk: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Nest {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EggVariable {
    pub name: String,
    pub env_variable: String,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EggRelationships {
    #[serde(default)]
    pub variables: Option<ListEnvelope<EggVariable>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Egg {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub nest: i64,
    pub docker_image: String,
    pub startup: String,
    #[serde(default)]
    pub relationships: EggRelationships,
}

impl Egg {
    /// The egg's variables with their default values. Only populated when the egg was fetched with
    /// `include=variables`.
    pub fn default_environment(&self) -> HashMap<String, String> {
        self.relationships
            .variables
            .as_ref()
            .map(|vars| {
                vars.data
                    .iter()
                    .map(|v| {
                        let v = &v.attributes;
                        (v.env_variable.clone(), v.default_value.clone().unwrap_or_default())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Allocation {
    pub id: i64,
    pub ip: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub port: u16,
    pub assigned: bool,
}

impl Allocation {
    pub fn address(&self) -> String {
        format!("{}:{}", self.alias.as_deref().unwrap_or(&self.ip), self.port)
    }
}

/// Returns the first allocation not yet bound to a server.
pub fn first_unassigned(allocations: Vec<Allocation>) -> Option<Allocation> {
    allocations.into_iter().find(|a| !a.assigned)
}
