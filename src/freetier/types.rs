use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an allowance is shared across a billing account or granted
/// per individual project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Account,
    Project,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Account => write!(f, "account"),
            Scope::Project => write!(f, "project"),
        }
    }
}

/// How often a free tier allowance resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Month,
    Always,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Month => write!(f, "month"),
            Period::Always => write!(f, "always"),
        }
    }
}

/// A single free tier resource allocation, e.g. "240000 vCPU-seconds".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeTierItem {
    pub resource: String,
    pub amount: f64,
    pub unit: String,
}

/// All free tier information resolved for one service. Immutable once
/// constructed; a refresh produces a new record rather than mutating
/// this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeTierRecord {
    pub service_name: String,
    pub items: Vec<FreeTierItem>,
    pub scope: Scope,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    pub source_url: String,
}
