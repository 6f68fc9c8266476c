//! Google Cloud cost estimation: tiered pricing calculation plus
//! best-effort free tier discovery mined from cloud.google.com docs.

pub mod billing;
pub mod error;
pub mod freetier;
