//! # GGBS Common Library
//!
//! Shared code for the GGBS content services:
//! - Site content data contracts (media slots, singleton settings row)
//! - Remote connection credentials
//! - Investor lead records
//! - Bootstrap configuration loading
//! - Local database initialization

pub mod config;
pub mod content;
pub mod credentials;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod leads;

pub use content::{MediaSlot, MediaSource, PartialSiteConfiguration, SiteConfiguration, SiteSettingsRow};
pub use credentials::ConnectionCredentials;
pub use error::{Error, Result};
pub use leads::{LeadRecord, NewLead};
