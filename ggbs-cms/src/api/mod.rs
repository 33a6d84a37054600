//! HTTP API handlers for ggbs-cms

pub mod content;
pub mod health;
pub mod leads;
pub mod media;

pub use content::{get_content, get_connection, put_connection, put_content};
pub use health::health_routes;
pub use leads::{list_leads, submit_lead};
pub use media::{serve_preview, upload_media};
