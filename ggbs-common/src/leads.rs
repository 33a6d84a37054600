//! Investor lead records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Public lead submission (investor inquiry form)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl NewLead {
    /// Trim all fields and check the required ones
    ///
    /// Name, email and phone are required; message may be empty.
    pub fn validate(self) -> Result<Self> {
        let lead = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
        };

        if lead.name.is_empty() {
            return Err(Error::InvalidInput("name is required".to_string()));
        }
        if lead.email.is_empty() {
            return Err(Error::InvalidInput("email is required".to_string()));
        }
        if !lead.email.contains('@') {
            return Err(Error::InvalidInput(format!(
                "email '{}' is not a valid address",
                lead.email
            )));
        }
        if lead.phone.is_empty() {
            return Err(Error::InvalidInput("phone is required".to_string()));
        }

        Ok(lead)
    }
}

/// Stored lead as returned by the remote `investors` table
///
/// `id` and `created_at` are assigned by the server. Records are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Text columns are nullable on the server side
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
