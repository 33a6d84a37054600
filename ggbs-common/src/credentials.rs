//! Remote store connection credentials

use serde::{Deserialize, Serialize};

/// Endpoint + access token for the remote store
///
/// Both halves are required. A pair with either half blank is kept as-is
/// (so the admin sees what was entered) but is never used for a remote call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCredentials {
    pub endpoint: String,
    pub token: String,
}

impl ConnectionCredentials {
    /// Build a pair, trimming surrounding whitespace from both halves
    pub fn new(endpoint: impl AsRef<str>, token: impl AsRef<str>) -> Self {
        Self {
            endpoint: endpoint.as_ref().trim().trim_end_matches('/').to_string(),
            token: token.as_ref().trim().to_string(),
        }
    }

    /// Both halves present
    pub fn is_usable(&self) -> bool {
        !self.endpoint.is_empty() && !self.token.is_empty()
    }

    /// Token reduced to its last four characters for status displays
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(8), tail)
    }
}

impl std::fmt::Debug for ConnectionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCredentials")
            .field("endpoint", &self.endpoint)
            .field("token", &self.masked_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_both_halves() {
        let creds = ConnectionCredentials::new("  https://abc.supabase.co/ \n", "\t key123  ");
        assert_eq!(creds.endpoint, "https://abc.supabase.co");
        assert_eq!(creds.token, "key123");
        assert!(creds.is_usable());
    }

    #[test]
    fn test_half_pair_is_not_usable() {
        assert!(!ConnectionCredentials::new("", "token").is_usable());
        assert!(!ConnectionCredentials::new("https://x.supabase.co", "   ").is_usable());
        assert!(!ConnectionCredentials::new("", "").is_usable());
    }

    #[test]
    fn test_debug_never_prints_token() {
        let creds = ConnectionCredentials::new("https://x.supabase.co", "super-secret-token-9876");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("9876"));
    }

    #[test]
    fn test_masked_token_short() {
        let creds = ConnectionCredentials::new("https://x.supabase.co", "abc");
        assert_eq!(creds.masked_token(), "***");
    }
}
