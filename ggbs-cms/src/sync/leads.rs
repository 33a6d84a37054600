//! Investor lead submission and listing
//!
//! Leads live only in the remote `investors` table; nothing is cached
//! locally. Without credentials a submission is dropped (logged, not
//! raised) and the listing is empty.

use super::SyncContext;
use ggbs_common::{LeadRecord, NewLead};
use tracing::{info, warn};

/// What happened to a submitted lead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadOutcome {
    Recorded,
    Discarded,
}

#[derive(Clone)]
pub struct LeadDesk {
    ctx: SyncContext,
}

impl LeadDesk {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    pub async fn submit_lead(&self, lead: &NewLead) -> LeadOutcome {
        let Some((credentials, _)) = self.ctx.active_credentials().await else {
            warn!("Lead discarded: remote store not configured");
            return LeadOutcome::Discarded;
        };

        match self
            .ctx
            .bounded(self.ctx.remote().insert_lead(&credentials, lead))
            .await
        {
            Ok(()) => {
                info!("Lead recorded");
                LeadOutcome::Recorded
            }
            Err(e) => {
                warn!("Lead discarded: {}", e);
                LeadOutcome::Discarded
            }
        }
    }

    /// All leads, newest first. Empty when the remote store is unavailable.
    pub async fn list_leads(&self) -> Vec<LeadRecord> {
        let Some((credentials, _)) = self.ctx.active_credentials().await else {
            return Vec::new();
        };

        match self
            .ctx
            .bounded(self.ctx.remote().list_leads(&credentials))
            .await
        {
            Ok(mut leads) => {
                leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                leads
            }
            Err(e) => {
                warn!("Lead listing unavailable: {}", e);
                Vec::new()
            }
        }
    }
}
