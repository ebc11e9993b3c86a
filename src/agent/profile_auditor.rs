//! Recruiter first-impression audit of the profile page.

use crate::agent::client::ChatClient;
use crate::agent::prompts::{build_profile_prompt, PROFILE_SYSTEM_PROMPT};
use crate::agent::response::parse_profile_audit;
use crate::models::{ProfileAudit, UserProfile};
use tracing::{error, info};

pub const PROFILE_AUDIT_TEMPERATURE: f32 = 0.5;

pub struct ProfileAuditor {
    chat: ChatClient,
    temperature: f32,
}

impl ProfileAuditor {
    pub fn new(chat: ChatClient, temperature: f32) -> Self {
        Self { chat, temperature }
    }

    /// Audit the profile. Never fails: any error yields [`ProfileAudit::unavailable`].
    pub async fn audit(&self, user: &UserProfile, profile_readme: &str) -> ProfileAudit {
        let prompt = build_profile_prompt(user, profile_readme);

        let json = match self
            .chat
            .complete_json(PROFILE_SYSTEM_PROMPT, &prompt, self.temperature)
            .await
        {
            Ok(json) => json,
            Err(e) => {
                error!("Profile audit failed: {}", e);
                return ProfileAudit::unavailable();
            }
        };

        match parse_profile_audit(&json) {
            Some(audit) => {
                info!("Profile audit for {}: {}", user.login, audit.score);
                audit
            }
            None => {
                error!("Profile audit reply had no usable score");
                ProfileAudit::unavailable()
            }
        }
    }
}
