//! Email notifications through the serverless email relay (POST {to, subject, body} as JSON).

use crate::models::TeamInvitation;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("email relay answered {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Client for the email relay. Without an endpoint, messages are only logged.
#[derive(Clone, Debug)]
pub struct Mailer {
    client: Client,
    endpoint: Option<String>,
}

impl Default for Mailer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Mailer {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("padel-league/0.1 (invitation mailer)")
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            endpoint,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let Some(endpoint) = &self.endpoint else {
            log::info!(
                "Email relay not configured; would send '{}' to {}",
                message.subject,
                message.to
            );
            return Ok(());
        };
        let response = self.client.post(endpoint).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        log::info!("Sent '{}' to {}", message.subject, message.to);
        Ok(())
    }
}

/// Invitation email with the accept link.
pub fn invitation_email(
    invitation: &TeamInvitation,
    team_name: &str,
    inviter_name: &str,
    public_url: &str,
) -> EmailMessage {
    let link = format!("{}/invitations/{}", public_url.trim_end_matches('/'), invitation.code);
    EmailMessage {
        to: invitation.invited_email.clone(),
        subject: format!("{inviter_name} invited you to join {team_name}"),
        body: format!(
            "Hi!\n\n{inviter_name} wants you as partner in the padel team \"{team_name}\".\n\n\
             Sign in with this email address and accept the invitation here:\n{link}\n\n\
             Invitation code: {}\n",
            invitation.code
        ),
    }
}
