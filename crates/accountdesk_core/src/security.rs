//! Authentication audit trail.
//!
//! # Invariants
//! - Auth events are logged as metadata lines; account ids, never names or emails.
//! - Identifiers typed into a failed login are sanitized before logging.

use crate::logging::sanitize_message;
use crate::model::account::AccountId;
use log::{info, warn};

const UNKNOWN: &str = "unknown";
const MAX_IDENTIFIER_CHARS: usize = 64;
const MAX_USER_AGENT_CHARS: usize = 120;

/// Request origin as seen by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Resolves the client from request metadata.
    ///
    /// The first `X-Forwarded-For` hop wins over the socket address.
    pub fn from_request_meta(
        forwarded_for: Option<&str>,
        remote_addr: Option<&str>,
        user_agent: Option<&str>,
    ) -> Self {
        let forwarded = forwarded_for
            .and_then(|header| header.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());
        let ip = forwarded
            .or_else(|| remote_addr.map(str::trim).filter(|addr| !addr.is_empty()))
            .map(str::to_string);

        Self {
            ip,
            user_agent: user_agent
                .map(str::trim)
                .filter(|agent| !agent.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn { account_id: AccountId },
    LoggedOut { account_id: AccountId },
    /// `identifier` is whatever username or email was submitted.
    LoginFailed { identifier: Option<String> },
}

impl AuthEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::LoggedIn { .. } => "auth_login",
            Self::LoggedOut { .. } => "auth_logout",
            Self::LoginFailed { .. } => "auth_login_failed",
        }
    }
}

/// Formats the log line for `event`.
pub fn auth_event_line(event: &AuthEvent, client: &ClientInfo) -> String {
    let ip = client.ip.as_deref().unwrap_or(UNKNOWN);
    match event {
        AuthEvent::LoggedIn { account_id } => {
            let user_agent = client
                .user_agent
                .as_deref()
                .map(|agent| sanitize_message(agent, MAX_USER_AGENT_CHARS))
                .unwrap_or_else(|| UNKNOWN.to_string());
            format!(
                "event={} module=security status=ok account_id={account_id} ip={ip} user_agent=\"{user_agent}\"",
                event.name()
            )
        }
        AuthEvent::LoggedOut { account_id } => format!(
            "event={} module=security status=ok account_id={account_id} ip={ip}",
            event.name()
        ),
        AuthEvent::LoginFailed { identifier } => {
            let identifier = identifier
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| sanitize_message(value, MAX_IDENTIFIER_CHARS))
                .unwrap_or_else(|| UNKNOWN.to_string());
            format!(
                "event={} module=security status=error identifier=\"{identifier}\" ip={ip}",
                event.name()
            )
        }
    }
}

/// Emits `event` to the core log. Failed logins are logged at warn level.
pub fn record_auth_event(event: &AuthEvent, client: &ClientInfo) {
    let line = auth_event_line(event, client);
    match event {
        AuthEvent::LoginFailed { .. } => warn!("{line}"),
        _ => info!("{line}"),
    }
}
