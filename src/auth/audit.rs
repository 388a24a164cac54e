//! Best-effort audit notifications.
//!
//! Issuance emits a `user.login` event on an in-process channel; a
//! spawned worker logs it. The send is fire-and-forget — a closed or
//! backed-up sink never fails the operation that produced the event.

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::roles::Role;

/// One audit notification.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event: &'static str,
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl AuditEvent {
    #[must_use]
    pub fn user_login(user_id: Uuid, roles: Vec<Role>) -> Self {
        Self {
            event: "user.login",
            user_id,
            roles,
        }
    }
}

/// Sending half handed to [`SessionService`](crate::auth::SessionService).
#[derive(Clone, Debug)]
pub struct AuditSink {
    tx: mpsc::UnboundedSender<AuditEvent>,
}

impl AuditSink {
    /// Emit an event. Errors are swallowed by design: audit is a side
    /// channel, not part of the transactional contract.
    pub fn emit(&self, event: AuditEvent) {
        if self.tx.send(event).is_err() {
            debug!("audit sink closed; event dropped");
        }
    }
}

/// Spawn the worker that drains the audit channel, and return the sink.
#[must_use]
pub fn spawn_audit_worker() -> AuditSink {
    let (tx, mut rx) = mpsc::unbounded_channel::<AuditEvent>();

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let roles: Vec<&str> = event.roles.iter().map(Role::as_str).collect();
            let payload = json!({
                "event": event.event,
                "userId": event.user_id.to_string(),
                "roles": roles,
            });
            info!(audit = %payload, "audit event");
        }
    });

    AuditSink { tx }
}
