//! Per-request context consumed by the audit logger.

use uuid::Uuid;

/// Who did what, from where. Built once per request by the HTTP layer and
/// passed by reference to every audit call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub actor_id: Option<Uuid>,
    pub request_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
}

impl RequestContext {
    /// Copy of this context attributed to `actor_id`.
    pub fn with_actor(&self, actor_id: Uuid) -> Self {
        Self {
            actor_id: Some(actor_id),
            ..self.clone()
        }
    }
}
