use anyhow::Result;
use tracing::{debug, info};

use crate::db::Store;

/// Outcome of a quota check. `request_count` is the counter after the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed { request_count: i32 },
    Denied { request_count: i32 },
}

impl QuotaDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Cumulative per-user request cap.
///
/// The counter starts at 1 on the first request and is never reset.
#[derive(Clone)]
pub struct QuotaService {
    store: Store,
    max_requests: i32,
}

impl QuotaService {
    #[must_use]
    pub const fn new(store: Store, max_requests: i32) -> Self {
        Self {
            store,
            max_requests,
        }
    }

    /// Checks the user's counter and records the request when allowed.
    pub async fn check_and_record(&self, user_id: &str) -> Result<QuotaDecision> {
        let user = match self.store.get_user(user_id).await? {
            Some(user) => user,
            None => {
                if self.store.create_user(user_id).await? {
                    info!(event = "user_created", user_id = %user_id, "First request from new user");
                    return Ok(QuotaDecision::Allowed { request_count: 1 });
                }

                // Lost the insert race; continue as an existing user.
                debug!(user_id = %user_id, "Concurrent first request, retrying as existing user");
                self.store.get_user(user_id).await?.ok_or_else(|| {
                    anyhow::anyhow!("User {user_id} missing after unique constraint rejection")
                })?
            }
        };

        if user.request_count >= self.max_requests {
            return Ok(self.denied(user_id, user.request_count));
        }

        if self
            .store
            .increment_request_count(user_id, self.max_requests)
            .await?
        {
            Ok(QuotaDecision::Allowed {
                request_count: user.request_count + 1,
            })
        } else {
            // A concurrent request took the last slot.
            Ok(self.denied(user_id, self.max_requests))
        }
    }

    fn denied(&self, user_id: &str, request_count: i32) -> QuotaDecision {
        metrics::counter!("quota_denied_total").increment(1);
        info!(
            event = "quota_denied",
            user_id = %user_id,
            request_count,
            max_requests = self.max_requests,
            "Request quota exceeded"
        );
        QuotaDecision::Denied { request_count }
    }
}
