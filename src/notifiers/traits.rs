use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::DealResult;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationReceipt {
    pub notifier: String,
    pub message_id: Option<String>,
    pub deal_count: usize,
}

/// Delivers the deals found by one run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, deals: &[DealResult]) -> Result<NotificationReceipt>;
}
