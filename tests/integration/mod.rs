use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dealbot::auth::{CredentialResolver, TokenAcquirer};
use dealbot::config::{AppConfig, HttpConfig, LoggingConfig, MetricsConfig, SchedulerConfig};
use dealbot::models::{DealResult, Source};
use dealbot::notifiers::{NotificationReceipt, Notifier};
use dealbot::querier::SourceQuerier;
use dealbot::{AppError, Result};

pub mod query_tests;

pub fn secrets(pairs: &[(&str, &str)]) -> Arc<HashMap<String, String>> {
    Arc::new(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

pub fn create_test_config(sources: Vec<Source>, terms: &[&str]) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        search_terms: terms.iter().map(|t| t.to_string()).collect(),
        api_sources: sources,
        scheduler: SchedulerConfig::default(),
        http: HttpConfig {
            request_timeout_secs: 5,
            ..HttpConfig::default()
        },
        logging: LoggingConfig::default(),
        metrics: MetricsConfig::default(),
    })
}

pub fn create_test_querier(secrets: Arc<HashMap<String, String>>) -> SourceQuerier {
    let client = SourceQuerier::build_client(&HttpConfig::default()).unwrap();
    let credentials = CredentialResolver::with_defaults(secrets, TokenAcquirer::new(client.clone()));
    SourceQuerier::new(client, credentials)
}

/// Notifier that keeps every batch it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub batches: Mutex<Vec<Vec<DealResult>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, deals: &[DealResult]) -> Result<NotificationReceipt> {
        self.batches.lock().unwrap().push(deals.to_vec());
        if self.fail {
            return Err(AppError::Validation("mail server unavailable".to_string()));
        }
        Ok(NotificationReceipt {
            notifier: self.name().to_string(),
            message_id: None,
            deal_count: deals.len(),
        })
    }
}
