//! Stub providers and recording collaborators

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::composer::{ClientError, EmailDispatch, ImageGeneration};
use crate::email::DeliveryReceipt;
use crate::gateway::send::SendEcardRequest;
use crate::imagegen::{GenerationParams, ImageModel, ProviderError};
use crate::records::{CardRepository, ECardRecord, RecordError};

/// Image model returning a fixed answer
#[derive(Debug, Clone)]
pub struct StubImageModel {
    answer: Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl StubImageModel {
    /// Model answering every prompt with `url`
    #[must_use]
    pub fn succeeding(url: impl Into<String>) -> Self {
        Self {
            answer: Ok(url.into()),
            calls: Arc::default(),
        }
    }

    /// Model failing every prompt with `reason`
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            answer: Err(reason.into()),
            calls: Arc::default(),
        }
    }

    /// Number of generate calls received
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageModel for StubImageModel {
    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().map_err(|reason| ProviderError::PredictionFailed {
            status: "failed".to_string(),
            reason,
        })
    }
}

/// Composer-side image generation returning a fixed answer
#[derive(Debug, Clone)]
pub struct StubImageGeneration {
    answer: Result<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubImageGeneration {
    /// Generation answering every prompt with `url`
    #[must_use]
    pub fn succeeding(url: impl Into<String>) -> Self {
        Self {
            answer: Ok(url.into()),
            prompts: Arc::default(),
        }
    }

    /// Generation failing every prompt with `error`
    #[must_use]
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            answer: Err(error.into()),
            prompts: Arc::default(),
        }
    }

    /// Prompts received so far
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ImageGeneration for StubImageGeneration {
    async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        self.prompts.lock().push(prompt.to_string());
        self.answer.clone().map_err(|error| ClientError::Gateway {
            status: 500,
            error,
            details: None,
        })
    }
}

/// Card repository keeping records in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingCardRepository {
    records: Arc<Mutex<Vec<ECardRecord>>>,
    fail: bool,
}

impl RecordingCardRepository {
    /// Repository accepting every insert
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository rejecting every insert
    #[must_use]
    pub fn failing() -> Self {
        Self {
            records: Arc::default(),
            fail: true,
        }
    }

    /// Records inserted so far
    #[must_use]
    pub fn records(&self) -> Vec<ECardRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl CardRepository for RecordingCardRepository {
    async fn insert(&self, record: &ECardRecord) -> Result<(), RecordError> {
        if self.fail {
            return Err(RecordError::Database(sqlx::Error::PoolClosed));
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Composer-side email dispatch capturing requests
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatch {
    requests: Arc<Mutex<Vec<SendEcardRequest>>>,
    failure: Option<String>,
}

impl RecordingDispatch {
    /// Dispatch accepting every request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch rejecting every request with `error`
    #[must_use]
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            requests: Arc::default(),
            failure: Some(error.into()),
        }
    }

    /// Requests received so far, including rejected ones
    #[must_use]
    pub fn requests(&self) -> Vec<SendEcardRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl EmailDispatch for RecordingDispatch {
    async fn dispatch(&self, request: &SendEcardRequest) -> Result<DeliveryReceipt, ClientError> {
        let count = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len()
        };
        match &self.failure {
            Some(error) => Err(ClientError::Gateway {
                status: 500,
                error: error.clone(),
                details: None,
            }),
            None => Ok(DeliveryReceipt::with_id(format!("dispatch-{count}"))),
        }
    }
}
