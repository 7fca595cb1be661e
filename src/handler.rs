//! Queue message dispatch.

use crate::error::ApiError;
use crate::payload::{Payload, RequestLookup, Requests};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Executes a decoded request.
#[async_trait]
pub trait RequestProcessor: Send + Sync {
    async fn process(&self, requests: &Requests, action: &str) -> Result<(), ApiError>;
}

/// Decodes raw queue messages and hands the resulting requests to a
/// processor.
pub struct MessageHandler {
    lookup: Arc<dyn RequestLookup>,
    processor: Arc<dyn RequestProcessor>,
}

impl MessageHandler {
    pub fn new(lookup: Arc<dyn RequestLookup>, processor: Arc<dyn RequestProcessor>) -> Self {
        Self { lookup, processor }
    }

    pub async fn handle(&self, raw: &[u8]) -> Result<(), ApiError> {
        let requests = match self.parse(raw).await {
            Ok(requests) => requests,
            Err(e) => {
                error!(error = %e, "Error parsing request");
                return Err(e);
            }
        };
        debug!(category = %requests.category, action = %requests.action, "dispatching request");
        let action = requests.action.clone();
        self.processor.process(&requests, &action).await
    }

    async fn parse(&self, raw: &[u8]) -> Result<Requests, ApiError> {
        let payload = Payload::decode(raw)?;
        payload.convert(self.lookup.as_ref()).await
    }
}
