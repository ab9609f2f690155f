//! WeChat Pay API trait and context
//!
//! Provides the base trait and context for all WeChat Pay API implementations.

use std::sync::Arc;

use crate::client::PayClient;

/// Context holding shared resources for WeChat Pay API implementations.
///
/// Wraps the signing/transport client every endpoint group delegates to.
#[derive(Clone)]
pub struct PayContext {
    /// The client that signs, sends and verifies requests
    pub(crate) client: Arc<PayClient>,
}

impl std::fmt::Debug for PayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayContext")
            .field("client", &"PayClient { .. }")
            .finish()
    }
}

impl PayContext {
    /// Create a new PayContext
    pub fn new(client: Arc<PayClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the WeChat Pay client.
    pub fn client(&self) -> &PayClient {
        &self.client
    }
}

/// Trait for WeChat Pay API implementations.
///
/// All API modules should implement this trait to provide
/// access to the shared context.
pub trait WechatPayApi: Send + Sync {
    /// Get a reference to the WeChat Pay context
    fn context(&self) -> &PayContext;

    /// Get the name of this API for logging and error context.
    fn api_name(&self) -> &'static str {
        "unknown"
    }
}
