use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::client::TransformationClient;
use crate::errors::HarnessError;
use crate::model::{ModelRef, ProviderId, RequestOptions};
use crate::provider::ProviderAdapter;

/// Registry of provider adapters and the entry point for creating clients.
#[derive(Clone)]
pub struct Harness {
    providers: Arc<HashMap<ProviderId, Arc<dyn ProviderAdapter>>>,
}

impl Harness {
    /// Starts a builder for registering providers and creating a `Harness`.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Returns the registered adapter for `id`, if any.
    pub fn provider(&self, id: &ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.providers.get(id).cloned()
    }

    /// Creates a transformation client bound to `model` with default request options.
    pub fn client(&self, model: ModelRef) -> Result<TransformationClient, HarnessError> {
        self.client_with_options(model, RequestOptions::default())
    }

    /// Creates a transformation client bound to `model`.
    pub fn client_with_options(
        &self,
        model: ModelRef,
        options: RequestOptions,
    ) -> Result<TransformationClient, HarnessError> {
        if model.model.trim().is_empty() {
            return Err(HarnessError::Validation("model must not be empty".into()));
        }
        let provider =
            self.provider(&model.provider)
                .ok_or_else(|| HarnessError::ProviderNotFound {
                    provider: model.provider.clone(),
                })?;
        Ok(TransformationClient::new(provider, model, options))
    }
}

/// Builder used to register provider adapters before creating a `Harness`.
#[derive(Default)]
pub struct HarnessBuilder {
    providers: Vec<Arc<dyn ProviderAdapter>>,
}

impl HarnessBuilder {
    /// Registers a provider adapter.
    ///
    /// Register one adapter per provider id.
    pub fn register_provider(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Builds the harness and rejects duplicate provider ids.
    pub fn build(self) -> Result<Harness, HarnessError> {
        let mut map: HashMap<ProviderId, Arc<dyn ProviderAdapter>> = HashMap::new();
        let mut seen: HashSet<ProviderId> = HashSet::new();
        for provider in self.providers {
            let id = provider.id();
            if !seen.insert(id.clone()) {
                return Err(HarnessError::Config(format!(
                    "duplicate provider registration: {id}"
                )));
            }
            map.insert(id, provider);
        }
        Ok(Harness {
            providers: Arc::new(map),
        })
    }
}
