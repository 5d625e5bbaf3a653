// SPDX-FileCopyrightText: 2026 Syndica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter registry.

use std::collections::HashMap;
use std::sync::Arc;

use syndica_core::types::Provider;
use syndica_core::{ProviderAdapter, SyndicaError};

/// Maps each platform to its registered adapter.
///
/// Built once at startup from the enabled providers in config; read-only
/// afterwards.
#[derive(Default)]
pub struct ProviderRegistry {
    adapters: HashMap<Provider, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under the provider it reports. A later
    /// registration for the same provider replaces the earlier one.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    pub fn get(&self, provider: Provider) -> Result<Arc<dyn ProviderAdapter>, SyndicaError> {
        self.adapters
            .get(&provider)
            .cloned()
            .ok_or(SyndicaError::AdapterNotFound(provider))
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.adapters.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
