// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::provider::SandboxClient;
use crate::storage::JsonStore;

/// Authentication configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Shared HS256 secret for bearer tokens. `None` means development
    /// mode: token signatures are not verified.
    pub jwt_secret: Option<String>,
}

/// State handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    store: JsonStore,
    pub auth_config: Arc<AuthConfig>,
    /// eKYC gateway client; `None` when `SANDBOX_API_*` credentials are
    /// absent, in which case verification endpoints return 503.
    provider: Option<Arc<SandboxClient>>,
}

impl AppState {
    pub fn new(
        store: JsonStore,
        auth_config: AuthConfig,
        provider: Option<Arc<SandboxClient>>,
    ) -> Self {
        Self {
            store,
            auth_config: Arc::new(auth_config),
            provider,
        }
    }

    /// Snapshot of the JSON store for repository construction.
    pub fn storage(&self) -> JsonStore {
        self.store.clone()
    }

    /// The configured gateway client, if any.
    pub fn provider(&self) -> Option<Arc<SandboxClient>> {
        self.provider.clone()
    }

    /// State without a gateway client, for handler and extractor tests.
    #[cfg(test)]
    pub fn for_tests(store: JsonStore, auth_config: AuthConfig) -> Self {
        Self::new(store, auth_config, None)
    }
}
