use axum::extract::FromRef;
use sbox_domain::config::AppConfig;
use sbox_storage::Storage;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[sbox_derive::sbox_error]
pub enum AppStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct AppStateInner {
    pub config: AppConfig,
    pub storage: Storage,
}

/// Cheaply clonable state shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<AppState> for Storage {
    fn from_ref(state: &AppState) -> Self {
        state.inner.storage.clone()
    }
}

#[derive(Debug, Default)]
pub struct AppStateBuilder {
    config: Option<AppConfig>,
    storage: Option<Storage>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// # Errors
    /// Returns [`AppStateError::Validation`] if the storage handle was not provided.
    pub fn build(self) -> Result<AppState, AppStateError> {
        let storage = self.storage.ok_or_else(|| AppStateError::Validation {
            message: "Storage not provided".into(),
            context: None,
        })?;
        let config = self.config.unwrap_or_default();
        super::health::mark_started();

        Ok(AppState { inner: Arc::new(AppStateInner { config, storage }) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_storage() {
        let err = AppState::builder().config(AppConfig::default()).build().unwrap_err();
        assert_eq!(err.kind(), "Validation");
        assert!(err.to_string().contains("Storage not provided"));
    }

    #[tokio::test]
    async fn extractors_share_the_same_handles() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::builder().root(tmp.path().join("pictures")).connect().await.unwrap();

        let mut config = AppConfig::default();
        config.server.port = 4321;

        let state = AppState::builder().config(config).storage(storage).build().unwrap();

        let config = AppConfig::from_ref(&state);
        let storage = Storage::from_ref(&state);
        assert_eq!(config.server.port, 4321);
        assert_eq!(storage.root(), state.storage.root());
    }
}
