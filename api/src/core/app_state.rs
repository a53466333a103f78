use std::sync::atomic::{AtomicBool, Ordering};

use recommend_service::{GeminiModelConfig, config_from_env};

/// Where handlers get the Gemini config from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Re-read from the environment on every request.
    Env,
    /// Fixed at startup.
    Fixed(GeminiModelConfig),
}

/// Shared state for all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    config: ConfigSource,
    /// Set while a recommendation is outstanding.
    busy: AtomicBool,
}

impl AppState {
    pub fn new(config: ConfigSource) -> Self {
        Self {
            config,
            busy: AtomicBool::new(false),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ConfigSource::Env)
    }

    /// Current Gemini config.
    pub fn gemini_config(&self) -> recommend_service::Result<GeminiModelConfig> {
        match &self.config {
            ConfigSource::Env => config_from_env(),
            ConfigSource::Fixed(cfg) => Ok(cfg.clone()),
        }
    }

    /// Takes the single-flight gate, or `None` if a request already holds it.
    ///
    /// The gate is released when the returned guard is dropped.
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }
}

#[must_use]
pub struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_admits_one_holder_at_a_time() {
        let state = AppState::from_env();

        let first = state.try_acquire();
        assert!(first.is_some());
        assert!(state.try_acquire().is_none());

        drop(first);
        assert!(state.try_acquire().is_some());
    }
}
