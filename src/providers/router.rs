//! Fallback router: first provider to answer wins.

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use super::base::ChatProvider;
use crate::errors::ProviderError;

/// Ordered provider chain. `chat` delegates to each provider in turn and
/// returns the first non-error result; when all fail, the last error is
/// propagated.
pub struct FallbackRouter {
    providers: Vec<Box<dyn ChatProvider>>,
}

impl FallbackRouter {
    pub fn new(providers: Vec<Box<dyn ChatProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl ChatProvider for FallbackRouter {
    fn name(&self) -> &str {
        "router"
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String> {
        let mut last_error: Option<anyhow::Error> = None;
        for provider in &self.providers {
            match provider.chat(system, user, model, temperature).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("provider '{}' failed: {}", provider.name(), e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| ProviderError::Exhausted("no providers configured".into()).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::echo::EchoProvider;

    struct AlwaysFail;

    #[async_trait]
    impl ChatProvider for AlwaysFail {
        fn name(&self) -> &str {
            "always-fail"
        }
        async fn chat(
            &self,
            _system: &str,
            _user: &str,
            _model: &str,
            _temperature: f64,
        ) -> Result<String> {
            Err(ProviderError::Transport("connection refused".into()).into())
        }
    }

    #[tokio::test]
    async fn test_falls_through_to_working_provider() {
        let router = FallbackRouter::new(vec![
            Box::new(AlwaysFail),
            Box::new(EchoProvider::new()),
        ]);
        let reply = router.chat("s", "ping", "m", 0.7).await.unwrap();
        // The fallback's output comes back; the first error is swallowed.
        assert_eq!(reply, "BareClaw echo (no API key configured): ping");
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let router = FallbackRouter::new(vec![
            Box::new(EchoProvider::new()),
            Box::new(AlwaysFail),
        ]);
        let reply = router.chat("s", "hi", "m", 0.7).await.unwrap();
        assert!(reply.contains("hi"));
    }

    #[tokio::test]
    async fn test_all_fail_returns_last_error() {
        let router = FallbackRouter::new(vec![Box::new(AlwaysFail), Box::new(AlwaysFail)]);
        let err = router.chat("s", "u", "m", 0.7).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_router_errors() {
        let router = FallbackRouter::new(Vec::new());
        let err = router.chat("s", "u", "m", 0.7).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::Exhausted(_))
        ));
    }
}
