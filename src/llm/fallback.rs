//! Quota-triggered model substitution.
//!
//! Only the Gemini family gets this treatment: free-tier keys hit
//! RESOURCE_EXHAUSTED often enough that a single model choice is unusable.
//! When the configured model reports a quota signal, the chain walks an
//! ordered list of substitutes and returns the first success as if it had
//! come from the primary model.

use std::future::Future;

use tracing::{info, warn};

use super::error::LLMError;

/// Substitute models tried, in order, when the primary hits a quota cap.
pub const GEMINI_FALLBACK_MODELS: &[&str] =
    &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"];

#[derive(Debug)]
pub struct FallbackChain {
    models: Vec<String>,
}

impl FallbackChain {
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models.into_iter().map(Into::into).collect(),
        }
    }

    pub fn gemini() -> Self {
        Self::new(GEMINI_FALLBACK_MODELS.iter().copied())
    }

    /// Run `attempt` against the primary model, then against each substitute
    /// in order when (and only when) the failure is a quota signal.
    ///
    /// The substitute equal to the primary is skipped; retrying the model
    /// that just reported exhaustion cannot succeed. Non-quota failures from
    /// the primary propagate untouched. When every substitute fails, the
    /// last underlying error is wrapped in
    /// [`LLMError::FallbacksExhausted`].
    pub async fn execute<T, F, Fut>(&self, primary: &str, mut attempt: F) -> Result<T, LLMError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, LLMError>>,
    {
        let primary_err = match attempt(primary.to_string()).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_quota_exhausted() => e,
            Err(e) => return Err(e),
        };
        warn!(model = primary, error = %primary_err, "model quota exhausted, trying fallbacks");

        let mut last = primary_err;
        for model in self.models.iter().filter(|m| m.as_str() != primary) {
            match attempt(model.clone()).await {
                Ok(value) => {
                    info!(model = %model, "fallback model succeeded");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "fallback model failed");
                    last = e;
                }
            }
        }
        Err(LLMError::FallbacksExhausted {
            last: Box::new(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn quota_error() -> LLMError {
        LLMError::Api {
            status: 429,
            message: "RESOURCE_EXHAUSTED".to_string(),
        }
    }

    #[tokio::test]
    async fn primary_success_tries_nothing_else() {
        let calls = Mutex::new(Vec::new());
        let chain = FallbackChain::new(["a", "b", "c"]);

        let result = chain
            .execute("b", |model| {
                calls.lock().unwrap().push(model);
                async { Ok::<_, LLMError>("primary result") }
            })
            .await
            .unwrap();

        assert_eq!(result, "primary result");
        assert_eq!(*calls.lock().unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn quota_failure_skips_primary_in_fallback_list() {
        let calls = Mutex::new(Vec::new());
        let chain = FallbackChain::new(["a", "b", "c"]);

        let result = chain
            .execute("b", |model| {
                calls.lock().unwrap().push(model.clone());
                async move {
                    if model == "a" {
                        Ok("from a")
                    } else {
                        Err(quota_error())
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "from a");
        // b fails on quota, a is tried next and wins; c is never reached
        // and b never reappears as its own substitute.
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["b".to_string(), "a".to_string()]
        );
    }

    #[tokio::test]
    async fn non_quota_failure_propagates_immediately() {
        let calls = Mutex::new(0_u32);
        let chain = FallbackChain::new(["a", "b", "c"]);

        let err = chain
            .execute("b", |_model| {
                *calls.lock().unwrap() += 1;
                async {
                    Err::<(), _>(LLMError::Api {
                        status: 401,
                        message: "invalid api key".to_string(),
                    })
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::Api { status: 401, .. }));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn all_substitutes_failing_aggregates_last_error() {
        let calls = Mutex::new(Vec::new());
        let chain = FallbackChain::new(["a", "b", "c"]);

        let err = chain
            .execute("b", |model| {
                calls.lock().unwrap().push(model.clone());
                async move {
                    Err::<(), _>(LLMError::Api {
                        status: 429,
                        message: format!("quota exceeded for {model}"),
                    })
                }
            })
            .await
            .unwrap_err();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
        match err {
            LLMError::FallbacksExhausted { last } => {
                assert!(last.to_string().contains("quota exceeded for c"));
            }
            other => panic!("expected FallbacksExhausted, got {other}"),
        }
    }

    #[tokio::test]
    async fn primary_outside_list_tries_every_substitute() {
        let calls = Mutex::new(Vec::new());
        let chain = FallbackChain::gemini();

        let result = chain
            .execute("gemini-2.0-exp", |model| {
                calls.lock().unwrap().push(model.clone());
                async move {
                    if model == "gemini-pro" {
                        Ok("late win")
                    } else {
                        Err(quota_error())
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "late win");
        assert_eq!(calls.lock().unwrap().len(), 1 + GEMINI_FALLBACK_MODELS.len());
    }
}
