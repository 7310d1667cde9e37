//! Randomized multi-model generation with bounded retries and fallback.
//!
//! Providers fail in two independent ways: transport/availability errors,
//! and instruction-following errors (prose around the JSON, markdown
//! fencing, double-encoding). The loop tolerates both without letting one
//! flaky provider block traffic from the others: the model order is a
//! fresh uniform permutation per call, each model gets a bounded number of
//! tries, and the first usable JSON object wins.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::catalog::{Catalog, ModelDescriptor};
use crate::error::GatewayError;
use crate::extract::extract_json;
use crate::providers::Adapters;
use crate::types::GenerationRequest;

/// Tries per model before falling back to the next one.
pub const DEFAULT_TRIES_PER_MODEL: u32 = 2;

/// The generation orchestrator.
///
/// Holds no mutable state across calls apart from its random source, which
/// is injectable so tests can fix the fallback permutation.
pub struct Orchestrator {
    catalog: Catalog,
    adapters: Adapters,
    tries_per_model: u32,
    rng: Mutex<StdRng>,
}

impl Orchestrator {
    /// Create an orchestrator with an entropy-seeded random source.
    pub fn new(catalog: Catalog, adapters: Adapters) -> Self {
        Self {
            catalog,
            adapters,
            tries_per_model: DEFAULT_TRIES_PER_MODEL,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create an orchestrator with a fixed seed (deterministic fallback
    /// order, for tests).
    pub fn with_seed(catalog: Catalog, adapters: Adapters, seed: u64) -> Self {
        Self {
            catalog,
            adapters,
            tries_per_model: DEFAULT_TRIES_PER_MODEL,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Override the per-model try budget.
    pub fn with_tries_per_model(mut self, tries: u32) -> Self {
        self.tries_per_model = tries.max(1);
        self
    }

    /// Generate a JSON object for the request.
    ///
    /// Returns the first mapping any model/try combination produces, or
    /// [`GatewayError::AllModelsExhausted`] once every combination has
    /// failed. Worst case is `tries_per_model x usable-model-count`
    /// provider calls.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Map<String, Value>, GatewayError> {
        request.validate()?;

        let models = self.shuffled_models();
        let mut last_error: Option<String> = None;

        for model in &models {
            // Filtered to usable providers in shuffled_models.
            let Some(adapter) = self.adapters.get(model.provider) else {
                continue;
            };

            for attempt in 1..=self.tries_per_model {
                debug!(model = model.name, attempt, "invoking provider");

                let raw = match adapter.invoke(model, request).await {
                    Ok(raw) => raw,
                    Err(err) => {
                        warn!(
                            model = model.name,
                            provider = %model.provider,
                            attempt,
                            error = %err,
                            "provider call failed"
                        );
                        last_error = Some(err.to_string());
                        continue;
                    }
                };

                match extract_json(&raw) {
                    Some(Value::Object(map)) => {
                        debug!(model = model.name, attempt, "usable JSON object");
                        return Ok(map);
                    }
                    Some(other) => {
                        warn!(
                            model = model.name,
                            attempt,
                            value_type = json_type_name(&other),
                            "parsed value is not a JSON object"
                        );
                        last_error =
                            Some(format!("unexpected {} from {}", json_type_name(&other), model.name));
                    }
                    None => {
                        warn!(
                            model = model.name,
                            attempt,
                            "no JSON object could be extracted"
                        );
                        last_error = Some(format!("unparseable output from {}", model.name));
                    }
                }
            }
        }

        Err(GatewayError::AllModelsExhausted { last_error })
    }

    /// Snapshot the catalog, keep models whose provider is usable, and
    /// shuffle. A fixed order would starve whichever models sort last.
    fn shuffled_models(&self) -> Vec<ModelDescriptor> {
        let mut models: Vec<ModelDescriptor> = self
            .catalog
            .all()
            .iter()
            .filter(|m| self.adapters.get(m.provider).is_some())
            .cloned()
            .collect();
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        models.shuffle(&mut *rng);
        models
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::catalog::{ModelTier, Provider};
    use crate::providers::ProviderAdapter;

    struct ScriptedAdapter {
        provider: Provider,
        calls: AtomicUsize,
        responses: Vec<Result<String, ()>>,
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedAdapter {
        fn provider(&self) -> Provider {
            self.provider
        }

        async fn invoke(
            &self,
            _model: &ModelDescriptor,
            _request: &GenerationRequest,
        ) -> Result<String, GatewayError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let scripted = self
                .responses
                .get(n.min(self.responses.len() - 1))
                .expect("scripted response");
            match scripted {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(GatewayError::api_error(503, "scripted outage")),
            }
        }
    }

    fn model(name: &'static str, provider: Provider) -> ModelDescriptor {
        ModelDescriptor {
            name,
            daily_request_limit: 100,
            supports_visual_input: false,
            provider,
            tier: ModelTier::Premium,
        }
    }

    fn orchestrator_with(
        adapter: Arc<ScriptedAdapter>,
        models: Vec<ModelDescriptor>,
    ) -> Orchestrator {
        let adapters =
            Adapters::from_adapters(vec![adapter as Arc<dyn ProviderAdapter>]).unwrap();
        Orchestrator::with_seed(Catalog::new(models), adapters, 7)
    }

    #[tokio::test]
    async fn first_usable_object_terminates_early() {
        let adapter = Arc::new(ScriptedAdapter {
            provider: Provider::Google,
            calls: AtomicUsize::new(0),
            responses: vec![Ok(r#"prose {"lesson": "ownership"} more"#.to_string())],
        });
        let orchestrator = orchestrator_with(
            adapter.clone(),
            vec![
                model("m-a", Provider::Google),
                model("m-b", Provider::Google),
            ],
        );

        let map = orchestrator
            .generate(&GenerationRequest::new("p"))
            .await
            .unwrap();
        assert_eq!(map.get("lesson"), Some(&Value::String("ownership".into())));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_is_bounded_at_tries_times_models() {
        let adapter = Arc::new(ScriptedAdapter {
            provider: Provider::Google,
            calls: AtomicUsize::new(0),
            responses: vec![Ok("no json at all".to_string())],
        });
        let orchestrator = orchestrator_with(
            adapter.clone(),
            vec![
                model("m-a", Provider::Google),
                model("m-b", Provider::Google),
                model("m-c", Provider::Google),
            ],
        );

        let err = orchestrator
            .generate(&GenerationRequest::new("p"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::AllModelsExhausted { .. }));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn provider_errors_fall_through_to_later_tries() {
        let adapter = Arc::new(ScriptedAdapter {
            provider: Provider::Groq,
            calls: AtomicUsize::new(0),
            responses: vec![
                Err(()),
                Ok(r#"{"recovered": true}"#.to_string()),
            ],
        });
        let orchestrator =
            orchestrator_with(adapter.clone(), vec![model("m-a", Provider::Groq)]);

        let map = orchestrator
            .generate(&GenerationRequest::new("p"))
            .await
            .unwrap();
        assert_eq!(map.get("recovered"), Some(&Value::Bool(true)));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_request_fails_before_any_call() {
        let adapter = Arc::new(ScriptedAdapter {
            provider: Provider::Google,
            calls: AtomicUsize::new(0),
            responses: vec![Ok("{}".to_string())],
        });
        let orchestrator =
            orchestrator_with(adapter.clone(), vec![model("m-a", Provider::Google)]);

        let err = orchestrator
            .generate(&GenerationRequest::new("p").with_temperature(9.0))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn models_without_a_usable_provider_are_skipped() {
        let adapter = Arc::new(ScriptedAdapter {
            provider: Provider::Google,
            calls: AtomicUsize::new(0),
            responses: vec![Ok("garbage".to_string())],
        });
        // One Groq model in the catalog, but only a Google adapter exists.
        let orchestrator = orchestrator_with(
            adapter.clone(),
            vec![
                model("m-a", Provider::Google),
                model("m-groq", Provider::Groq),
            ],
        );

        let err = orchestrator
            .generate(&GenerationRequest::new("p"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::AllModelsExhausted { .. }));
        // Only the Google model was tried: 2 tries, not 4.
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn seeded_orchestrators_use_the_same_permutation() {
        // Two identically-seeded orchestrators observing per-model call
        // order through model names recorded by a shared adapter.
        struct Recorder {
            provider: Provider,
            seen: Mutex<Vec<&'static str>>,
        }

        #[async_trait]
        impl ProviderAdapter for Recorder {
            fn provider(&self) -> Provider {
                self.provider
            }
            async fn invoke(
                &self,
                model: &ModelDescriptor,
                _request: &GenerationRequest,
            ) -> Result<String, GatewayError> {
                self.seen.lock().unwrap().push(model.name);
                Err(GatewayError::api_error(500, "down"))
            }
        }

        let models = || {
            vec![
                model("m-a", Provider::Google),
                model("m-b", Provider::Google),
                model("m-c", Provider::Google),
                model("m-d", Provider::Google),
            ]
        };

        let mut orders = Vec::new();
        for _ in 0..2 {
            let recorder = Arc::new(Recorder {
                provider: Provider::Google,
                seen: Mutex::new(Vec::new()),
            });
            let adapters =
                Adapters::from_adapters(vec![recorder.clone() as Arc<dyn ProviderAdapter>])
                    .unwrap();
            let orchestrator = Orchestrator::with_seed(Catalog::new(models()), adapters, 42)
                .with_tries_per_model(1);
            let _ = orchestrator.generate(&GenerationRequest::new("p")).await;
            orders.push(recorder.seen.lock().unwrap().clone());
        }
        assert_eq!(orders[0], orders[1]);
        assert_eq!(orders[0].len(), 4);
    }
}
