//! Static registry of provider/model descriptors.
//!
//! The catalog is read-only after construction. Daily request limits are
//! informational (quota enforcement lives upstream or provider-side) and
//! the visual-input flag is consulted by callers choosing a request shape,
//! not by the orchestrator.

use std::fmt;

/// Which backend serves a given model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Google Generative Language API (`generateContent`).
    Google,
    /// Groq's OpenAI-compatible chat completions API.
    Groq,
}

impl Provider {
    /// Stable identifier used in logs and error messages.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Groq => "groq",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Quality tier of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Basic,
    Premium,
}

/// An immutable descriptor for one model offered by a provider.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Model name as the provider expects it on the wire.
    pub name: &'static str,
    /// Provider-advertised daily request quota. Informational only.
    pub daily_request_limit: u32,
    /// Whether the model accepts image input.
    pub supports_visual_input: bool,
    pub provider: Provider,
    pub tier: ModelTier,
}

/// Read-only collection of [`ModelDescriptor`]s.
#[derive(Debug, Clone)]
pub struct Catalog {
    models: Vec<ModelDescriptor>,
}

impl Catalog {
    /// Build a catalog from an explicit descriptor list.
    ///
    /// Invariant: `name` must be unique across descriptors.
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        debug_assert!(
            {
                let mut names: Vec<_> = models.iter().map(|m| m.name).collect();
                names.sort_unstable();
                names.windows(2).all(|w| w[0] != w[1])
            },
            "catalog model names must be unique"
        );
        Self { models }
    }

    /// The built-in model set.
    pub fn builtin() -> Self {
        Self::new(vec![
            ModelDescriptor {
                name: "gemma-3-27b-it",
                daily_request_limit: 14_400,
                supports_visual_input: true,
                provider: Provider::Google,
                tier: ModelTier::Premium,
            },
            ModelDescriptor {
                name: "gemma-3-12b-it",
                daily_request_limit: 14_400,
                supports_visual_input: false,
                provider: Provider::Google,
                tier: ModelTier::Basic,
            },
            ModelDescriptor {
                name: "gemini-2.0-flash-lite",
                daily_request_limit: 1_500,
                supports_visual_input: false,
                provider: Provider::Google,
                tier: ModelTier::Premium,
            },
            ModelDescriptor {
                name: "gemini-2.0-flash",
                daily_request_limit: 1_500,
                supports_visual_input: false,
                provider: Provider::Google,
                tier: ModelTier::Premium,
            },
            ModelDescriptor {
                name: "llama-3.3-70b-versatile",
                daily_request_limit: 1_000,
                supports_visual_input: false,
                provider: Provider::Groq,
                tier: ModelTier::Premium,
            },
            ModelDescriptor {
                name: "qwen/qwen3-32b",
                daily_request_limit: 1_000,
                supports_visual_input: false,
                provider: Provider::Groq,
                tier: ModelTier::Premium,
            },
        ])
    }

    /// All descriptors, in declaration order.
    pub fn all(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Models that accept image input.
    pub fn visual_models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(|m| m.supports_visual_input)
    }

    /// Models served by the given provider.
    pub fn models_for(&self, provider: Provider) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(move |m| m.provider == provider)
    }
}
