//! Request types shared across providers.

use crate::error::GatewayError;

/// Default token budget for a generated response.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2_500;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default nucleus-sampling cutoff.
pub const DEFAULT_TOP_P: f64 = 0.9;

/// One structured-generation request.
///
/// Constructed per call and never shared across concurrent calls.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The full prompt, including the "answer in JSON" instruction.
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl GenerationRequest {
    /// Create a request with the default sampling parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }

    /// Set the maximum number of output tokens.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the nucleus-sampling cutoff.
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Validate parameter ranges before any provider call is made.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.max_output_tokens == 0 {
            return Err(GatewayError::InvalidRequest(
                "max_output_tokens must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GatewayError::InvalidRequest(format!(
                "temperature {} out of range [0, 2]",
                self.temperature
            )));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(GatewayError::InvalidRequest(format!(
                "top_p {} out of range (0, 1]",
                self.top_p
            )));
        }
        Ok(())
    }
}
