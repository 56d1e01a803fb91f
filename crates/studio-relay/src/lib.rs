//! # studio-relay
//!
//! A thin, stateless relay in front of a hosted inference API. It checks the
//! shape of a request, forwards it to the provider exactly once and reshapes
//! the answer into `{ prediction | output, status, startedAt, endedAt,
//! durationInSeconds }`.
//!
//! The credential comes from [`RelayConfig`]; the provider is any
//! [`InferenceBackend`] wrapped in a [`Provider`]. [`replicate::provider`]
//! builds the production one.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use studio_relay::{Relay, RelayConfig, replicate};
//!
//! let provider = replicate::provider(replicate::ReplicateConfig::from_env())?;
//! let relay = Relay::new(RelayConfig::from_env(), provider);
//!
//! let body = br#"{"model":"stability-ai/sdxl","input":{"prompt":"a red fox"}}"#;
//! let response = relay.generate(body).await?;
//! println!("{} in {}s", response.timing.status, response.timing.duration_in_seconds);
//! # Ok(())
//! # }
//! ```

pub mod envelope;
pub mod error;
pub mod provider;
pub mod relay;
pub mod replicate;

pub use envelope::{
    ErrorBody, Health, Invocation, ModelLookup, PredictionResponse, RunResponse, Timing,
};
pub use error::{ErrorKind, ProviderError, RelayError};
pub use provider::{InferenceBackend, ModelInfo, Provider};
pub use relay::{Relay, RelayConfig};
