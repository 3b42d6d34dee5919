//! # Unilife Synth
//!
//! Branch Synthesizer: produces the counterfactual side of every decision.
//!
//! Two strategies satisfy the same contract. The deterministic table maps
//! each action to its canonical opposite; generative delegation asks an
//! external text collaborator for a structurally-constrained counterfactual
//! and validates it strictly. Collaborator failures of any kind (transport,
//! timeout, malformed payload, wrong choice count) recover locally via the
//! table and never reach the caller.

mod freetime;
mod llm;
mod opposite;
mod synthesizer;

pub use freetime::{build_free_time_prompt, parse_free_time_pair, ValidationError};
pub use llm::{
    extract_json, HttpLlmClient, HttpLlmClientConfig, LlmClient, LlmError, LlmRequest,
    MockLlmClient,
};
pub use opposite::{deterministic_opposite, Opposite, CAFETERIA_FALLBACK_COST};
pub use synthesizer::{BranchSynthesizer, SynthStrategy, SynthesizedOpposite, SynthesizerConfig};
