//! Chat-completion client that turns two perspectives into an [`Analysis`].
//!
//! [`GatewayClient`] implements [`relsync_core::analysis::Analyzer`] against
//! any OpenAI-compatible `/chat/completions` endpoint.
//!
//! [`Analysis`]: relsync_core::analysis::Analysis

mod client;
mod prompt;
mod reply;

pub mod error;

pub use client::{GatewayClient, GatewayConfig};
pub use error::{Error, Result};
pub use prompt::{SYSTEM_PROMPT, user_prompt};
pub use reply::{parse_reply, strip_code_fences};
