//! Tier 1: Component-level testing
//!
//! In-process governance chain without RPC/P2P.
//! Fast, deterministic, perfect for exercising the fast-forward engine.
//!
//! ## Key Features
//!
//! - Scheduler with anonymous and named tasks, holes and cancellation by name
//! - Preimage noting and lookup/legacy call resolution
//! - Referenda with tracks, decision deposits, alarms and enactment
//! - Per-block event log
//!
//! ## Example
//!
//! ```rust,ignore
//! use gov_testing_framework::prelude::*;
//!
//! #[tokio::test]
//! async fn test_remark() -> anyhow::Result<()> {
//!     let chain = TestChainBuilder::new().build().await?;
//!     let call = RuntimeCall::remark(b"hello".to_vec());
//!     schedule_inline_call_with_origin(&chain, &call, OriginCaller::Root).await?;
//!     chain.produce_block(1).await?;
//!     Ok(())
//! }
//! ```

mod builder;
mod chain;
mod ext;
pub mod pallets;

pub use builder::{TestChainBuilder, DEFAULT_TOTAL_ISSUANCE};
pub use chain::TestChain;
pub use ext::DispatchResult;
