//! # Governance Testing Framework
//!
//! Deterministic fast-forwarding of governance proposals on a simulated chain.
//!
//! ## Architecture Overview
//!
//! - **backend**: the narrow storage seam (`StorageBackend`) and an in-memory fake
//! - **fast_forward**: agenda store, task locator/relocator, tally synthesizer,
//!   proposal patcher and call injection
//! - **orchestrator**: the fast-forward state machine and its single entry point
//! - **Tier 1**: an in-process governance chain (`TestChain`)
//! - **invariants**: whole-state scheduler checks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gov_testing_framework::prelude::*;
//!
//! #[tokio::test]
//! async fn test_governance_remark() -> anyhow::Result<()> {
//!     let chain = TestChainBuilder::new().build().await?;
//!     let call = RuntimeCall::remark(b"hello".to_vec());
//!
//!     let id = fast_forward(&chain, &FastForwardConfig::default(), call, 0, OriginCaller::Root).await?;
//!     assert!(chain.referendum(id)?.unwrap().is_approved());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

/// Storage seam between the engine and a chain
pub mod backend;

/// Fast-forward configuration
pub mod config;

/// Fast-forward engine components
pub mod fast_forward;

// Fast-forward state machine
pub mod orchestrator;

// Tier 1: Component-level testing (in-process, no RPC/P2P)
pub mod tier1_component;

// Scheduler invariant checkers
pub mod invariants;

// Convenient re-exports for common usage
pub mod prelude;

// Re-export commonly used types at crate root
pub use orchestrator::{fast_forward, FastForward, Stage};
pub use tier1_component::{TestChain, TestChainBuilder};

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
