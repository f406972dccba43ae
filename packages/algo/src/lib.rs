//! # lexi-algo - vocabulary learning core algorithms
//!
//! Pure Rust, I/O-free building blocks used by the lexi backend:
//!
//! - **FSRS memory model** - stability/difficulty updates, retrievability,
//!   and the Learning/Review/Relearning state machine
//! - **Token matching** - maximum-weight bipartite matching over a
//!   similarity matrix
//!
//! ## Modules
//!
//! - [`fsrs`] - memory model and scheduling
//! - [`matching`] - maximum-weight bipartite matching
//! - [`sanitize`] - numerical hygiene (NaN scrubbing, positive floors)
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use lexi_algo::{schedule, max_weight_matching, MemoryCard, Rating, SchedulerParams};
//!
//! let params = SchedulerParams::default();
//! let first = schedule(&MemoryCard::new(), Rating::Good, None, &params);
//! assert!(first.card.stability.unwrap() > 0.0);
//!
//! let pairs = max_weight_matching(&[vec![0.9, 0.1], vec![0.2, 0.8]], 0.3);
//! assert_eq!(pairs, vec![(0, 0), (1, 1)]);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod fsrs;
pub mod matching;
pub mod sanitize;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use fsrs::{next_interval, retrievability, schedule};
pub use matching::{matching_weight, max_weight_matching};
