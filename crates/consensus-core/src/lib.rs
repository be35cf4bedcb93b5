//! # consensus-core
//!
//! Deterministic half of Consensus answer validation.
//!
//! This crate owns the submission model and the sequence rule that gates
//! every request before any semantic judgment is attempted.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same submission always produces the same outcome
//! 2. **No LLM calls**: Nothing here performs I/O
//! 3. **Binary**: Every check collapses into [`Outcome::Pass`] or [`Outcome::Fail`]
//!
//! ## Example
//!
//! ```rust
//! use consensus_core::{Outcome, SequenceRule, Submission};
//!
//! let submission = Submission::new(["Yes", "No"], "A black convertible");
//! let rule = SequenceRule::default();
//!
//! assert_eq!(rule.check(submission.sequence_answers.as_slice()), Outcome::Pass);
//! ```

pub mod sequence;
pub mod types;

// Re-export main types at crate root
pub use sequence::{SequenceRule, SequenceVerdict};
pub use types::{ExpectedReference, Outcome, Submission, ValidationResponse};
