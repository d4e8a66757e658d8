//! Beam search over grammar actions.
//!
//! The [`BeamSearchSynthesizer`] keeps a bounded frontier of partial
//! derivations, asks an external [`Oracle`] to score all of them once per
//! round, and keeps the globally best `beam_size - completed` expansions using
//! a [`TopKElement`] selector.
//!
//! ## Key Features
//!
//! - **Grammar-safe**: only admissible actions are ever offered, so the
//!   evaluators never reject a selected action during normal operation
//! - **Lazy scoring**: only the rule or the token view of each oracle result
//!   is forced, depending on the head field
//! - **Resumable**: a [`Synthesis`] yields one [`Round`] at a time

pub mod config;
pub mod hypothesis;
pub mod oracle;
pub mod synthesizer;
pub mod topk;

pub use config::SynthesizerConfig;
pub use hypothesis::{Candidate, Hypothesis, Progress, Round};
pub use oracle::{ExactTypes, LazyLogProbability, Oracle, RuleScores, SubtypeRelation, TokenScores};
pub use synthesizer::{collect, is_admissible, BeamSearchSynthesizer, Collected, Synthesis};
pub use topk::TopKElement;
