//! Bubble Environment Abstraction Layer
//!
//! Every stochastic decision the simulator makes (drift, collapse hazard,
//! tunnelling, consent, export proposals) is drawn through the
//! [`RandomSource`] trait defined here.
//!
//! # Core Concept: One Seed, One Run
//!
//! By deriving all entropy from a single 64-bit seed, any run becomes
//! reproducible from its seed number: the same seed and configuration
//! yield byte-identical metrics and ledgers.
//!
//! # Example
//!
//! ```
//! use bubble_env::{RandomSource, SeededRandom};
//!
//! let mut a = SeededRandom::new(42);
//! let mut b = SeededRandom::new(42);
//! assert_eq!(a.gaussian(0.0, 1.0), b.gaussian(0.0, 1.0));
//! assert_eq!(a.bernoulli(0.5), b.bernoulli(0.5));
//! ```

mod source;
mod seeded;

pub use source::RandomSource;
pub use seeded::{derive_seed, SeededRandom};
