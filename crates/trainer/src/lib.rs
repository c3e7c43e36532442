//! Glucast trainer: deterministic offline random-forest training.
//!
//! Modules:
//! - `dataset`: Next-step shift transform and CSV record loading
//! - `deterministic`: Seeded LCG streams and split tie-breaking
//! - `cart`: Exact-greedy CART regression tree builder
//! - `trainer`: Bootstrap-sampled forest trainer
//! - `errors`: Trainer error type

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod trainer;

pub use cart::{CartBuilder, TreeBuild, TreeConfig};
pub use dataset::{Dataset, MIN_TRAINING_RECORDS};
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use errors::TrainerError;
pub use trainer::{ForestConfig, ForestTrainer};
