//! Glucast core: deterministic glucose-prediction primitives.
//!
//! Provides the integer-only pipeline shared by the trainer and the service:
//!
//! Modules:
//! - `types`: Records, predictions, reports, and the fixed-point scale
//! - `encoder`: Fixed-vocabulary meal category encoder
//! - `features`: Deterministic feature construction
//! - `forest`: Integer-only random forest evaluator
//! - `artifact`: Model/vocabulary artifact pair persistence
//! - `errors`: Core error type

pub mod artifact;
pub mod encoder;
pub mod errors;
pub mod features;
pub mod forest;
pub mod types;

pub use artifact::ArtifactStore;
pub use encoder::{MealEncoder, VocabularySnapshot, STANDARD_VOCABULARY};
pub use errors::CoreError;
pub use features::{build_features, FeatureVector, FEATURE_COUNT};
pub use forest::{ForestModel, Node, Regressor, Tree, MODEL_VERSION};
pub use types::{from_micro, to_micro, GlucoseRecord, Prediction, TrainReport, SCALE};

/// Crate version string for reports and health payloads.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
