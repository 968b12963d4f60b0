//! AgriCast core: crop-yield prediction over historical district data
//!
//! Everything the prediction and analysis paths need, with no ambient
//! state: callers load the dataset and artifacts and hand them to a
//! [`Predictor`].
//!
//! Modules:
//! - `dataset`: historical CSV table and read-only filtered views
//! - `encoders`: fitted categorical encoders with typed unseen-value errors
//! - `forest`: random-forest model, majority-vote inference, artifact format
//! - `features`: proxy climate normals and fixed-order feature assembly
//! - `predictor`: prediction, yield estimation, and historical analysis
//! - `explain`: fixed rule table turning a category into a reason
//! - `report`: plain-text report rendering
//! - `artifacts`: bundle persistence with blake3 integrity sidecars
//! - `canon`: canonical JSON serialization and hashing

pub mod artifacts;
pub mod canon;
pub mod dataset;
pub mod encoders;
pub mod errors;
pub mod explain;
pub mod features;
pub mod forest;
pub mod predictor;
pub mod report;

#[cfg(test)]
pub(crate) mod testutil;

pub use artifacts::ArtifactBundle;
pub use dataset::{HistoryTable, YieldRecord};
pub use encoders::{EncoderSet, LabelEncoder};
pub use errors::{CoreError, Result};
pub use features::{ClimateNormals, FEATURE_COUNT, FEATURE_ORDER};
pub use forest::{Model, ModelMetadata, Node, Tree};
pub use predictor::{Analysis, AnalysisOutcome, Prediction, Predictor};

/// Crate version string for metadata and CLI banners
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
