//! Random-forest classifier with deterministic inference
//!
//! The model is a fixed ensemble of integer-indexed decision trees over a
//! fixed-order numeric feature vector. Classification is by majority vote
//! over per-tree leaf classes, with ties broken to the lowest class index,
//! so a given model artifact and feature vector always produce the same
//! class.
//!
//! # Artifact format
//!
//! Models serialize as canonical JSON (sorted keys, no whitespace):
//!
//! ```json
//! {
//!   "version": 1,
//!   "feature_count": 7,
//!   "class_count": 3,
//!   "trees": [
//!     {"nodes": [
//!       {"id":0,"left":1,"right":2,"feature_idx":4,"threshold":1000.0,"leaf":null},
//!       {"id":1,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":1},
//!       {"id":2,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":2}
//!     ]}
//!   ],
//!   "metadata": { ... }
//! }
//! ```
//!
//! The model hash covers the structural fields only (version, shape,
//! trees); metadata carries the hash plus provenance and is excluded so
//! that a training timestamp never changes the model's identity.

pub mod model;
pub mod tree;

pub use model::{structural_hash, Model, ModelMetadata, MODEL_VERSION};
pub use tree::{Node, Tree};
