//! Persisted artifact bundle with integrity sidecars
//!
//! The trainer writes four canonical-JSON artifacts into one directory,
//! each with a blake3 `.hash` sidecar. Loading verifies the sidecar when
//! it exists and fails hard on a missing file or a mismatch: a predictor
//! never starts on partial or tampered state.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::canon::{hash_bytes_hex, to_canonical_json};
use crate::encoders::{EncoderSet, LabelEncoder};
use crate::errors::{CoreError, Result};
use crate::forest::Model;

pub const MODEL_FILE: &str = "model.json";
pub const DISTRICT_ENCODER_FILE: &str = "district.json";
pub const CROP_ENCODER_FILE: &str = "crop.json";
pub const CATEGORY_ENCODER_FILE: &str = "category.json";

/// Everything the predictor loads besides the dataset
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub model: Model,
    pub encoders: EncoderSet,
}

impl ArtifactBundle {
    pub fn new(model: Model, encoders: EncoderSet) -> Self {
        Self { model, encoders }
    }

    /// Write all four artifacts plus sidecars into `dir`, creating it if
    /// needed
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        write_artifact(&dir.join(MODEL_FILE), &self.model)?;
        write_artifact(&dir.join(DISTRICT_ENCODER_FILE), &self.encoders.district)?;
        write_artifact(&dir.join(CROP_ENCODER_FILE), &self.encoders.crop)?;
        write_artifact(&dir.join(CATEGORY_ENCODER_FILE), &self.encoders.category)?;

        info!("saved artifact bundle to {}", dir.display());
        Ok(())
    }

    /// Load and validate all four artifacts from `dir`
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let model: Model = read_artifact(&dir.join(MODEL_FILE))?;
        model.validate()?;

        let district: LabelEncoder = read_artifact(&dir.join(DISTRICT_ENCODER_FILE))?;
        let crop: LabelEncoder = read_artifact(&dir.join(CROP_ENCODER_FILE))?;
        let category: LabelEncoder = read_artifact(&dir.join(CATEGORY_ENCODER_FILE))?;

        if model.class_count != category.len() {
            return Err(CoreError::ValidationFailed(format!(
                "model expects {} classes but the category encoder has {}",
                model.class_count,
                category.len()
            )));
        }

        info!(
            trees = model.num_trees(),
            districts = district.len(),
            crops = crop.len(),
            "loaded artifact bundle from {}",
            dir.display()
        );

        Ok(Self {
            model,
            encoders: EncoderSet {
                district,
                crop,
                category,
            },
        })
    }
}

fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension("hash")
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = to_canonical_json(value)?;
    fs::write(path, &json)?;
    fs::write(sidecar_path(path), hash_bytes_hex(json.as_bytes()))?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(CoreError::MissingArtifact(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;

    let sidecar = sidecar_path(path);
    if sidecar.exists() {
        let expected = fs::read_to_string(&sidecar)?.trim().to_string();
        let actual = hash_bytes_hex(&bytes);
        if expected != actual {
            return Err(CoreError::HashMismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
    }

    Ok(serde_json::from_slice(&bytes)?)
}
