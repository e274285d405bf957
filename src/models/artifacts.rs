//! Artifact bundle loading and the process-wide cache

use crate::error::{AppError, AppResult};
use crate::models::classifier::Classifier;
use crate::models::encoder::CategoricalEncoding;
use crate::models::explainer::{Explainer, ExplainerSpec};
use crate::models::scaler::Scaler;
use crate::types::record::TransactionInput;
use anyhow::Context;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// On-disk layout of the bundle
#[derive(Debug, Deserialize)]
struct BundleFile {
    model: Classifier,
    scaler: Scaler,
    explainer: ExplainerSpec,
    features: Vec<String>,
    /// Training-time category lists per categorical column
    #[serde(default)]
    categories: Option<HashMap<String, Vec<String>>>,
}

/// Everything needed to score and explain a transaction
#[derive(Debug)]
pub struct ArtifactBundle {
    pub model: Classifier,
    pub scaler: Scaler,
    pub explainer: Explainer,
    /// Model input columns, in order
    pub features: Vec<String>,
    pub encoding: CategoricalEncoding,
}

impl ArtifactBundle {
    /// Parse and validate a bundle from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> AppResult<Self> {
        let file: BundleFile = serde_json::from_slice(bytes)
            .map_err(|e| AppError::InvalidArtifacts(e.to_string()))?;
        Self::from_file(file)
    }

    fn from_file(file: BundleFile) -> AppResult<Self> {
        let BundleFile {
            mut model,
            scaler,
            explainer,
            features,
            categories,
        } = file;

        model.prepare().map_err(AppError::InvalidArtifacts)?;
        scaler.validate().map_err(AppError::InvalidArtifacts)?;

        if features.is_empty() {
            return Err(AppError::InvalidArtifacts("feature list is empty".to_string()));
        }
        if scaler.n_features() != features.len() || model.n_features() != features.len() {
            return Err(AppError::InvalidArtifacts(format!(
                "{} features, scaler expects {}, model expects {}",
                features.len(),
                scaler.n_features(),
                model.n_features()
            )));
        }

        let explainer = Explainer::build(&explainer, &model).map_err(AppError::InvalidArtifacts)?;

        let encoding = match &categories {
            Some(vocabulary) => {
                check_vocabulary(&features, vocabulary)?;
                CategoricalEncoding::from_vocabulary(vocabulary)
            }
            None => CategoricalEncoding::PerCall,
        };

        Ok(Self {
            model,
            scaler,
            explainer,
            features,
            encoding,
        })
    }
}

/// Every categorical model feature needs a non-empty category list
fn check_vocabulary(
    features: &[String],
    vocabulary: &HashMap<String, Vec<String>>,
) -> AppResult<()> {
    let categorical = features
        .iter()
        .filter(|f| {
            TransactionInput::CATEGORICAL_COLUMNS
                .iter()
                .any(|column| *column == f.as_str())
        });
    for feature in categorical {
        match vocabulary.get(feature) {
            Some(labels) if !labels.is_empty() => {}
            Some(_) => {
                return Err(AppError::InvalidArtifacts(format!(
                    "category list for '{}' is empty",
                    feature
                )))
            }
            None => {
                return Err(AppError::InvalidArtifacts(format!(
                    "categories has no entry for categorical feature '{}'",
                    feature
                )))
            }
        }
    }
    Ok(())
}

/// Read the bundle at `path`
pub fn load_artifacts<P: AsRef<Path>>(path: P) -> AppResult<ArtifactBundle> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AppError::ArtifactsMissing(path.to_path_buf()));
    }

    info!(path = %path.display(), "Loading model artifacts");

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read artifacts from {:?}", path))?;
    let bundle = ArtifactBundle::from_slice(&bytes)?;

    if bundle.encoding.is_per_call() {
        warn!(
            path = %path.display(),
            "Bundle has no category vocabulary; categorical columns are label-encoded per call \
             and may not match training-time codes"
        );
    }

    info!(
        model = bundle.model.name(),
        features = bundle.features.len(),
        "Artifacts loaded successfully"
    );

    Ok(bundle)
}

/// Loads the bundle on first use and keeps it for the life of the process.
///
/// Failed loads are not cached, so a bundle exported after startup is picked
/// up by the next request.
pub struct ArtifactCache {
    path: PathBuf,
    bundle: OnceCell<Arc<ArtifactBundle>>,
    loads: AtomicUsize,
}

impl ArtifactCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            bundle: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached bundle, loading it if needed
    pub fn get(&self) -> AppResult<Arc<ArtifactBundle>> {
        self.bundle
            .get_or_try_init(|| {
                let bundle = load_artifacts(&self.path)?;
                self.loads.fetch_add(1, Ordering::Relaxed);
                Ok(Arc::new(bundle))
            })
            .cloned()
    }

    /// Number of successful deserializations so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}
