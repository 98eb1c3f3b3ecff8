use crate::models::{EligibilityLabel, FeatureVector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Highest artifact schema version this build can serve.
const SUPPORTED_ARTIFACT_VERSION: u32 = 1;

/// Per-donor inference failure. The pipeline skips the donor rather than
/// aborting the query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("non-finite feature value: {0}")]
    NonFiniteFeature(&'static str),
}

/// Failure to load the classifier artifact. Fatal for the matching
/// capability; the rest of the service keeps running.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported model type: {0:?}")]
    UnsupportedModelType(String),

    #[error("artifact version {found} is not supported (max {supported})")]
    IncompatibleVersion { found: u32, supported: u32 },
}

/// A binary donor-eligibility classifier.
///
/// Implementations are read-only at serving time and safe to share across
/// in-flight requests behind an `Arc`. Rule-based and learned variants are
/// interchangeable behind this trait.
pub trait EligibilityModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<EligibilityLabel, ClassifierError>;
}

/// Serialized form of a threshold artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ThresholdArtifact {
    version: u32,
    model_type: String,
    thresholds: Thresholds,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Thresholds {
    min_age: i32,
    max_age: i32,
    min_weight_kg: f64,
    min_hemoglobin: f64,
    min_days_since_donation: i64,
}

/// Direct evaluation of the eligibility rule the offline model is trained
/// to approximate: eligible iff age within [min, max], weight strictly
/// above the floor, hemoglobin strictly above the floor, and at least the
/// minimum number of days since the last donation.
///
/// Thresholds come from the loaded artifact, so a retrained artifact can
/// shift them without a rebuild.
#[derive(Debug, Clone)]
pub struct ThresholdModel {
    min_age: i32,
    max_age: i32,
    min_weight_kg: f64,
    min_hemoglobin: f64,
    min_days_since_donation: i64,
}

impl ThresholdModel {
    /// Load a versioned artifact from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path)?;
        let artifact: ThresholdArtifact = serde_json::from_str(&raw)?;

        if artifact.model_type != "threshold" {
            return Err(ArtifactError::UnsupportedModelType(artifact.model_type));
        }
        if artifact.version > SUPPORTED_ARTIFACT_VERSION {
            return Err(ArtifactError::IncompatibleVersion {
                found: artifact.version,
                supported: SUPPORTED_ARTIFACT_VERSION,
            });
        }

        let t = artifact.thresholds;
        Ok(Self {
            min_age: t.min_age,
            max_age: t.max_age,
            min_weight_kg: t.min_weight_kg,
            min_hemoglobin: t.min_hemoglobin,
            min_days_since_donation: t.min_days_since_donation,
        })
    }
}

impl Default for ThresholdModel {
    /// The standard donation criteria: age 18-65, weight over 50 kg,
    /// hemoglobin over 12.5 g/dL, at least 90 days since last donation.
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 65,
            min_weight_kg: 50.0,
            min_hemoglobin: 12.5,
            min_days_since_donation: 90,
        }
    }
}

impl EligibilityModel for ThresholdModel {
    fn predict(&self, features: &FeatureVector) -> Result<EligibilityLabel, ClassifierError> {
        if !features.weight_kg.is_finite() {
            return Err(ClassifierError::NonFiniteFeature("weight_kg"));
        }
        if !features.hemoglobin.is_finite() {
            return Err(ClassifierError::NonFiniteFeature("hemoglobin"));
        }

        let eligible = features.age >= self.min_age
            && features.age <= self.max_age
            && features.weight_kg > self.min_weight_kg
            && features.hemoglobin > self.min_hemoglobin
            && features.days_since_donation >= self.min_days_since_donation;

        Ok(if eligible {
            EligibilityLabel::Eligible
        } else {
            EligibilityLabel::Ineligible
        })
    }
}
