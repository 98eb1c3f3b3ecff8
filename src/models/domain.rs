use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight recognized ABO/Rh blood groups.
///
/// This is a closed enumeration: anything else is rejected at the boundary,
/// so the pipeline never sees a free-form blood group string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APos => "A+",
            BloodGroup::ANeg => "A-",
            BloodGroup::BPos => "B+",
            BloodGroup::BNeg => "B-",
            BloodGroup::AbPos => "AB+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::OPos => "O+",
            BloodGroup::ONeg => "O-",
        }
    }
}

impl FromStr for BloodGroup {
    type Err = UnknownBloodGroup;

    /// Case-sensitive, exact match against the recognized groups.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A+" => Ok(BloodGroup::APos),
            "A-" => Ok(BloodGroup::ANeg),
            "B+" => Ok(BloodGroup::BPos),
            "B-" => Ok(BloodGroup::BNeg),
            "AB+" => Ok(BloodGroup::AbPos),
            "AB-" => Ok(BloodGroup::AbNeg),
            "O+" => Ok(BloodGroup::OPos),
            "O-" => Ok(BloodGroup::ONeg),
            other => Err(UnknownBloodGroup(other.to_string())),
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a blood group string outside the recognized enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized blood group: {0:?}")]
pub struct UnknownBloodGroup(pub String);

/// Donor record as held by the donor store.
///
/// Created on registration and never mutated by the matching pipeline.
/// `last_donation` and the coordinate pair are nullable; donors with either
/// missing are skipped during matching, not rejected at storage time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorRecord {
    pub id: i64,
    pub name: String,
    pub age: i32,
    #[serde(rename = "weightKg")]
    pub weight_kg: f64,
    pub hemoglobin: f64,
    #[serde(rename = "bloodGroup")]
    pub blood_group: BloodGroup,
    #[serde(rename = "lastDonation", default)]
    pub last_donation: Option<chrono::NaiveDate>,
    pub contact: String,
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl DonorRecord {
    /// Both coordinates, or None if either is missing.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// A donor record prior to insertion (no store-assigned id yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDonor {
    pub name: String,
    pub age: i32,
    pub weight_kg: f64,
    pub hemoglobin: f64,
    pub blood_group: BloodGroup,
    pub last_donation: Option<chrono::NaiveDate>,
    pub contact: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Numeric feature vector derived from a donor record relative to a
/// reference date. Ephemeral: computed per query, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub age: i32,
    pub weight_kg: f64,
    pub hemoglobin: f64,
    pub days_since_donation: i64,
}

/// Binary classification outcome for one donor in one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityLabel {
    Eligible,
    Ineligible,
}

impl EligibilityLabel {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityLabel::Eligible)
    }
}

/// The requester's position, against which donor distances are computed.
#[derive(Debug, Clone, Copy)]
pub struct RequesterLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// One eligible donor in a ranked result, distance unrounded.
///
/// Rounding to two decimals happens in the response DTO; ranking and the
/// max-distance filter always compare unrounded values.
#[derive(Debug, Clone)]
pub struct DonorMatch {
    pub donor_id: i64,
    pub name: String,
    pub address: String,
    pub contact: String,
    pub distance_km: f64,
}

/// Per-reason counters for donors dropped during one ranking pass.
///
/// A bad record never aborts the batch; it lands in one of these buckets
/// instead, so the drop is visible in logs rather than silently swallowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Missing or unparseable last-donation date.
    pub features: usize,
    /// Classifier returned an error for this donor.
    pub classifier: usize,
    /// Classified as not eligible.
    pub ineligible: usize,
    /// Latitude or longitude missing.
    pub missing_coordinates: usize,
    /// Beyond the caller's max-distance constraint.
    pub out_of_range: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.features
            + self.classifier
            + self.ineligible
            + self.missing_coordinates
            + self.out_of_range
    }
}
