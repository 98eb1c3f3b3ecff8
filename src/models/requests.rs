use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find donors for a requester location.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindDonorsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "blood_group", rename = "bloodGroup")]
    pub blood_group: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    /// Optional constraint; absent means unbounded.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    #[serde(alias = "max_distance_km", rename = "maxDistanceKm")]
    pub max_distance_km: Option<f64>,
}

/// Request to register a new donor.
///
/// `lastDonation` is accepted as a string and parsed with the same
/// multi-format date parser the feature extractor uses, so form-style
/// clients can post `31/01/2025` as well as ISO dates.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterDonorRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0, max = 130))]
    pub age: i32,
    #[validate(range(min = 0.1))]
    #[serde(alias = "weight_kg", rename = "weightKg")]
    pub weight_kg: f64,
    #[validate(range(min = 0.1))]
    pub hemoglobin: f64,
    #[validate(length(min = 1))]
    #[serde(alias = "blood_group", rename = "bloodGroup")]
    pub blood_group: String,
    #[serde(default)]
    #[serde(alias = "last_donation", rename = "lastDonation")]
    pub last_donation: Option<String>,
    #[validate(length(min = 1))]
    pub contact: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
}
