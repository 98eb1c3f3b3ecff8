use crate::core::distance::round_km;
use crate::models::domain::DonorMatch;
use serde::{Deserialize, Serialize};

/// One ranked donor on the wire, distance rounded to two decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedDonor {
    #[serde(rename = "donorId")]
    pub donor_id: i64,
    pub name: String,
    pub address: String,
    pub contact: String,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

impl From<&DonorMatch> for MatchedDonor {
    fn from(m: &DonorMatch) -> Self {
        Self {
            donor_id: m.donor_id,
            name: m.name.clone(),
            address: m.address.clone(),
            contact: m.contact.clone(),
            distance_km: round_km(m.distance_km),
        }
    }
}

/// Response for the find-donors endpoint.
///
/// An empty `donors` list with a populated `message` is the explicit
/// "no eligible donors" signal, distinct from an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindDonorsResponse {
    pub donors: Vec<MatchedDonor>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for donor registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDonorResponse {
    #[serde(rename = "donorId")]
    pub donor_id: i64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
