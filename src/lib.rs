//! Donor Match - blood donor matching service
//!
//! Matches donors to a requester by combining eligibility classification
//! (biometric and recency features against a loaded model artifact) with
//! geodesic proximity ranking: candidates are fetched by blood group,
//! scored per donor, filtered, and returned nearest-first.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    classifier::{EligibilityModel, ThresholdModel},
    distance::{geodesic_distance_km, round_km},
    features::extract_features,
    Matcher,
};
pub use crate::models::{
    BloodGroup, DonorMatch, DonorRecord, EligibilityLabel, FeatureVector, RequesterLocation,
};
