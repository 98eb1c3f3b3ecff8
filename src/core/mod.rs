// Core pipeline exports
pub mod classifier;
pub mod distance;
pub mod features;
pub mod matcher;

pub use classifier::{ArtifactError, ClassifierError, EligibilityModel, ThresholdModel};
pub use distance::{geodesic_distance_km, round_km};
pub use features::{extract_features, parse_donation_date, FeatureError};
pub use matcher::{MatchOutcome, Matcher};
