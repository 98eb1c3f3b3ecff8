// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BloodGroup, DonorMatch, DonorRecord, EligibilityLabel, FeatureVector, NewDonor,
    RequesterLocation, SkipCounts, UnknownBloodGroup,
};
pub use requests::{FindDonorsRequest, RegisterDonorRequest};
pub use responses::{
    ErrorResponse, FindDonorsResponse, HealthResponse, MatchedDonor, RegisterDonorResponse,
};
