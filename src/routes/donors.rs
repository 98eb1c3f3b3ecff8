use crate::core::{features::parse_donation_date, Matcher};
use crate::models::{
    BloodGroup, ErrorResponse, FindDonorsRequest, FindDonorsResponse, HealthResponse,
    MatchedDonor, NewDonor, RegisterDonorRequest, RegisterDonorResponse, RequesterLocation,
};
use crate::services::DonorStore;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers.
///
/// `matcher` is `None` when the classifier artifact failed to load at
/// startup; registration and health stay up, matching answers 503.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DonorStore>,
    pub matcher: Option<Matcher>,
    /// Server-side cap on the caller's max-distance constraint.
    pub max_distance_cap: Option<f64>,
}

impl AppState {
    /// The tighter of the caller's constraint and the configured cap;
    /// `None` when both are unbounded.
    fn effective_max_distance(&self, requested: Option<f64>) -> Option<f64> {
        match (requested, self.max_distance_cap) {
            (Some(r), Some(cap)) => Some(r.min(cap)),
            (Some(r), None) => Some(r),
            (None, cap) => cap,
        }
    }
}

/// Configure all donor-related routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/donors/find", web::post().to(find_donors))
        .route("/donors", web::post().to(register_donor));
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

/// Health check endpoint.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);
    let matcher_ready = state.matcher.is_some();

    let status = if store_healthy && matcher_ready {
        "healthy"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find donors endpoint.
///
/// POST /api/v1/donors/find
///
/// Request body:
/// ```json
/// {
///   "bloodGroup": "O+",
///   "latitude": 17.385,
///   "longitude": 78.4867,
///   "maxDistanceKm": 25.0
/// }
/// ```
async fn find_donors(
    state: web::Data<AppState>,
    req: web::Json<FindDonorsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_donors request: {:?}", errors);
        return bad_request("invalid_input", errors.to_string());
    }

    let blood_group: BloodGroup = match req.blood_group.parse() {
        Ok(group) => group,
        Err(e) => {
            tracing::info!("Rejected find_donors request: {}", e);
            return bad_request("invalid_input", e.to_string());
        }
    };

    let matcher = match &state.matcher {
        Some(matcher) => matcher,
        None => {
            return HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "matching_unavailable".to_string(),
                message: "Eligibility model is not loaded".to_string(),
                status_code: 503,
            });
        }
    };

    tracing::info!(
        "Finding donors: blood_group={}, requester=({}, {}), max_distance={:?}",
        blood_group,
        req.latitude,
        req.longitude,
        req.max_distance_km
    );

    let candidates = match state.store.fetch_by_blood_group(blood_group).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Donor store fetch failed for {}: {}", blood_group, e);
            return HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "store_unavailable".to_string(),
                message: e.to_string(),
                status_code: 503,
            });
        }
    };

    let requester = RequesterLocation {
        latitude: req.latitude,
        longitude: req.longitude,
    };
    let today = chrono::Utc::now().date_naive();
    let max_distance_km = state.effective_max_distance(req.max_distance_km);

    let outcome = matcher.rank(&requester, candidates, max_distance_km, today);

    if outcome.skipped.total() > 0 {
        tracing::debug!(
            "Skipped donors for {}: features={}, classifier={}, ineligible={}, no_coords={}, out_of_range={}",
            blood_group,
            outcome.skipped.features,
            outcome.skipped.classifier,
            outcome.skipped.ineligible,
            outcome.skipped.missing_coordinates,
            outcome.skipped.out_of_range
        );
    }

    let donors: Vec<MatchedDonor> = outcome.matches.iter().map(MatchedDonor::from).collect();

    tracing::info!(
        "Returning {} donors for {} (from {} candidates, {} skipped)",
        donors.len(),
        blood_group,
        outcome.total_candidates,
        outcome.skipped.total()
    );

    let message = if donors.is_empty() {
        Some("No eligible donors found.".to_string())
    } else {
        None
    };

    HttpResponse::Ok().json(FindDonorsResponse {
        donors,
        total_candidates: outcome.total_candidates,
        message,
    })
}

/// Register donor endpoint.
///
/// POST /api/v1/donors
async fn register_donor(
    state: web::Data<AppState>,
    req: web::Json<RegisterDonorRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for register_donor request: {:?}", errors);
        return bad_request("invalid_input", errors.to_string());
    }

    let blood_group: BloodGroup = match req.blood_group.parse() {
        Ok(group) => group,
        Err(e) => return bad_request("invalid_input", e.to_string()),
    };

    // Coordinates are nullable, but only as a pair.
    if req.latitude.is_some() != req.longitude.is_some() {
        return bad_request(
            "invalid_input",
            "latitude and longitude must be provided together".to_string(),
        );
    }

    let last_donation = match &req.last_donation {
        Some(raw) => match parse_donation_date(raw) {
            Ok(date) => Some(date),
            Err(e) => return bad_request("invalid_input", e.to_string()),
        },
        None => None,
    };

    let donor = NewDonor {
        name: req.name.clone(),
        age: req.age,
        weight_kg: req.weight_kg,
        hemoglobin: req.hemoglobin,
        blood_group,
        last_donation,
        contact: req.contact.clone(),
        address: req.address.clone(),
        latitude: req.latitude,
        longitude: req.longitude,
    };

    match state.store.insert(donor).await {
        Ok(donor_id) => {
            tracing::info!("Registered donor {} ({})", donor_id, blood_group);
            HttpResponse::Created().json(RegisterDonorResponse { donor_id })
        }
        Err(e) => {
            tracing::error!("Failed to register donor: {}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "store_unavailable".to_string(),
                message: e.to_string(),
                status_code: 503,
            })
        }
    }
}
