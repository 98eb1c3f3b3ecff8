use crate::core::{
    classifier::EligibilityModel,
    distance::geodesic_distance_km,
    features::extract_features,
};
use crate::models::{DonorMatch, DonorRecord, RequesterLocation, SkipCounts};
use chrono::NaiveDate;
use std::sync::Arc;

/// Outcome of one ranking pass.
#[derive(Debug)]
pub struct MatchOutcome {
    /// Eligible donors within range, nearest first.
    pub matches: Vec<DonorMatch>,
    /// Candidate count before any filtering.
    pub total_candidates: usize,
    /// Per-reason counts of dropped candidates.
    pub skipped: SkipCounts,
}

/// The donor-matching pipeline: feature extraction, eligibility
/// classification, distance filtering and nearest-first ranking.
///
/// # Pipeline stages
/// 1. Feature extraction (skip donors with no usable donation date)
/// 2. Eligibility classification (skip ineligible and inference failures)
/// 3. Coordinate check (skip donors without a location)
/// 4. Distance + optional max-distance filter (boundary inclusive)
/// 5. Ascending sort by distance, ties broken by donor id
///
/// Holds the classifier by `Arc`: the model is loaded once, shared
/// read-only across requests, and injected by the caller.
#[derive(Clone)]
pub struct Matcher {
    model: Arc<dyn EligibilityModel>,
}

impl Matcher {
    pub fn new(model: Arc<dyn EligibilityModel>) -> Self {
        Self { model }
    }

    /// Rank candidate donors for a requester.
    ///
    /// Candidates are assumed to be pre-filtered by blood group at the
    /// store. Per-donor failures are absorbed into `skipped`; one bad
    /// record never aborts the batch. Zero survivors yields an empty
    /// `matches` vec, never an error.
    pub fn rank(
        &self,
        requester: &RequesterLocation,
        candidates: Vec<DonorRecord>,
        max_distance_km: Option<f64>,
        today: NaiveDate,
    ) -> MatchOutcome {
        let total_candidates = candidates.len();
        let mut skipped = SkipCounts::default();

        let mut matches: Vec<DonorMatch> = candidates
            .into_iter()
            .filter_map(|donor| {
                // Stage 1: features
                let features = match extract_features(&donor, today) {
                    Ok(f) => f,
                    Err(e) => {
                        tracing::debug!("Skipping donor {}: {}", donor.id, e);
                        skipped.features += 1;
                        return None;
                    }
                };

                // Stage 2: classification
                match self.model.predict(&features) {
                    Ok(label) if label.is_eligible() => {}
                    Ok(_) => {
                        skipped.ineligible += 1;
                        return None;
                    }
                    Err(e) => {
                        tracing::debug!("Classifier failed for donor {}: {}", donor.id, e);
                        skipped.classifier += 1;
                        return None;
                    }
                }

                // Stage 3: location
                let (lat, lon) = match donor.coordinates() {
                    Some(coords) => coords,
                    None => {
                        skipped.missing_coordinates += 1;
                        return None;
                    }
                };

                // Stage 4: distance
                let distance_km =
                    geodesic_distance_km(requester.latitude, requester.longitude, lat, lon);
                if let Some(max) = max_distance_km {
                    if distance_km > max {
                        skipped.out_of_range += 1;
                        return None;
                    }
                }

                Some(DonorMatch {
                    donor_id: donor.id,
                    name: donor.name,
                    address: donor.address,
                    contact: donor.contact,
                    distance_km,
                })
            })
            .collect();

        // Stage 5: nearest first, donor id as the deterministic tie-break
        matches.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.donor_id.cmp(&b.donor_id))
        });

        MatchOutcome {
            matches,
            total_candidates,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::ThresholdModel;
    use crate::models::BloodGroup;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn days_ago(days: i64) -> Option<NaiveDate> {
        Some(today() - chrono::Duration::days(days))
    }

    fn create_donor(id: i64, last_donation: Option<NaiveDate>, lat: f64, lon: f64) -> DonorRecord {
        DonorRecord {
            id,
            name: format!("Donor {}", id),
            age: 30,
            weight_kg: 70.0,
            hemoglobin: 13.5,
            blood_group: BloodGroup::OPos,
            last_donation,
            contact: "9999999999".to_string(),
            address: "Hyderabad".to_string(),
            latitude: Some(lat),
            longitude: Some(lon),
        }
    }

    fn create_matcher() -> Matcher {
        Matcher::new(Arc::new(ThresholdModel::default()))
    }

    fn requester() -> RequesterLocation {
        RequesterLocation {
            latitude: 17.385,
            longitude: 78.4867,
        }
    }

    #[test]
    fn ranks_nearest_first() {
        let matcher = create_matcher();
        // ~0.045 degrees latitude is ~5km, ~0.018 is ~2km
        let candidates = vec![
            create_donor(1, days_ago(120), 17.430, 78.4867),
            create_donor(2, days_ago(120), 17.403, 78.4867),
        ];

        let outcome = matcher.rank(&requester(), candidates, None, today());

        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].donor_id, 2);
        assert_eq!(outcome.matches[1].donor_id, 1);
        assert!(outcome.matches[0].distance_km <= outcome.matches[1].distance_km);
    }

    #[test]
    fn colocated_donor_matches_at_zero_distance() {
        let matcher = create_matcher();
        let candidates = vec![create_donor(1, days_ago(120), 17.385, 78.4867)];

        let outcome = matcher.rank(&requester(), candidates, None, today());

        assert_eq!(outcome.matches.len(), 1);
        assert!(outcome.matches[0].distance_km.abs() < 1e-9);
    }

    #[test]
    fn recent_donor_is_ineligible() {
        let matcher = create_matcher();
        let candidates = vec![create_donor(1, days_ago(30), 17.385, 78.4867)];

        let outcome = matcher.rank(&requester(), candidates, None, today());

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.skipped.ineligible, 1);
    }

    #[test]
    fn donor_without_donation_date_never_matches() {
        let matcher = create_matcher();
        let candidates = vec![create_donor(1, None, 17.385, 78.4867)];

        let outcome = matcher.rank(&requester(), candidates, None, today());

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.skipped.features, 1);
    }

    #[test]
    fn inference_failure_skips_that_donor_only() {
        let matcher = create_matcher();
        // Extraction succeeds for both; the NaN weight makes the model
        // error on the first donor.
        let mut bad = create_donor(1, days_ago(120), 17.385, 78.4867);
        bad.weight_kg = f64::NAN;
        let good = create_donor(2, days_ago(120), 17.385, 78.4867);

        let outcome = matcher.rank(&requester(), vec![bad, good], None, today());

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].donor_id, 2);
        assert_eq!(outcome.skipped.classifier, 1);
    }

    #[test]
    fn donor_without_coordinates_is_skipped() {
        let matcher = create_matcher();
        let mut donor = create_donor(1, days_ago(120), 17.385, 78.4867);
        donor.longitude = None;

        let outcome = matcher.rank(&requester(), vec![donor], None, today());

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.skipped.missing_coordinates, 1);
    }

    #[test]
    fn empty_candidate_set_is_not_an_error() {
        let matcher = create_matcher();
        let outcome = matcher.rank(&requester(), vec![], None, today());

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.total_candidates, 0);
        assert_eq!(outcome.skipped.total(), 0);
    }

    #[test]
    fn max_distance_boundary_is_inclusive() {
        let matcher = create_matcher();
        let donor = create_donor(1, days_ago(120), 17.430, 78.4867);
        let exact = geodesic_distance_km(17.385, 78.4867, 17.430, 78.4867);

        let included = matcher.rank(
            &requester(),
            vec![donor.clone()],
            Some(exact),
            today(),
        );
        assert_eq!(included.matches.len(), 1);

        let excluded = matcher.rank(
            &requester(),
            vec![donor],
            Some(exact - 0.001),
            today(),
        );
        assert!(excluded.matches.is_empty());
        assert_eq!(excluded.skipped.out_of_range, 1);
    }

    #[test]
    fn equidistant_donors_tie_break_by_id() {
        let matcher = create_matcher();
        let candidates = vec![
            create_donor(7, days_ago(120), 17.40, 78.4867),
            create_donor(3, days_ago(120), 17.40, 78.4867),
        ];

        let outcome = matcher.rank(&requester(), candidates, None, today());

        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].donor_id, 3);
        assert_eq!(outcome.matches[1].donor_id, 7);
    }

    #[test]
    fn one_bad_record_does_not_abort_the_batch() {
        let matcher = create_matcher();
        let candidates = vec![
            create_donor(1, None, 17.385, 78.4867),
            create_donor(2, days_ago(120), 17.385, 78.4867),
        ];

        let outcome = matcher.rank(&requester(), candidates, None, today());

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].donor_id, 2);
        assert_eq!(outcome.skipped.total(), 1);
    }
}
