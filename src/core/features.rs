use crate::models::{DonorRecord, FeatureVector};
use chrono::NaiveDate;
use thiserror::Error;

/// Per-donor feature derivation failure. Absorbed by the pipeline as a
/// skip, never surfaced to the caller individually.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("donor has no recorded last donation date")]
    MissingDonationDate,

    #[error("unparseable donation date: {0:?}")]
    UnparseableDate(String),
}

/// Date formats accepted for string-encoded donation dates.
///
/// Registration forms and CSV imports have historically used all three of
/// the plain-date shapes; RFC 3339 covers timestamps from JSON clients.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a string-encoded donation date, taking the date part of an
/// RFC 3339 timestamp if one is given.
pub fn parse_donation_date(raw: &str) -> Result<NaiveDate, FeatureError> {
    let trimmed = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.date_naive());
    }

    Err(FeatureError::UnparseableDate(raw.to_string()))
}

/// Derive the feature vector for a donor relative to a reference date.
///
/// Deterministic for a fixed `today`; fails when the donor has no
/// last-donation date on record.
pub fn extract_features(
    donor: &DonorRecord,
    today: NaiveDate,
) -> Result<FeatureVector, FeatureError> {
    let last_donation = donor.last_donation.ok_or(FeatureError::MissingDonationDate)?;

    let days_since_donation = (today - last_donation).num_days();

    Ok(FeatureVector {
        age: donor.age,
        weight_kg: donor.weight_kg,
        hemoglobin: donor.hemoglobin,
        days_since_donation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BloodGroup;

    fn donor_with_last_donation(last_donation: Option<NaiveDate>) -> DonorRecord {
        DonorRecord {
            id: 1,
            name: "Test Donor".to_string(),
            age: 30,
            weight_kg: 70.0,
            hemoglobin: 13.5,
            blood_group: BloodGroup::OPos,
            last_donation,
            contact: "9999999999".to_string(),
            address: "Banjara Hills".to_string(),
            latitude: Some(17.385),
            longitude: Some(78.4867),
        }
    }

    #[test]
    fn extracts_days_relative_to_reference_date() {
        let last = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let donor = donor_with_last_donation(Some(last));

        let features = extract_features(&donor, today).unwrap();

        assert_eq!(features.days_since_donation, 120);
        assert_eq!(features.age, 30);
        assert_eq!(features.weight_kg, 70.0);
        assert_eq!(features.hemoglobin, 13.5);
    }

    #[test]
    fn missing_donation_date_is_not_computable() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let donor = donor_with_last_donation(None);

        assert_eq!(
            extract_features(&donor, today),
            Err(FeatureError::MissingDonationDate)
        );
    }

    #[test]
    fn extraction_is_deterministic_for_fixed_reference() {
        let last = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let donor = donor_with_last_donation(Some(last));

        let a = extract_features(&donor, today).unwrap();
        let b = extract_features(&donor, today).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parses_iso_slash_and_dash_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        assert_eq!(parse_donation_date("2025-01-31").unwrap(), expected);
        assert_eq!(parse_donation_date("31/01/2025").unwrap(), expected);
        assert_eq!(parse_donation_date("31-01-2025").unwrap(), expected);
        assert_eq!(parse_donation_date(" 2025-01-31 ").unwrap(), expected);
    }

    #[test]
    fn parses_rfc3339_timestamps_to_date_part() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(
            parse_donation_date("2025-01-31T10:15:00+05:30").unwrap(),
            expected
        );
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(matches!(
            parse_donation_date("not a date"),
            Err(FeatureError::UnparseableDate(_))
        ));
        assert!(parse_donation_date("2025-13-45").is_err());
    }
}
