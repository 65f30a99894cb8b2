//! Camp entry types.
//!
//! `EntryForm` holds the values an operator is typing in, `ValidatedEntry` is
//! a form that passed every rule and is ready to insert, and `CampEntry` is a
//! row read back out of storage.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Selection-list value meaning "no doctor chosen". Never persisted.
pub const DOCTOR_PLACEHOLDER: &str = "Select";

/// Identity of a persisted camp entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A male/female head count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Male patients.
    pub male: u32,
    /// Female patients.
    pub female: u32,
}

impl Counts {
    /// Create a count pair.
    #[must_use]
    pub fn new(male: u32, female: u32) -> Self {
        Self { male, female }
    }

    /// Male plus female, widened so the sum of two `u32` counts is exact.
    #[must_use]
    pub fn total(&self) -> i64 {
        i64::from(self.male) + i64::from(self.female)
    }
}

/// Medicines handed out during the camp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medicines {
    /// Ciplox eye drops.
    pub ciplox: u32,
    /// Ciplox-D eye drops.
    pub ciplox_d: u32,
    /// CMC lubricant drops.
    pub cmc: u32,
    /// Fedtive supplements.
    pub fedtive: u32,
    /// Glucose test strips.
    pub glucose_strips: u32,
}

/// A position reported by the operator's device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Reported accuracy radius in meters.
    pub accuracy: f64,
}

impl Geolocation {
    /// Build a location from optional parts.
    ///
    /// All three absent is `Ok(None)`; all three present is a location; any
    /// other mix is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteLocation`] for a partial location.
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
        accuracy: Option<f64>,
    ) -> Result<Option<Self>, ValidationError> {
        match (latitude, longitude, accuracy) {
            (Some(latitude), Some(longitude), Some(accuracy)) => Ok(Some(Self {
                latitude,
                longitude,
                accuracy,
            })),
            (None, None, None) => Ok(None),
            _ => Err(ValidationError::IncompleteLocation),
        }
    }
}

/// The in-progress camp form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    /// Place of camp.
    pub place: String,
    /// Date of camp.
    pub camp_date: NaiveDate,
    /// Administrator name.
    pub administrator: String,
    /// Selected doctor; `None` or the placeholder means nothing was chosen.
    pub doctor: Option<String>,
    /// Optometrist name.
    pub optom: String,
    /// Optometry intern name.
    pub optom_intern: String,
    /// Outpatients examined.
    pub opd: Counts,
    /// Patients selected for surgery.
    pub surgery: Counts,
    /// Patients brought to hospital.
    pub hospital: Counts,
    /// Medicines distributed.
    #[serde(default)]
    pub medicines: Medicines,
    /// Spectacles given.
    #[serde(default)]
    pub spectacles: u32,
    /// Device location, if one was captured.
    #[serde(default)]
    pub location: Option<Geolocation>,
}

impl EntryForm {
    /// An empty form for the given camp date.
    #[must_use]
    pub fn new(camp_date: NaiveDate) -> Self {
        Self {
            place: String::new(),
            camp_date,
            administrator: String::new(),
            doctor: None,
            optom: String::new(),
            optom_intern: String::new(),
            opd: Counts::default(),
            surgery: Counts::default(),
            hospital: Counts::default(),
            medicines: Medicines::default(),
            spectacles: 0,
            location: None,
        }
    }

    /// The chosen doctor, ignoring the placeholder and blank selections.
    #[must_use]
    pub fn selected_doctor(&self) -> Option<&str> {
        self.doctor
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && *d != DOCTOR_PLACEHOLDER)
    }

    /// Check the form and produce an insertable entry.
    ///
    /// Rules run in order: required text fields, doctor selection, then
    /// hospital total against surgery total. The first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] the form violates.
    pub fn validate(&self) -> Result<ValidatedEntry, ValidationError> {
        let required = [
            ("place", &self.place),
            ("administrator", &self.administrator),
            ("optom", &self.optom),
            ("optom_intern", &self.optom_intern),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField { field });
            }
        }

        let doctor = self
            .selected_doctor()
            .ok_or(ValidationError::NoDoctorSelected)?;

        let hospital = self.hospital.total();
        let surgery = self.surgery.total();
        if hospital > surgery {
            return Err(ValidationError::HospitalExceedsSurgery { hospital, surgery });
        }

        Ok(ValidatedEntry {
            place: self.place.trim().to_string(),
            camp_date: self.camp_date,
            administrator: self.administrator.trim().to_string(),
            doctor: doctor.to_string(),
            optom: self.optom.trim().to_string(),
            optom_intern: self.optom_intern.trim().to_string(),
            opd: self.opd,
            surgery: self.surgery,
            hospital: self.hospital,
            medicines: self.medicines,
            spectacles: self.spectacles,
            location: self.location,
        })
    }
}

/// A form that passed validation. Only [`EntryForm::validate`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub(crate) place: String,
    pub(crate) camp_date: NaiveDate,
    pub(crate) administrator: String,
    pub(crate) doctor: String,
    pub(crate) optom: String,
    pub(crate) optom_intern: String,
    pub(crate) opd: Counts,
    pub(crate) surgery: Counts,
    pub(crate) hospital: Counts,
    pub(crate) medicines: Medicines,
    pub(crate) spectacles: u32,
    pub(crate) location: Option<Geolocation>,
}

impl ValidatedEntry {
    /// Trimmed place of camp.
    #[must_use]
    pub fn place(&self) -> &str {
        &self.place
    }

    /// The selected doctor.
    #[must_use]
    pub fn doctor(&self) -> &str {
        &self.doctor
    }

    /// Date of camp.
    #[must_use]
    pub fn camp_date(&self) -> NaiveDate {
        self.camp_date
    }

    /// Device location, if captured.
    #[must_use]
    pub fn location(&self) -> Option<Geolocation> {
        self.location
    }

    /// Derived `(opd_t, surg_t, hosp_t)`.
    #[must_use]
    pub fn totals(&self) -> (i64, i64, i64) {
        (
            self.opd.total(),
            self.surgery.total(),
            self.hospital.total(),
        )
    }
}

/// One persisted row of `camp_entries`.
///
/// Field names match the column names. Columns that an older database left
/// NULL read back as empty strings or zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CampEntry {
    pub id: EntryId,
    pub place: String,
    pub camp_date: String,
    pub administrator: String,
    pub doctor: String,
    pub optom: String,
    pub optom_intern: String,
    pub opd_m: u32,
    pub opd_f: u32,
    pub opd_t: i64,
    pub surg_m: u32,
    pub surg_f: u32,
    pub surg_t: i64,
    pub hosp_m: u32,
    pub hosp_f: u32,
    pub hosp_t: i64,
    pub ciplox: u32,
    pub ciplox_d: u32,
    pub cmc: u32,
    pub fedtive: u32,
    pub glucose_strips: u32,
    pub spectacles: u32,
    pub photo_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub created_at: String,
}

impl CampEntry {
    /// The stored location, present only when all three parts are set.
    #[must_use]
    pub fn location(&self) -> Option<Geolocation> {
        Geolocation::from_parts(self.latitude, self.longitude, self.accuracy)
            .ok()
            .flatten()
    }
}

/// Preview of the most recent submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    /// Place of camp.
    pub place: String,
    /// Date of camp.
    pub camp_date: NaiveDate,
    /// Selected doctor.
    pub doctor: String,
    /// Latitude, if captured.
    pub latitude: Option<f64>,
    /// Longitude, if captured.
    pub longitude: Option<f64>,
    /// Stored photo name, if a photo was attached.
    pub photo: Option<String>,
}

impl SubmissionSummary {
    /// Summarize a validated entry and the photo stored alongside it.
    #[must_use]
    pub fn new(entry: &ValidatedEntry, photo: Option<String>) -> Self {
        Self {
            place: entry.place.clone(),
            camp_date: entry.camp_date,
            doctor: entry.doctor.clone(),
            latitude: entry.location.map(|l| l.latitude),
            longitude: entry.location.map(|l| l.longitude),
            photo,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The Riverside camp used across the test suite.
    pub(crate) fn riverside_form() -> EntryForm {
        let mut form = EntryForm::new(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        form.place = "Riverside".to_string();
        form.administrator = "A. Rao".to_string();
        form.doctor = Some("Dr. Mehta".to_string());
        form.optom = "S. Iyer".to_string();
        form.optom_intern = "P. Das".to_string();
        form.opd = Counts::new(10, 15);
        form.surgery = Counts::new(4, 2);
        form.hospital = Counts::new(3, 1);
        form
    }

    #[test]
    fn test_counts_total() {
        assert_eq!(Counts::new(10, 15).total(), 25);
        assert_eq!(Counts::default().total(), 0);
        assert_eq!(Counts::new(u32::MAX, 1).total(), i64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_large_hospital_total_still_rejected() {
        let mut form = riverside_form();
        form.opd = Counts::new(u32::MAX, 5);
        form.surgery = Counts::new(u32::MAX, 0);
        form.hospital = Counts::new(u32::MAX, 1);

        assert_eq!(
            form.validate(),
            Err(ValidationError::HospitalExceedsSurgery {
                hospital: 4_294_967_296,
                surgery: 4_294_967_295,
            })
        );
    }

    #[test]
    fn test_large_totals_are_exact() {
        let mut form = riverside_form();
        form.opd = Counts::new(u32::MAX, 5);
        form.surgery = Counts::new(u32::MAX, 1);
        form.hospital = Counts::new(u32::MAX, 1);

        let entry = form.validate().unwrap();
        assert_eq!(
            entry.totals(),
            (4_294_967_300, 4_294_967_296, 4_294_967_296)
        );
    }

    #[test]
    fn test_riverside_scenario_passes() {
        let entry = riverside_form().validate().unwrap();
        assert_eq!(entry.totals(), (25, 6, 4));
        assert_eq!(entry.doctor(), "Dr. Mehta");
    }

    #[test]
    fn test_hospital_exceeding_surgery_rejected() {
        let mut form = riverside_form();
        form.hospital.female = 5;

        assert_eq!(
            form.validate(),
            Err(ValidationError::HospitalExceedsSurgery {
                hospital: 8,
                surgery: 6
            })
        );
    }

    #[test]
    fn test_hospital_equal_to_surgery_accepted() {
        let mut form = riverside_form();
        form.hospital = Counts::new(4, 2);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_each_required_field_rejected_when_blank() {
        for field in ["place", "administrator", "optom", "optom_intern"] {
            let mut form = riverside_form();
            let target = match field {
                "place" => &mut form.place,
                "administrator" => &mut form.administrator,
                "optom" => &mut form.optom,
                _ => &mut form.optom_intern,
            };
            *target = "   ".to_string();

            assert_eq!(
                form.validate(),
                Err(ValidationError::MissingField { field }),
                "{field} should be required"
            );
        }
    }

    #[test]
    fn test_required_fields_checked_before_hospital_rule() {
        let mut form = riverside_form();
        form.place = String::new();
        form.hospital = Counts::new(50, 50);

        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField { field: "place" })
        );
    }

    #[test]
    fn test_placeholder_doctor_rejected() {
        let mut form = riverside_form();
        form.doctor = Some(DOCTOR_PLACEHOLDER.to_string());
        assert_eq!(form.validate(), Err(ValidationError::NoDoctorSelected));

        form.doctor = None;
        assert_eq!(form.validate(), Err(ValidationError::NoDoctorSelected));
    }

    #[test]
    fn test_validate_trims_text() {
        let mut form = riverside_form();
        form.place = "  Riverside ".to_string();
        form.doctor = Some(" Dr. Mehta ".to_string());

        let entry = form.validate().unwrap();
        assert_eq!(entry.place(), "Riverside");
        assert_eq!(entry.doctor(), "Dr. Mehta");
    }

    #[test]
    fn test_geolocation_from_parts() {
        assert_eq!(Geolocation::from_parts(None, None, None), Ok(None));

        let loc = Geolocation::from_parts(Some(12.97), Some(77.59), Some(15.0))
            .unwrap()
            .unwrap();
        assert!((loc.latitude - 12.97).abs() < f64::EPSILON);

        assert_eq!(
            Geolocation::from_parts(Some(12.97), None, Some(15.0)),
            Err(ValidationError::IncompleteLocation)
        );
    }

    #[test]
    fn test_summary_carries_location_and_photo() {
        let mut form = riverside_form();
        form.location = Some(Geolocation {
            latitude: 1.5,
            longitude: 2.5,
            accuracy: 10.0,
        });
        let entry = form.validate().unwrap();

        let summary = SubmissionSummary::new(&entry, Some("p.jpg".to_string()));
        assert_eq!(summary.latitude, Some(1.5));
        assert_eq!(summary.longitude, Some(2.5));
        assert_eq!(summary.photo.as_deref(), Some("p.jpg"));
    }

    #[test]
    fn test_form_deserializes_with_defaults() {
        let json = r#"{
            "place": "Hilltop",
            "camp_date": "2024-05-01",
            "administrator": "K",
            "doctor": "Dr. B",
            "optom": "O",
            "optom_intern": "I",
            "opd": {"male": 1, "female": 2},
            "surgery": {"male": 0, "female": 0},
            "hospital": {"male": 0, "female": 0}
        }"#;
        let form: EntryForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.spectacles, 0);
        assert!(form.location.is_none());
        assert_eq!(form.medicines, Medicines::default());
    }
}
