use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier assigned to an entity at detection time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Kind of sensitive data a span was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Location,
    DateTime,
    PhoneNumber,
    EmailAddress,
    /// Swiss social security number (AHV), `756.XXXX.XXXX.XX`
    SwissAhv,
    /// Swiss health insurance number, `XXX.XXXX.XXXX.XX`
    SwissInsurance,
    MedicalLicense,
    MedicalRecord,
    HospitalPatientId,
    Other,
}

impl EntityType {
    pub const ALL: [EntityType; 11] = [
        EntityType::Person,
        EntityType::Location,
        EntityType::DateTime,
        EntityType::PhoneNumber,
        EntityType::EmailAddress,
        EntityType::SwissAhv,
        EntityType::SwissInsurance,
        EntityType::MedicalLicense,
        EntityType::MedicalRecord,
        EntityType::HospitalPatientId,
        EntityType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Location => "LOCATION",
            Self::DateTime => "DATE_TIME",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::EmailAddress => "EMAIL_ADDRESS",
            Self::SwissAhv => "SWISS_AHV",
            Self::SwissInsurance => "SWISS_INSURANCE",
            Self::MedicalLicense => "MEDICAL_LICENSE",
            Self::MedicalRecord => "MEDICAL_RECORD",
            Self::HospitalPatientId => "HOSPITAL_PATIENT_ID",
            Self::Other => "OTHER",
        }
    }

    /// Map a detection engine label onto a known type, anything unknown is `Other`
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw span as returned by a detection engine.
///
/// Offsets are character (Unicode scalar) offsets, half-open `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedSpan {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

impl DetectedSpan {
    pub fn new(entity_type: impl Into<String>, start: usize, end: usize, score: f64) -> Self {
        Self {
            entity_type: entity_type.into(),
            start,
            end,
            score,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A detected piece of PII.
///
/// `start`/`end` always refer to the original text, never to the redacted
/// output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
    pub anonymized_text: Option<String>,
}

impl Entity {
    pub fn needs_review(&self, confidence_threshold: f64) -> bool {
        self.score < confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_and_unknown_maps_to_other() {
        for entity_type in EntityType::ALL {
            assert_eq!(EntityType::from_label(entity_type.as_str()), entity_type);
        }
        assert_eq!(EntityType::from_label("phone_number"), EntityType::PhoneNumber);
        assert_eq!(EntityType::from_label("IBAN_CODE"), EntityType::Other);
    }

    #[test]
    fn test_entity_type_serializes_as_label() {
        let json = serde_json::to_string(&EntityType::SwissAhv).unwrap();
        assert_eq!(json, "\"SWISS_AHV\"");
    }

    #[test]
    fn test_entity_id_parses_its_display_form() {
        let id = EntityId::generate();
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
