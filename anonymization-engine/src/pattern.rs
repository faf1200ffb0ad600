//! Rule-based detector for Swiss medical text
//!
//! Recognizes Swiss identifier formats (AHV, insurance numbers, FMH
//! licenses, record and patient ids), Swiss phone numbers, e-mail
//! addresses, `DD.MM.YYYY` dates and person names introduced by an
//! honorific or role ("Herr", "Frau", "Dr.", "Patient", "Patientin").
//! Name matches carry a low score so they are routed to manual review.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Reverse;

use crate::allow_list::AllowList;
use crate::detector::EntityDetector;
use crate::entity::{DetectedSpan, EntityType};
use crate::error::DetectionError;

struct Recognizer {
    entity_type: EntityType,
    pattern: Regex,
    score: f64,
    /// Capture group holding the entity, 0 for the whole match
    group: usize,
}

impl Recognizer {
    fn new(entity_type: EntityType, pattern: &str, score: f64, group: usize) -> Self {
        Self {
            entity_type,
            pattern: Regex::new(pattern).expect("recognizer pattern must compile"),
            score,
            group,
        }
    }
}

/// One capitalized name word, hyphenated parts included ("Meier-Schmid",
/// "Dupré", "Zoë")
const NAME_WORD: &str = r"\p{Lu}[\p{Ll}\p{M}]+(?:-\p{Lu}[\p{Ll}\p{M}]+)*";

lazy_static! {
    static ref RECOGNIZERS: Vec<Recognizer> = vec![
        Recognizer::new(EntityType::SwissAhv, r"\b756\.\d{4}\.\d{4}\.\d{2}\b", 0.95, 0),
        Recognizer::new(EntityType::SwissInsurance, r"\b\d{3}\.\d{4}\.\d{4}\.\d{2}\b", 0.85, 0),
        Recognizer::new(EntityType::MedicalLicense, r"\b[A-Z]{2}-\d{6}\b", 0.85, 0),
        Recognizer::new(EntityType::MedicalRecord, r"\bMR-\d{8}\b", 0.9, 0),
        Recognizer::new(EntityType::HospitalPatientId, r"\bP-\d{6}-\d{2}\b", 0.85, 0),
        Recognizer::new(
            EntityType::PhoneNumber,
            r"(?:\+41|0041|\b0)\s?\d{2}\s?\d{3}\s?\d{2}\s?\d{2}\b",
            0.9,
            0,
        ),
        Recognizer::new(
            EntityType::EmailAddress,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            0.95,
            0,
        ),
        Recognizer::new(EntityType::DateTime, r"\b\d{1,2}\.\d{1,2}\.\d{4}\b", 0.8, 0),
        Recognizer::new(
            EntityType::Person,
            &format!(r"\b(?:Herr|Frau|Dr\.|Patientin|Patient)\s+({NAME_WORD}(?:\s+{NAME_WORD})?)"),
            0.6,
            1,
        ),
    ];
}

/// Regex-backed [`EntityDetector`]
#[derive(Debug, Clone, Default)]
pub struct PatternDetector;

impl PatternDetector {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous detection, also used by the async trait implementation
    pub fn scan(&self, text: &str, allow_list: &AllowList) -> Vec<DetectedSpan> {
        let mut candidates: Vec<DetectedSpan> = Vec::new();

        for recognizer in RECOGNIZERS.iter() {
            for captures in recognizer.pattern.captures_iter(text) {
                let Some(found) = captures.get(recognizer.group) else {
                    continue;
                };
                if allow_list.contains(found.as_str()) {
                    continue;
                }
                // "Patient Parkinson-Verdacht" names a condition, not a person
                if recognizer.entity_type == EntityType::Person
                    && found
                        .as_str()
                        .split(|c: char| c == '-' || c.is_whitespace())
                        .any(|part| allow_list.contains(part))
                {
                    continue;
                }
                let (Some(start), Some(end)) = (
                    char_offset(text, found.start()),
                    char_offset(text, found.end()),
                ) else {
                    continue;
                };
                candidates.push(DetectedSpan::new(
                    recognizer.entity_type.as_str(),
                    start,
                    end,
                    recognizer.score,
                ));
            }
        }

        // Earliest first, then longest, then most specific (highest score).
        candidates.sort_by(|a, b| {
            (a.start, Reverse(a.len()))
                .cmp(&(b.start, Reverse(b.len())))
                .then(b.score.total_cmp(&a.score))
        });

        let mut spans: Vec<DetectedSpan> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match spans.last() {
                Some(last) if candidate.start < last.end => continue,
                _ => spans.push(candidate),
            }
        }
        spans
    }
}

#[async_trait]
impl EntityDetector for PatternDetector {
    async fn detect(&self, text: &str, allow_list: &AllowList) -> Result<Vec<DetectedSpan>, DetectionError> {
        Ok(self.scan(text, allow_list))
    }
}

fn char_offset(text: &str, byte_offset: usize) -> Option<usize> {
    text.get(..byte_offset).map(|prefix| prefix.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(spans: &[DetectedSpan]) -> Vec<&str> {
        spans.iter().map(|s| s.entity_type.as_str()).collect()
    }

    fn slice(text: &str, span: &DetectedSpan) -> String {
        text.chars().skip(span.start).take(span.len()).collect()
    }

    #[test]
    fn test_detects_swiss_identifiers() {
        let text = "Patient Max Muster, AHV 756.1234.5678.90, Tel. 079 123 45 67";
        let spans = PatternDetector::new().scan(text, &AllowList::medical());

        assert_eq!(labels(&spans), vec!["PERSON", "SWISS_AHV", "PHONE_NUMBER"]);
        assert_eq!(slice(text, &spans[0]), "Max Muster");
        assert_eq!(slice(text, &spans[1]), "756.1234.5678.90");
        assert_eq!(slice(text, &spans[2]), "079 123 45 67");
        assert!(spans[0].score < 0.8);
    }

    #[test]
    fn test_ahv_wins_over_insurance_format() {
        let spans = PatternDetector::new().scan("756.9999.0000.11", &AllowList::new());
        assert_eq!(labels(&spans), vec!["SWISS_AHV"]);

        let spans = PatternDetector::new().scan("123.4567.8901.23", &AllowList::new());
        assert_eq!(labels(&spans), vec!["SWISS_INSURANCE"]);
    }

    #[test]
    fn test_record_license_patient_id_email_and_date() {
        let text = "Akte MR-12345678, Ärztin GE-123456, Fall P-123456-01, geb. 03.04.1975, mail anna@spital.ch";
        let spans = PatternDetector::new().scan(text, &AllowList::new());

        assert_eq!(
            labels(&spans),
            vec!["MEDICAL_RECORD", "MEDICAL_LICENSE", "HOSPITAL_PATIENT_ID", "DATE_TIME", "EMAIL_ADDRESS"]
        );
    }

    #[test]
    fn test_offsets_are_character_based() {
        let text = "Ärztlicher Bericht für Frau Müller";
        let spans = PatternDetector::new().scan(text, &AllowList::new());

        assert_eq!(spans.len(), 1);
        assert_eq!(slice(text, &spans[0]), "Müller");
        assert_eq!(spans[0].end, text.chars().count());
    }

    #[test]
    fn test_allow_listed_terms_are_not_reported() {
        let text = "Patient Parkinson-Verdacht, Frau Alzheimer";
        let spans = PatternDetector::new().scan(text, &AllowList::medical());
        assert!(spans.is_empty(), "unexpected spans: {:?}", spans);
    }

    #[test]
    fn test_replacement_tokens_are_not_redetected() {
        let text = "Patient [PERSON], AHV [AHV-NUMMER], Tel. [TELEFON], Mail [EMAIL]";
        let spans = PatternDetector::new().scan(text, &AllowList::medical());
        assert!(spans.is_empty());
    }

    #[test]
    fn test_names_with_hyphens_and_accents_are_matched_whole() {
        let detector = PatternDetector::new();
        let cases = [
            ("Frau Meier-Schmid kommt", "Meier-Schmid"),
            ("Herr Dupré kommt", "Dupré"),
            ("Patientin Zoë Keller", "Zoë Keller"),
            ("Dr. Núñez-García hat unterschrieben", "Núñez-García"),
        ];

        for (text, name) in cases {
            let spans = detector.scan(text, &AllowList::medical());
            assert_eq!(labels(&spans), vec!["PERSON"], "{}", text);
            assert_eq!(slice(text, &spans[0]), name);
        }
    }
}
