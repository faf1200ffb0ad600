use async_trait::async_trait;
use std::sync::Arc;

use anonymization_engine::{
    AllowList, AnonymizationConfig, AnonymizationGuarantee, AnonymizationOrchestrator,
    AnonymizationStatus, DetectedSpan, DetectionError, EntityDetector, EntityType, PatternDetector,
};

const PATIENT_TEXT: &str = "Patient Max Muster, AHV 756.1234.5678.90, Tel. 079 123 45 67";

/// Detector returning a fixed span list regardless of input
struct ScriptedDetector {
    spans: Vec<DetectedSpan>,
}

#[async_trait]
impl EntityDetector for ScriptedDetector {
    async fn detect(&self, _text: &str, _allow_list: &AllowList) -> Result<Vec<DetectedSpan>, DetectionError> {
        Ok(self.spans.clone())
    }
}

fn patient_spans(person_score: f64) -> Vec<DetectedSpan> {
    vec![
        DetectedSpan::new("PERSON", 8, 18, person_score),
        DetectedSpan::new("SWISS_AHV", 24, 40, 0.95),
        DetectedSpan::new("PHONE_NUMBER", 47, 60, 0.9),
    ]
}

fn build(config: AnonymizationConfig, detector: impl EntityDetector + 'static) -> AnonymizationOrchestrator {
    let guarantee = AnonymizationGuarantee::verify(&config).unwrap();
    AnonymizationOrchestrator::new(guarantee, Arc::new(detector)).unwrap()
}

#[tokio::test]
async fn test_high_confidence_entities_are_redacted_without_review() {
    let orchestrator = build(
        AnonymizationConfig::default(),
        ScriptedDetector { spans: patient_spans(0.9) },
    );

    let outcome = orchestrator.process_text(PATIENT_TEXT).await.unwrap();

    assert_eq!(
        outcome.redacted_text,
        "Patient [PERSON], AHV [AHV-NUMMER], Tel. [TELEFON]"
    );
    assert_eq!(outcome.entities.len(), 3);
    assert!(outcome.entities.iter().all(|e| e.anonymized_text.is_some()));
    assert_eq!(outcome.entities[0].text, "Max Muster");
    assert_eq!(outcome.entities[1].entity_type, EntityType::SwissAhv);
    assert_eq!(outcome.status, AnonymizationStatus::Completed);
    assert_eq!(orchestrator.review_queue().size(), 0);
}

#[tokio::test]
async fn test_low_confidence_person_goes_to_review_and_accepts_custom_token() {
    let orchestrator = build(
        AnonymizationConfig::default(),
        ScriptedDetector { spans: patient_spans(0.5) },
    );

    let outcome = orchestrator.process_text(PATIENT_TEXT).await.unwrap();
    assert!(outcome.redacted_text.starts_with("Patient [PERSON],"));
    assert!(!outcome.redacted_text.contains("Max Muster"));
    assert_eq!(outcome.status, AnonymizationStatus::ReviewRequired);

    let person = &outcome.entities[0];
    let pending = orchestrator.pending_reviews();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, person.id);

    let decided = orchestrator
        .review_decision(&person.id, true, Some("[CUSTOM]"))
        .unwrap()
        .expect("entity should still be pending");
    assert_eq!(decided.anonymized_text.as_deref(), Some("[CUSTOM]"));
    assert_eq!(orchestrator.review_queue().size(), 0);

    assert!(orchestrator.review_decision(&person.id, true, Some("[CUSTOM]")).unwrap().is_none());
}

#[tokio::test]
async fn test_full_review_queue_still_redacts() {
    let config = AnonymizationConfig { review_queue_capacity: 2, ..Default::default() };
    let orchestrator = build(
        config,
        ScriptedDetector {
            spans: vec![
                DetectedSpan::new("PERSON", 0, 4, 0.3),
                DetectedSpan::new("PERSON", 5, 9, 0.4),
                DetectedSpan::new("LOCATION", 10, 14, 0.5),
            ],
        },
    );

    let outcome = orchestrator.process_text("Anna Beat Bern").await.unwrap();

    assert_eq!(outcome.redacted_text, "[PERSON] [PERSON] [ORT]");
    assert_eq!(outcome.entities.len(), 3);
    assert_eq!(outcome.queued_for_review, 2);

    let third = &outcome.entities[2];
    assert!(orchestrator.pending_reviews().iter().all(|e| e.id != third.id));
    assert!(orchestrator.review_queue().is_full());
}

#[tokio::test]
async fn test_configured_token_overrides_apply() {
    let mut config = AnonymizationConfig::default();
    config.replacement_tokens.insert("PERSON".to_string(), "[NAME]".to_string());
    let orchestrator = build(config, ScriptedDetector { spans: patient_spans(0.9) });

    let outcome = orchestrator.process_text(PATIENT_TEXT).await.unwrap();
    assert!(outcome.redacted_text.starts_with("Patient [NAME],"));
}

#[tokio::test]
async fn test_pattern_detector_pipeline_is_idempotent() {
    let orchestrator = build(AnonymizationConfig::default(), PatternDetector::new());
    let text = "Frau Anna Keller (geb. 12.03.1961) leidet an Diabetes und Asthma. \
                Kontakt: anna.keller@example.ch, +41 79 555 12 34, Akte MR-20240117.";

    let first = orchestrator.process_text(text).await.unwrap();
    for raw in ["Anna Keller", "12.03.1961", "anna.keller@example.ch", "+41 79 555 12 34", "MR-20240117"] {
        assert!(!first.redacted_text.contains(raw), "{} leaked", raw);
    }
    assert!(first.redacted_text.contains("Diabetes"));
    assert!(first.redacted_text.contains("Asthma"));

    let second = orchestrator.process_text(&first.redacted_text).await.unwrap();
    assert!(second.entities.is_empty(), "re-detected: {:?}", second.entities);
    assert_eq!(second.redacted_text, first.redacted_text);
}

#[tokio::test]
async fn test_compound_and_accented_names_are_fully_redacted() {
    let orchestrator = build(AnonymizationConfig::default(), PatternDetector::new());

    for (text, expected) in [
        ("Frau Meier-Schmid kommt", "Frau [PERSON] kommt"),
        ("Herr Dupré kommt", "Herr [PERSON] kommt"),
        ("Patientin Zoë Keller", "Patientin [PERSON]"),
    ] {
        let outcome = orchestrator.process_text(text).await.unwrap();
        assert_eq!(outcome.redacted_text, expected);
        assert_eq!(outcome.status, AnonymizationStatus::ReviewRequired);
    }
}

#[tokio::test]
async fn test_overlapping_spans_leave_no_original_characters() {
    let orchestrator = build(
        AnonymizationConfig::default(),
        ScriptedDetector {
            spans: vec![
                DetectedSpan::new("PERSON", 0, 9, 0.9),
                DetectedSpan::new("LOCATION", 5, 11, 0.9),
            ],
        },
    );

    let outcome = orchestrator.process_text("Hans Zürich-Ost rest").await.unwrap();
    assert_eq!(outcome.entities.len(), 1);
    assert_eq!(outcome.entities[0].text, "Hans Zürich");
    assert_eq!(outcome.redacted_text, "[PERSON]-Ost rest");
}
