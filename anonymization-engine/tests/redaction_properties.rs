use anonymization_engine::{normalize_spans, redact, DetectedSpan, Entity, EntityId, EntityType};
use proptest::prelude::*;

/// Text segments: digit runs stand in for PII, lowercase words (with
/// umlauts) for everything else, so a leak is any digit in the output.
fn segments() -> impl Strategy<Value = Vec<(String, bool, bool)>> {
    prop::collection::vec(
        prop_oneof![
            ("[0-9]{3,10}", any::<bool>()).prop_map(|(s, overlap)| (s, true, overlap)),
            "[a-zäöü]{1,8}".prop_map(|s| (s, false, false)),
        ],
        1..12,
    )
}

fn entities_for(text: &str, spans: Vec<DetectedSpan>) -> Vec<Entity> {
    let length = text.chars().count();
    normalize_spans(spans, length)
        .unwrap()
        .into_iter()
        .map(|span| Entity {
            id: EntityId::generate(),
            entity_type: EntityType::from_label(&span.entity_type),
            text: text.chars().skip(span.start).take(span.end - span.start).collect(),
            start: span.start,
            end: span.end,
            score: span.score,
            anonymized_text: Some("[VERTRAULICH]".to_string()),
        })
        .collect()
}

proptest! {
    #[test]
    fn redaction_never_leaks_detected_text(parts in segments()) {
        let mut text = String::new();
        let mut spans = Vec::new();
        let mut offset = 0usize;

        for (index, (segment, is_pii, overlap)) in parts.iter().enumerate() {
            if index > 0 {
                text.push(' ');
                offset += 1;
            }
            let length = segment.chars().count();
            if *is_pii {
                spans.push(DetectedSpan::new("PHONE_NUMBER", offset, offset + length, 0.9));
                if *overlap {
                    spans.push(DetectedSpan::new("SWISS_AHV", offset + 1, offset + length, 0.95));
                }
            }
            text.push_str(segment);
            offset += length;
        }

        let entities = entities_for(&text, spans);
        let redacted = redact(&text, &entities);

        prop_assert!(!redacted.chars().any(|c| c.is_ascii_digit()), "leaked: {}", redacted);
        for (segment, is_pii, _) in &parts {
            if !is_pii {
                prop_assert!(redacted.contains(segment.as_str()));
            }
        }
        for entity in &entities {
            prop_assert!(entity.text.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
