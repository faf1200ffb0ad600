//! Span normalization and single-pass redaction
//!
//! All offsets are character offsets into the original text. Redaction
//! walks the original once, copying the untouched gaps and emitting each
//! entity's replacement, so no replacement can shift an offset that has
//! not been consumed yet.

use std::cmp::Reverse;

use crate::entity::{DetectedSpan, Entity};
use crate::error::{AnonymizationError, AnonymizationResult};

/// Byte position of every character boundary in a text
pub(crate) struct CharIndex<'a> {
    text: &'a str,
    boundaries: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Number of characters in the text
    pub(crate) fn char_len(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    /// Substring for the character range `[start, end)`
    pub(crate) fn slice(&self, start: usize, end: usize) -> Option<&'a str> {
        let from = *self.boundaries.get(start)?;
        let to = *self.boundaries.get(end)?;
        self.text.get(from..to)
    }
}

/// Validate spans against the text length and collapse overlaps.
///
/// Spans are ordered by start ascending, then length descending. A span
/// that overlaps the previously kept one is folded into it: the kept span
/// grows to cover the union and keeps its own type and score.
pub fn normalize_spans(mut spans: Vec<DetectedSpan>, char_len: usize) -> AnonymizationResult<Vec<DetectedSpan>> {
    for span in &spans {
        if span.start >= span.end || span.end > char_len {
            return Err(AnonymizationError::InvalidSpan {
                start: span.start,
                end: span.end,
                length: char_len,
            });
        }
    }

    spans.sort_by_key(|span| (span.start, Reverse(span.len())));

    let mut kept: Vec<DetectedSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match kept.last_mut() {
            Some(last) if span.start < last.end => {
                if span.end > last.end {
                    tracing::debug!(
                        kept_type = %last.entity_type,
                        merged_type = %span.entity_type,
                        "Merging overlapping detection spans"
                    );
                    last.end = span.end;
                }
            }
            _ => kept.push(span),
        }
    }

    Ok(kept)
}

/// Produce the redacted text from the original and its ordered,
/// non-overlapping entities. Entities without a replacement are copied
/// through unchanged.
pub fn redact(text: &str, entities: &[Entity]) -> String {
    let index = CharIndex::new(text);
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0usize;

    for entity in entities {
        if entity.start < cursor {
            continue;
        }
        if let Some(gap) = index.slice(cursor, entity.start) {
            output.push_str(gap);
        }
        match entity.anonymized_text.as_deref() {
            Some(replacement) => output.push_str(replacement),
            None => {
                if let Some(original) = index.slice(entity.start, entity.end) {
                    output.push_str(original);
                }
            }
        }
        cursor = entity.end;
    }

    if let Some(tail) = index.slice(cursor, index.char_len()) {
        output.push_str(tail);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, EntityType};

    fn entity(start: usize, end: usize, token: &str) -> Entity {
        Entity {
            id: EntityId::generate(),
            entity_type: EntityType::Other,
            text: String::new(),
            start,
            end,
            score: 0.9,
            anonymized_text: Some(token.to_string()),
        }
    }

    #[test]
    fn test_char_index_handles_multibyte_text() {
        let index = CharIndex::new("Grüezi Müller");
        assert_eq!(index.char_len(), 13);
        assert_eq!(index.slice(7, 13), Some("Müller"));
        assert_eq!(index.slice(0, 14), None);
    }

    #[test]
    fn test_redact_replacements_of_different_lengths() {
        let text = "AB Carla 0791234567 end";
        let entities = vec![entity(3, 8, "[PERSON]"), entity(9, 19, "[T]")];
        assert_eq!(redact(text, &entities), "AB [PERSON] [T] end");
    }

    #[test]
    fn test_redact_without_entities_is_identity() {
        assert_eq!(redact("nichts zu tun", &[]), "nichts zu tun");
    }

    #[test]
    fn test_normalize_rejects_out_of_range_spans() {
        let spans = vec![DetectedSpan::new("PERSON", 2, 12, 0.9)];
        let err = normalize_spans(spans, 10).unwrap_err();
        assert_eq!(err, AnonymizationError::InvalidSpan { start: 2, end: 12, length: 10 });

        let spans = vec![DetectedSpan::new("PERSON", 4, 4, 0.9)];
        assert!(normalize_spans(spans, 10).is_err());
    }

    #[test]
    fn test_normalize_merges_overlaps_keeping_earliest_longest() {
        let spans = vec![
            DetectedSpan::new("DATE_TIME", 6, 14, 0.8),
            DetectedSpan::new("PERSON", 0, 5, 0.6),
            DetectedSpan::new("LOCATION", 0, 8, 0.7),
            DetectedSpan::new("PHONE_NUMBER", 20, 25, 0.9),
        ];
        let kept = normalize_spans(spans, 30).unwrap();

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].entity_type, "LOCATION");
        assert_eq!((kept[0].start, kept[0].end), (0, 14));
        assert_eq!(kept[1].entity_type, "PHONE_NUMBER");
    }

    #[test]
    fn test_adjacent_spans_are_not_merged() {
        let spans = vec![DetectedSpan::new("PERSON", 0, 4, 0.9), DetectedSpan::new("PERSON", 4, 8, 0.9)];
        assert_eq!(normalize_spans(spans, 8).unwrap().len(), 2);
    }
}
