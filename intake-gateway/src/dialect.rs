//! Swiss German dialect detection
//!
//! Purely informational: the result only tunes analysis prompts and is
//! reported to callers. It never influences anonymization.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::DialectConfig;

/// (dialect word, Standard German, confidence)
const DIALECT_LEXICON: &[(&str, &str, f64)] = &[
    ("grüezi", "guten tag", 0.95),
    ("merci", "danke", 0.8),
    ("hoi", "hallo", 0.9),
    ("velo", "fahrrad", 0.85),
    ("spital", "krankenhaus", 0.9),
    ("tschüss", "auf wiedersehen", 0.8),
    ("znüni", "zwischenmahlzeit", 0.95),
    ("rüebli", "karotte", 0.9),
    ("bünzli", "spießer", 0.85),
    ("chuchichäschtli", "küchenschrank", 0.99),
    ("gummiband", "gummiband", 0.7),
    ("parat", "bereit", 0.8),
    ("parkieren", "parken", 0.85),
    ("posten", "einkaufen", 0.8),
    ("pressant", "dringend", 0.85),
    ("beige", "beige", 0.7),
    ("glace", "eis", 0.9),
    ("portemonnaie", "geldbeutel", 0.85),
    ("schoggi", "schokolade", 0.9),
    ("isch", "ist", 0.9),
    ("nöd", "nicht", 0.9),
    ("chli", "ein bisschen", 0.9),
    ("öppis", "etwas", 0.95),
    ("gsi", "gewesen", 0.9),
    ("chopfweh", "kopfschmerzen", 0.95),
    ("buuchweh", "bauchschmerzen", 0.95),
];

/// Swiss medical vocabulary and its Standard German counterpart
const MEDICAL_TERMS: &[(&str, &str)] = &[
    ("spital", "krankenhaus"),
    ("doktor", "arzt"),
    ("medikament", "arzneimittel"),
    ("apotheke", "apotheke"),
    ("krankenkasse", "krankenversicherung"),
    ("sprechstunde", "sprechstunde"),
    ("röntgen", "röntgen"),
    ("fieber", "fieber"),
    ("grippe", "grippe"),
    ("allergie", "allergie"),
    ("blutdruck", "blutdruck"),
    ("blutzucker", "blutzucker"),
    ("herz", "herz"),
    ("lunge", "lunge"),
    ("niere", "niere"),
    ("leber", "leber"),
    ("magen", "magen"),
    ("darm", "darm"),
    ("kopfweh", "kopfschmerzen"),
    ("rückenweh", "rückenschmerzen"),
    ("halsweh", "halsschmerzen"),
];

fn alternation<'a>(words: impl Iterator<Item = &'a str>) -> Regex {
    let pattern = words.map(regex::escape).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"\b(?:{})\b", pattern)).expect("lexicon pattern must compile")
}

lazy_static! {
    static ref DIALECT_REGEX: Regex = alternation(DIALECT_LEXICON.iter().map(|(word, _, _)| *word));
    static ref MEDICAL_REGEX: Regex = alternation(MEDICAL_TERMS.iter().map(|(word, _)| *word));
    static ref DIALECT_INDEX: BTreeMap<&'static str, (&'static str, f64)> = DIALECT_LEXICON
        .iter()
        .map(|(word, standard, confidence)| (*word, (*standard, *confidence)))
        .collect();
}

/// One dialect word found in the text (character offsets into the
/// lowercased text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialectMarker {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub standard_german: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialectResult {
    pub is_swiss_german: bool,
    /// Mean marker confidence, 0.0 without markers
    pub confidence: f64,
    pub markers: Vec<DialectMarker>,
}

/// Dialect detection collaborator
pub trait DialectDetector: Send + Sync {
    fn detect(&self, text: &str) -> DialectResult;

    /// Regional medical vocabulary found in `text`
    fn extract_medical_terms(&self, _text: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Lexicon-based Swiss German detector
#[derive(Debug, Clone)]
pub struct SwissGermanDetector {
    min_confidence: f64,
    min_matches: usize,
}

impl Default for SwissGermanDetector {
    fn default() -> Self {
        Self::new(&DialectConfig::default())
    }
}

impl SwissGermanDetector {
    pub fn new(config: &DialectConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            min_matches: config.min_matches,
        }
    }
}

impl DialectDetector for SwissGermanDetector {
    fn detect(&self, text: &str) -> DialectResult {
        let lowered = text.to_lowercase();
        let mut markers = Vec::new();

        for found in DIALECT_REGEX.find_iter(&lowered) {
            let Some(&(standard, confidence)) = DIALECT_INDEX.get(found.as_str()) else {
                continue;
            };
            let start = lowered.get(..found.start()).map_or(0, |prefix| prefix.chars().count());
            markers.push(DialectMarker {
                text: found.as_str().to_string(),
                start,
                end: start + found.as_str().chars().count(),
                standard_german: standard.to_string(),
                confidence,
            });
        }

        let confidence = if markers.is_empty() {
            0.0
        } else {
            markers.iter().map(|m| m.confidence).sum::<f64>() / markers.len() as f64
        };
        let is_swiss_german = markers.len() >= self.min_matches && confidence >= self.min_confidence;

        debug!(
            is_swiss_german,
            confidence,
            match_count = markers.len(),
            "Swiss German detection completed"
        );

        DialectResult {
            is_swiss_german,
            confidence,
            markers,
        }
    }

    fn extract_medical_terms(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut terms: Vec<String> = Vec::new();
        for found in MEDICAL_REGEX.find_iter(&lowered) {
            if !terms.iter().any(|t| t == found.as_str()) {
                terms.push(found.as_str().to_string());
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_swiss_german() {
        let result = SwissGermanDetector::default().detect("Grüezi, ich bi hüt im Spital gsi.");

        assert!(result.is_swiss_german);
        let words: Vec<&str> = result.markers.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(words, vec!["grüezi", "spital", "gsi"]);
        assert_eq!(result.markers[0].standard_german, "guten tag");
        assert_eq!((result.markers[1].start, result.markers[1].end), (22, 28));
    }

    #[test]
    fn test_single_marker_is_not_enough() {
        let result = SwissGermanDetector::default().detect("Merci für die Befunde.");
        assert!(!result.is_swiss_german);
        assert_eq!(result.markers.len(), 1);
    }

    #[test]
    fn test_standard_german_has_no_markers() {
        let result = SwissGermanDetector::default().detect("Der Patient klagt über Kopfschmerzen.");
        assert!(!result.is_swiss_german);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_whole_words_only() {
        let result = SwissGermanDetector::default().detect("Veloziraptor und Parathormon");
        assert!(result.markers.is_empty());
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let detector = SwissGermanDetector::new(&DialectConfig {
            enabled: true,
            min_confidence: 0.9,
            min_matches: 2,
        });
        // merci 0.8 + beige 0.7
        assert!(!detector.detect("merci, beige").is_swiss_german);
        assert!(detector.detect("grüezi, chuchichäschtli").is_swiss_german);
    }

    #[test]
    fn test_extract_medical_terms_deduplicates() {
        let terms = SwissGermanDetector::default()
            .extract_medical_terms("Fieber seit gestern, Fieber und Halsweh, Termin beim Doktor");
        assert_eq!(terms, vec!["fieber", "halsweh", "doktor"]);
    }
}
