use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

const DIAGNOSIS_DISCLAIMER: &str = "WICHTIGER HINWEIS: Diese KI-generierten Diagnosevorschläge dienen nur als \
Unterstützung und ersetzen nicht die ärztliche Beurteilung. Alle Vorschläge müssen von medizinischem \
Fachpersonal überprüft und bestätigt werden.";

const MEDICATION_DISCLAIMER: &str = "HINWEIS: Diese Medikamentenliste wurde automatisch extrahiert und muss \
von medizinischem Fachpersonal überprüft werden.";

const GENERIC_DISCLAIMER: &str = "HINWEIS: Diese Informationen wurden automatisch generiert und dienen \
nur als Unterstützung für medizinisches Fachpersonal.";

const BASE_PROMPT: &str = "Du bist ein medizinischer KI-Assistent für Schweizer Ärzte. \
Verwende medizinische Fachbegriffe und halte dich an Schweizer medizinische Standards. \
Deine Antworten müssen präzise, evidenzbasiert und auf Hochdeutsch sein. \
Formatiere deine Antworten klar und strukturiert.";

/// Appended to the system prompt when the input was flagged as Swiss German
pub const SWISS_GERMAN_HINT: &str =
    "Der Text enthält möglicherweise Schweizerdeutsch. Berücksichtige dies bei der Analyse.";

/// Closed set of analyses a provider can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Summarize,
    ExtractSymptoms,
    SuggestDiagnosis,
    ExtractMedications,
    ExtractProcedures,
    GeneralQuery,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 6] = [
        Self::Summarize,
        Self::ExtractSymptoms,
        Self::SuggestDiagnosis,
        Self::ExtractMedications,
        Self::ExtractProcedures,
        Self::GeneralQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::ExtractSymptoms => "extract_symptoms",
            Self::SuggestDiagnosis => "suggest_diagnosis",
            Self::ExtractMedications => "extract_medications",
            Self::ExtractProcedures => "extract_procedures",
            Self::GeneralQuery => "general_query",
        }
    }

    /// Warning attached to every AI-generated result of this type
    pub fn disclaimer(&self) -> &'static str {
        match self {
            Self::SuggestDiagnosis => DIAGNOSIS_DISCLAIMER,
            Self::ExtractMedications => MEDICATION_DISCLAIMER,
            _ => GENERIC_DISCLAIMER,
        }
    }

    pub fn system_prompt(&self) -> String {
        let task = match self {
            Self::Summarize => {
                "Fasse den medizinischen Text zusammen. Strukturiere die Zusammenfassung in: \
                 1. Hauptbeschwerden 2. Relevante Anamnese 3. Wichtige Befunde 4. Empfohlene Maßnahmen"
            }
            Self::ExtractSymptoms => {
                "Extrahiere alle Symptome aus dem Text. Gib für jedes Symptom an: - Beschreibung \
                 - Dauer (falls erwähnt) - Schweregrad (falls erwähnt) \
                 - Zusammenhang mit anderen Symptomen (falls erwähnt)"
            }
            Self::SuggestDiagnosis => {
                "Schlage mögliche Diagnosen basierend auf den beschriebenen Symptomen vor. \
                 WICHTIG: Beginne mit einem deutlichen Hinweis, dass dies nur Vorschläge sind und \
                 eine ärztliche Beurteilung erforderlich ist. Für jede mögliche Diagnose gib an: \
                 - Name der Diagnose - Passende Symptome aus dem Text - Fehlende typische Symptome \
                 - Empfohlene weitere Untersuchungen"
            }
            Self::ExtractMedications => {
                "Extrahiere alle Medikamente aus dem Text. Für jedes Medikament gib an: \
                 - Name (Wirkstoff und Handelsname, falls erwähnt) - Dosierung (falls erwähnt) \
                 - Anwendungszeitraum (falls erwähnt) - Zweck/Indikation (falls erwähnt)"
            }
            Self::ExtractProcedures => {
                "Extrahiere alle medizinischen Verfahren und Untersuchungen aus dem Text. \
                 Für jedes Verfahren gib an: - Name des Verfahrens - Zweck/Indikation (falls erwähnt) \
                 - Ergebnisse (falls erwähnt) - Zeitpunkt (falls erwähnt)"
            }
            Self::GeneralQuery => {
                "Beantworte die medizinische Anfrage basierend auf dem Text. Halte dich strikt an \
                 die Informationen im Text und vermeide Spekulationen. Wenn Informationen fehlen, \
                 weise darauf hin."
            }
        };
        format!("{}\n\n{}", BASE_PROMPT, task)
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ProviderError::InvalidChain(format!("Unknown analysis type: {}", s)))
    }
}

/// Per-request tuning passed through to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Overrides the provider's configured model
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub is_swiss_german: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.1,
            max_tokens: 1000,
            is_swiss_german: false,
        }
    }
}

impl AnalysisOptions {
    /// Minimal request used by availability probes
    pub fn probe() -> Self {
        Self {
            max_tokens: 5,
            ..Self::default()
        }
    }

    /// System prompt for `analysis_type`, with the dialect hint when needed
    pub fn system_prompt(&self, analysis_type: AnalysisType) -> String {
        let mut prompt = analysis_type.system_prompt();
        if self.is_swiss_german {
            prompt.push('\n');
            prompt.push_str(SWISS_GERMAN_HINT);
        }
        prompt
    }
}
