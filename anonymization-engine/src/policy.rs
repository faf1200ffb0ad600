use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::entity::EntityType;
use crate::error::{AnonymizationError, AnonymizationResult};

/// Key of the fallback token in a replacement table
pub const DEFAULT_TOKEN_KEY: &str = "DEFAULT";

/// Default replacement tokens (German, matching the clinical UI)
pub fn default_replacement_tokens() -> BTreeMap<String, String> {
    [
        ("PERSON", "[PERSON]"),
        ("LOCATION", "[ORT]"),
        ("DATE_TIME", "[DATUM]"),
        ("PHONE_NUMBER", "[TELEFON]"),
        ("EMAIL_ADDRESS", "[EMAIL]"),
        ("MEDICAL_LICENSE", "[ARZT-ID]"),
        ("SWISS_AHV", "[AHV-NUMMER]"),
        ("SWISS_INSURANCE", "[VERSICHERUNG]"),
        ("MEDICAL_RECORD", "[PATIENTENAKTE]"),
        (DEFAULT_TOKEN_KEY, "[VERTRAULICH]"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Per-type replacement token lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementPolicy {
    tokens: HashMap<EntityType, String>,
    default_token: String,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        // The built-in table is well formed, building from it cannot fail.
        Self::from_table(&default_replacement_tokens()).unwrap_or_else(|_| Self {
            tokens: HashMap::new(),
            default_token: "[VERTRAULICH]".to_string(),
        })
    }
}

impl ReplacementPolicy {
    /// Build a policy from a label → token table.
    ///
    /// Labels are matched case-insensitively against [`EntityType`] labels;
    /// `DEFAULT` sets the fallback token. Unknown labels and empty tokens are
    /// rejected so a typo cannot silently route a type to the fallback.
    pub fn from_table(table: &BTreeMap<String, String>) -> AnonymizationResult<Self> {
        let mut tokens = HashMap::new();
        let mut default_token = None;

        for (label, token) in table {
            if token.trim().is_empty() {
                return Err(AnonymizationError::InvalidConfig(format!(
                    "Replacement token for {} is empty",
                    label
                )));
            }

            if label.trim().eq_ignore_ascii_case(DEFAULT_TOKEN_KEY) {
                default_token = Some(token.clone());
                continue;
            }

            let entity_type = EntityType::from_label(label);
            if entity_type == EntityType::Other && !label.trim().eq_ignore_ascii_case("OTHER") {
                return Err(AnonymizationError::InvalidConfig(format!(
                    "Unknown entity type in replacement table: {}",
                    label
                )));
            }
            tokens.insert(entity_type, token.clone());
        }

        Ok(Self {
            tokens,
            default_token: default_token.unwrap_or_else(|| "[VERTRAULICH]".to_string()),
        })
    }

    /// Overlay `overrides` on top of the default table
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> AnonymizationResult<Self> {
        let mut table = default_replacement_tokens();
        for (label, token) in overrides {
            table.insert(label.trim().to_uppercase(), token.clone());
        }
        Self::from_table(&table)
    }

    pub fn token_for(&self, entity_type: EntityType) -> &str {
        self.tokens
            .get(&entity_type)
            .map(String::as_str)
            .unwrap_or(&self.default_token)
    }

    pub fn default_token(&self) -> &str {
        &self.default_token
    }

    /// Every token this policy can emit
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .values()
            .map(String::as_str)
            .chain(std::iter::once(self.default_token.as_str()))
    }
}
