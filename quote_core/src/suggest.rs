//! # Material Suggestions
//!
//! Optional AI assistance: given booth dimensions and an event type,
//! a suggester proposes candidate line items (name, quantity, unit).
//! Candidates are specs only; the store turns them into zero-priced
//! items the estimator can then price by hand.
//!
//! The contract is single attempt, report-or-drop: a suggester either
//! returns candidates or fails, and a failure adds nothing to the
//! project. Callers map failures to an empty candidate list rather
//! than blocking the estimating flow.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::project::Dimensions;
//! use quote_core::suggest::{CandidateItem, MaterialSuggester, StaticSuggester};
//!
//! let suggester = StaticSuggester::new(vec![CandidateItem {
//!     name: "Banner Frontlit".to_string(),
//!     quantity: 9.0,
//!     unit: "m2".to_string(),
//!     reason: None,
//! }]);
//! let candidates = suggester
//!     .suggest(&Dimensions::default(), "Exhibition Booth")
//!     .unwrap();
//! assert_eq!(candidates.len(), 1);
//! ```

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::{EstimateError, EstimateResult};
use crate::project::Dimensions;

/// Event type passed when suggesting from the estimator
pub const DEFAULT_EVENT_TYPE: &str = "Exhibition Booth";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One suggested line-item spec. `reason` is advisory text and never
/// enters the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Capability seam for suggestion providers.
pub trait MaterialSuggester {
    /// Propose candidate items for a booth of the given dimensions.
    fn suggest(
        &self,
        dimensions: &Dimensions,
        event_type: &str,
    ) -> EstimateResult<Vec<CandidateItem>>;
}

/// Gemini-backed suggester over the REST generateContent endpoint.
///
/// The request pins a JSON response schema so the reply parses
/// directly into candidate items. Every failure class (network, API
/// status, malformed payload) surfaces as
/// `EstimateError::SuggestionFailed`.
pub struct GeminiSuggester {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiSuggester {
    pub fn new(api_key: impl Into<String>) -> Self {
        GeminiSuggester {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl MaterialSuggester for GeminiSuggester {
    fn suggest(
        &self,
        dimensions: &Dimensions,
        event_type: &str,
    ) -> EstimateResult<Vec<CandidateItem>> {
        let prompt = build_prompt(dimensions, event_type);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": {
                                "type": "STRING",
                                "description": "The name of the material."
                            },
                            "quantity": {
                                "type": "NUMBER",
                                "description": "The suggested quantity."
                            },
                            "unit": {
                                "type": "STRING",
                                "description": "The unit of measurement (e.g., m2, Sheet, Pcs)."
                            },
                            "reason": {
                                "type": "STRING",
                                "description": "Brief reason for selecting this material."
                            }
                        },
                        "required": ["name", "quantity", "unit"]
                    }
                }
            }
        });

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| EstimateError::suggestion_failed(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EstimateError::suggestion_failed(format!(
                "API returned status {}",
                status
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .map_err(|e| EstimateError::suggestion_failed(format!("Unreadable response: {}", e)))?;

        match payload.first_text() {
            Some(text) => parse_candidates(&text),
            None => Ok(Vec::new()),
        }
    }
}

/// Fixed-list suggester for tests and offline runs.
pub struct StaticSuggester {
    candidates: Vec<CandidateItem>,
}

impl StaticSuggester {
    pub fn new(candidates: Vec<CandidateItem>) -> Self {
        StaticSuggester { candidates }
    }
}

impl MaterialSuggester for StaticSuggester {
    fn suggest(
        &self,
        _dimensions: &Dimensions,
        _event_type: &str,
    ) -> EstimateResult<Vec<CandidateItem>> {
        Ok(self.candidates.clone())
    }
}

fn build_prompt(dimensions: &Dimensions, event_type: &str) -> String {
    format!(
        "Suggest a list of materials for an exhibition booth with dimensions:\n\
         Length: {}m, Width: {}m, Height: {}m.\n\
         Event Type: {}\n\
         Target Market: Egypt (Local materials like MDF, Muski, Banner, Vinyl).\n\
         Format the output as a structured list with quantities.",
        dimensions.l, dimensions.w, dimensions.h, event_type
    )
}

/// Parse the schema-constrained reply text. Anything other than a JSON
/// array of candidate objects is a failure.
fn parse_candidates(text: &str) -> EstimateResult<Vec<CandidateItem>> {
    serde_json::from_str(text)
        .map_err(|e| EstimateError::suggestion_failed(format!("Malformed candidate list: {}", e)))
}

// === Gemini response envelope ===

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_dimensions_and_market() {
        let dims = Dimensions { l: 6.0, w: 3.0, h: 2.5 };
        let prompt = build_prompt(&dims, "Trade Fair");

        assert!(prompt.contains("Length: 6m, Width: 3m, Height: 2.5m."));
        assert!(prompt.contains("Event Type: Trade Fair"));
        assert!(prompt.contains("Egypt"));
    }

    #[test]
    fn test_parse_candidates() {
        let text = r#"[
            {"name": "MDF 18mm", "quantity": 6, "unit": "Sheet", "reason": "Back wall"},
            {"name": "LED Strip", "quantity": 12, "unit": "m"}
        ]"#;

        let candidates = parse_candidates(text).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "MDF 18mm");
        assert_eq!(candidates[0].quantity, 6.0);
        assert_eq!(candidates[0].reason.as_deref(), Some("Back wall"));
        assert!(candidates[1].reason.is_none());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_candidates("{\"name\": \"MDF\"}").is_err());
        assert!(parse_candidates("not json").is_err());

        let err = parse_candidates("not json").unwrap_err();
        assert_eq!(err.error_code(), "SUGGESTION_FAILED");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_parse_empty_array() {
        assert_eq!(parse_candidates("[]").unwrap(), Vec::new());
    }

    #[test]
    fn test_response_envelope_text_extraction() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "[]" } ] } }
            ]
        }"#;
        let payload: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.first_text().as_deref(), Some("[]"));

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.first_text().is_none());
    }

    #[test]
    fn test_static_suggester() {
        let suggester = StaticSuggester::new(vec![CandidateItem {
            name: "Vinyl Sticker".to_string(),
            quantity: 4.0,
            unit: "m2".to_string(),
            reason: None,
        }]);

        let candidates = suggester
            .suggest(&Dimensions::default(), DEFAULT_EVENT_TYPE)
            .unwrap();
        assert_eq!(candidates[0].name, "Vinyl Sticker");
    }
}
