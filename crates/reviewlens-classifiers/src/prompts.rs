//! Prompt templates for the audit and reflexion stages

use reviewlens_core::{encode_label_literal, TaxonomyLabel};
use serde::{Deserialize, Serialize};

/// Prompt wording variant
///
/// Both variants share the same two-stage protocol and JSON contract; they
/// differ only in how much guidance the audit prompt carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    /// Analytical framework only
    #[default]
    Standard,
    /// Analytical framework plus worked examples
    FewShot,
}

impl PromptTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::FewShot => "few_shot",
        }
    }

    /// Stage-1 prompt: audit the review's intent and propose labels
    pub fn audit_prompt(&self, review: &str) -> String {
        let taxonomy = encode_label_literal(TaxonomyLabel::names());
        let examples = match self {
            Self::Standard => "",
            Self::FewShot => FEW_SHOT_EXAMPLES,
        };

        format!(
            r#"You are a Senior Consumer Insights Analyst. Your goal is to map the HUMAN INTENT of a review.

### ANALYTICAL FRAMEWORK:
1. **Sentiment Anchoring**: Identify the overall tone (Positive, Negative, or Mixed).
2. **Intent Audit**: Resolve any ambiguous phrases based on that tone.
3. **Behavioral Mapping**: Look for signals like household sharing or loyalty.

Taxonomy: {taxonomy}
{examples}
### TASK:
Provide an 'Audit' of the intent, then list the factors.
Only use labels from the Taxonomy, spelled exactly as given.
Review: "{review}"

Return ONLY JSON: {{"audit": "Explain intent", "factors": ["Label1"]}}
"#
        )
    }

    /// Stage-2 prompt: keep only labels with direct textual support
    pub fn reflexion_prompt(&self, review: &str, audit: &str, candidates: &[String]) -> String {
        let candidates = encode_label_literal(candidates);
        format!(
            r#"Review: "{review}"
Audit: {audit}
Initial Labels: {candidates}

Task:
- Ensure labels align with the Audit.
- Remove labels that lack explicit semantic support in the Review.
- Do not add labels that were guessed rather than stated.

Return ONLY JSON: {{"factors": ["Label1", "Label2"]}}
"#
        )
    }
}

const FEW_SHOT_EXAMPLES: &str = r#"
### EXAMPLES:
Review: "Smells amazing and my husband keeps stealing it, worth every penny"
{"audit": "Positive. Scent praised, shared in the household, good value.", "factors": ["Fragrance", "Companion Approval", "Price"]}

Review: "Pump broke on day two and the gel is watery"
{"audit": "Negative. Dispenser failed and texture is thin.", "factors": ["Packaging", "Product Texture"]}

Review: "Left my skin soft without drying it out"
{"audit": "Positive. Skin feels better after use without irritation.", "factors": ["Skin Care", "Skin Texture Improvement"]}
"#;
