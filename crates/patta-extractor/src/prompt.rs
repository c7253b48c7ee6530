//! Prompt template for claim-form extraction

/// Field keys the model is asked to fill, in prompt order
pub const FIELD_VOCABULARY: [(&str, &str); 11] = [
    ("claimant_name", "Name of the person making the claim"),
    ("spouse_name", "Name of spouse (if mentioned)"),
    ("father_mother_name", "Name of father or mother"),
    ("address", "Physical address"),
    ("village", "Village name"),
    ("gram_panchayat", "Gram Panchayat name"),
    ("tehsil_taluka", "Tehsil or Taluka name"),
    ("district", "District name (if mentioned)"),
    ("state", "State name (if mentioned)"),
    ("claim_type", "\"individual\" or \"community\" (infer from context)"),
    (
        "area",
        "Land area exactly as written, including units and every listed sub-area",
    ),
];

/// Builds the single user message sent to the extraction model
pub struct PromptBuilder {
    text: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\nRequired fields to extract:\n");
        for (key, description) in FIELD_VOCABULARY {
            prompt.push_str(&format!("- {}: {}\n", key, description));
        }

        prompt.push_str("\nText to process:\n---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = "Extract the following information from this Forest Rights Act claim form text and return it as a JSON object.";

const OUTPUT_FORMAT_REMINDER: &str = r#"Return only a valid JSON object with the extracted data. Use null for fields not found.
Do not convert or add up land areas; copy the area text as it appears.
Example format:
{
  "claimant_name": "Karan Singh",
  "spouse_name": "Priya Singh",
  "father_mother_name": "Baldev Singh",
  "address": "Plot 56, Hilltop",
  "village": "Devpur",
  "gram_panchayat": "Devpur GP",
  "tehsil_taluka": "Shahdol",
  "district": null,
  "state": null,
  "claim_type": "individual",
  "area": "0.4 ha (habitation), 1.3 ha (self-cultivation)"
}"#;
