//! ICP System Prompt
//!
//! Renders an ICP definition into the instructions of its remote assistant.
//! Pure: equal input always yields byte-identical output, which is what makes
//! "did the prompt change" comparisons meaningful.

use crate::models::icp::{CustomParameter, ScoringType, DEFAULT_SCORING_MAX, DEFAULT_SCORING_MIN};

const ROLE_PREAMBLE: &str = "You are an AI assistant specialized in analyzing companies based on an Ideal Customer Profile (ICP).
Your goal is to determine how well a given company fits this ICP and provide a score and reasoning.
";

const PARAMETERS_INTRO: &str = "
You must evaluate the company against the following custom parameters and provide a specific output for each:
";

const OUTPUT_FORMAT_INSTRUCTIONS: &str = r#"
For each company analysis, you MUST provide the following outputs in a structured JSON format:
1.  "overall_score": An integer score from 1 to 100, where 100 is a perfect match for the ICP.
2.  "overall_reasoning": A concise explanation for the overall_score, highlighting key factors.
3.  "custom_parameter_outputs": An object where each key is the "parameterName" (exact match) from the custom parameters list, and the value is your assessment for that parameter according to its defined 'scoringType' and range (if applicable).

Example for a custom parameter named "Cloud Adoption Level" with type "Score Range" (1-5):
"custom_parameter_outputs": {
"Cloud Adoption Level": 3 // Or your assessed score
}

Example for a custom parameter named "Primary Industry" with type "String":
"custom_parameter_outputs": {
"Primary Industry": "Healthcare Technology" // Or your assessed string
}

Example for a custom parameter named "Uses CRM" with type "Binary":
"custom_parameter_outputs": {
"Uses CRM": true // Or false
}

Example for a custom parameter named "Employee Count" with type "Number":
"custom_parameter_outputs": {
"Employee Count": 250 // Or your assessed number
}

Focus your analysis solely on the provided ICP criteria. Be objective and thorough.
If information for a specific parameter is not readily available or cannot be reasonably inferred for the company being analyzed, explicitly state that for that parameter's output (e.g., "Information not available"). Do not invent data.
"#;

/// The type-specific clause appended to a parameter line
fn scoring_clause(param: &CustomParameter) -> String {
    match param.scoring_type {
        ScoringType::ScoreRange => format!(
            "Score between {} and {}",
            param.scoring_min.unwrap_or(DEFAULT_SCORING_MIN),
            param.scoring_max.unwrap_or(DEFAULT_SCORING_MAX)
        ),
        ScoringType::Number => "Expect a numerical value".to_string(),
        ScoringType::Text => "Expect a descriptive string".to_string(),
        ScoringType::Binary => "Expect Yes/No or True/False".to_string(),
    }
}

/// `- {name}: {description} ({clause})`
pub fn format_parameter_line(param: &CustomParameter) -> String {
    format!(
        "- {}: {} ({})",
        param.parameter_name,
        param.parameter_description,
        scoring_clause(param)
    )
}

/// Render the assistant instructions for an ICP
pub fn generate_icp_system_prompt(
    name: &str,
    description: &str,
    parameters: &[CustomParameter],
) -> String {
    let parameter_lines = parameters
        .iter()
        .map(format_parameter_line)
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = String::with_capacity(
        ROLE_PREAMBLE.len() + PARAMETERS_INTRO.len() + OUTPUT_FORMAT_INSTRUCTIONS.len() + 256,
    );
    prompt.push_str(ROLE_PREAMBLE);
    prompt.push('\n');
    prompt.push_str(&format!("ICP Name: {}\n", name));
    prompt.push_str(&format!("ICP Description: {}\n", description));
    prompt.push_str(PARAMETERS_INTRO);
    prompt.push_str(&parameter_lines);
    prompt.push('\n');
    prompt.push_str(OUTPUT_FORMAT_INSTRUCTIONS);
    prompt
}
