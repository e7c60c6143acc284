//! Instruction prompt sent alongside every leaf image

use shared::{DiseaseType, Severity};

fn quoted_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("\"{}\"", item))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the fixed instruction for the vision model.
///
/// The vocabularies are generated from the enums so the prompt and the
/// normalizer can never disagree.
pub fn build_instruction_prompt() -> String {
    let categories = quoted_list(&DiseaseType::ALL);
    let diseases: Vec<DiseaseType> =
        DiseaseType::ALL.into_iter().filter(|t| t.is_disease()).collect();
    let severities = quoted_list(&Severity::ALL);

    format!(
        r#"You are an expert plant pathologist. Examine the attached image and diagnose the plant leaf it shows.

Respond with a single JSON object and nothing else: no markdown, no code fences, no commentary.

The JSON object must have exactly these fields:
{{
  "disease_detected": boolean, true only when disease_type is one of {disease_categories},
  "disease_name": string naming the disease, or null when no disease is detected,
  "disease_type": one of {categories},
  "severity": one of {severities},
  "confidence": number from 0 to 100,
  "symptoms": array of strings describing visible symptoms,
  "possible_causes": array of strings listing likely causes,
  "treatment": array of strings with recommended treatments
}}

Rules:
- If the image does not show a plant leaf, use "disease_type": "invalid_image", "severity": "unknown", "confidence": 0, and explain in "symptoms" what the image shows instead.
- If the leaf is healthy, use "disease_type": "healthy", "severity": "none", empty "symptoms" and "possible_causes", and give general care advice in "treatment".
- For a diseased leaf, "severity" must be "mild", "moderate" or "severe".
- Use only the values listed above for "disease_type" and "severity"."#,
        disease_categories = quoted_list(&diseases),
        categories = categories,
        severities = severities,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_category_and_severity() {
        let prompt = build_instruction_prompt();
        for ty in DiseaseType::ALL {
            assert!(prompt.contains(&format!("\"{}\"", ty)), "missing {}", ty);
        }
        for severity in Severity::ALL {
            assert!(prompt.contains(&format!("\"{}\"", severity)), "missing {}", severity);
        }
    }

    #[test]
    fn test_prompt_names_every_field() {
        let prompt = build_instruction_prompt();
        for field in [
            "disease_detected",
            "disease_name",
            "disease_type",
            "severity",
            "confidence",
            "symptoms",
            "possible_causes",
            "treatment",
        ] {
            assert!(prompt.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
        assert!(!prompt.contains("analysis_timestamp"));
    }
}
