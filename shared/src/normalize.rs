//! Normalization of vision model replies into [`DiseaseAnalysisResult`]
//!
//! The model is asked for a single JSON object but may wrap it in prose or
//! markdown fences, leave fields out, or drift outside the vocabularies. A
//! reply that cannot be read at all becomes an `invalid_image` result; a
//! reply that can be read is coerced field by field.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::models::{default_treatment, DiseaseAnalysisResult, DiseaseType, Severity};

const EMPTY_REPLY_SYMPTOM: &str = "The analysis service returned an empty reply";
const EMPTY_REPLY_CAUSE: &str = "The model produced no output for this image";
const UNPARSEABLE_SYMPTOM: &str = "The analysis reply could not be interpreted";
const UNPARSEABLE_CAUSE: &str = "The model did not return a valid JSON diagnosis";
const UNRECOGNIZED_CATEGORY: &str = "The model did not return a recognized disease category";

/// Balanced `{...}` span opening at the start of `text`, which must begin
/// with `{`. Braces inside JSON string literals are skipped.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Locate the first balanced `{...}` span in `text`.
///
/// An opening brace that is never closed is skipped and the scan resumes at
/// the next `{`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(rel) = text[from..].find('{') {
        let start = from + rel;
        if let Some(span) = balanced_span(&text[start..]) {
            return Some(span);
        }
        from = start + 1;
    }
    None
}

/// First balanced span in `text` that parses as a JSON object.
///
/// Balanced spans that are not JSON, such as `{placeholder}` prose, are
/// stepped over as a whole so nested fragments are never picked up.
fn find_object(text: &str) -> Option<Map<String, Value>> {
    let mut from = 0;
    while let Some(rel) = text[from..].find('{') {
        let start = from + rel;
        match balanced_span(&text[start..]) {
            Some(span) => {
                if let Some(map) = parse_object(span) {
                    return Some(map);
                }
                from = start + span.len();
            }
            None => from = start + 1,
        }
    }
    None
}

/// Drop commas that directly precede `}` or `]` outside string literals
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            continue;
        }

        if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        if ch == '"' {
            in_string = true;
        }
        out.push(ch);
    }

    out
}

fn parse_object(span: &str) -> Option<Map<String, Value>> {
    let value = serde_json::from_str::<Value>(span)
        .ok()
        .or_else(|| serde_json::from_str::<Value>(&strip_trailing_commas(span)).ok())?;

    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn read_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn read_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    match map.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().to_ascii_lowercase().parse().ok(),
        _ => None,
    }
}

fn read_confidence(map: &Map<String, Value>) -> f64 {
    let raw = match map.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    raw.filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

fn read_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn reconcile_severity(disease_type: DiseaseType, reported: Option<Severity>) -> Severity {
    match disease_type {
        DiseaseType::Healthy => Severity::None,
        DiseaseType::InvalidImage => Severity::Unknown,
        _ => match reported {
            Some(s @ (Severity::Mild | Severity::Moderate | Severity::Severe)) => s,
            _ => Severity::Moderate,
        },
    }
}

fn normalize_fields(map: &Map<String, Value>, now: DateTime<Utc>) -> DiseaseAnalysisResult {
    let reported_type = read_string(map, "disease_type").and_then(|s| DiseaseType::parse_lenient(&s));
    let disease_type = reported_type.unwrap_or(match read_bool(map, "disease_detected") {
        Some(false) => DiseaseType::Healthy,
        _ => DiseaseType::InvalidImage,
    });
    let disease_detected = disease_type.is_disease();

    let severity = reconcile_severity(
        disease_type,
        read_string(map, "severity").and_then(|s| Severity::parse_lenient(&s)),
    );

    let confidence = if disease_type == DiseaseType::InvalidImage {
        0.0
    } else {
        read_confidence(map)
    };

    let disease_name = if disease_detected {
        read_string(map, "disease_name")
    } else {
        None
    };

    let (mut symptoms, possible_causes) = if disease_type == DiseaseType::Healthy {
        (Vec::new(), Vec::new())
    } else {
        (read_list(map, "symptoms"), read_list(map, "possible_causes"))
    };
    if reported_type.is_none() && disease_type == DiseaseType::InvalidImage && symptoms.is_empty() {
        symptoms.push(UNRECOGNIZED_CATEGORY.to_string());
    }

    let mut treatment = read_list(map, "treatment");
    if treatment.is_empty() {
        treatment = default_treatment(disease_type);
    }

    DiseaseAnalysisResult {
        disease_detected,
        disease_name,
        disease_type,
        severity,
        confidence,
        symptoms,
        possible_causes,
        treatment,
        analysis_timestamp: now,
    }
}

/// Turn a raw model reply into a result stamped with `now`.
///
/// Never fails: unusable replies come back as an `invalid_image` result
/// carrying a symptom and cause that describe what went wrong.
pub fn normalize_reply(reply: &str, now: DateTime<Utc>) -> DiseaseAnalysisResult {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return DiseaseAnalysisResult::degraded(EMPTY_REPLY_SYMPTOM, EMPTY_REPLY_CAUSE, now);
    }

    match find_object(trimmed) {
        Some(map) => normalize_fields(&map, now),
        None => DiseaseAnalysisResult::degraded(UNPARSEABLE_SYMPTOM, UNPARSEABLE_CAUSE, now),
    }
}
