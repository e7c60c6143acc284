//! Disease analysis result model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Leaf disease category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseType {
    Fungal,
    Bacterial,
    Viral,
    Pest,
    NutrientDeficiency,
    Healthy,
    InvalidImage,
}

impl DiseaseType {
    pub const ALL: [DiseaseType; 7] = [
        DiseaseType::Fungal,
        DiseaseType::Bacterial,
        DiseaseType::Viral,
        DiseaseType::Pest,
        DiseaseType::NutrientDeficiency,
        DiseaseType::Healthy,
        DiseaseType::InvalidImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseType::Fungal => "fungal",
            DiseaseType::Bacterial => "bacterial",
            DiseaseType::Viral => "viral",
            DiseaseType::Pest => "pest",
            DiseaseType::NutrientDeficiency => "nutrient_deficiency",
            DiseaseType::Healthy => "healthy",
            DiseaseType::InvalidImage => "invalid_image",
        }
    }

    /// True for the five categories that describe an actual disease
    pub fn is_disease(&self) -> bool {
        !matches!(self, DiseaseType::Healthy | DiseaseType::InvalidImage)
    }

    /// Parse a category the way a language model tends to write it.
    ///
    /// Case, surrounding whitespace, hyphens and spaces are ignored, and a
    /// handful of common synonyms ("fungus", "insect", "not a leaf") are
    /// mapped onto the closed vocabulary.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let key = vocabulary_key(value);
        let parsed = match key.as_str() {
            "fungal" | "fungus" | "fungi" => DiseaseType::Fungal,
            "bacterial" | "bacteria" | "bacterium" => DiseaseType::Bacterial,
            "viral" | "virus" => DiseaseType::Viral,
            "pest" | "pests" | "insect" | "insects" | "pest_damage" => DiseaseType::Pest,
            "nutrient_deficiency" | "nutrient" | "nutritional_deficiency" | "deficiency"
            | "nutrient_deficient" => DiseaseType::NutrientDeficiency,
            "healthy" | "none" | "no_disease" => DiseaseType::Healthy,
            "invalid_image" | "invalid" | "not_a_leaf" | "non_leaf" => DiseaseType::InvalidImage,
            _ => return None,
        };
        Some(parsed)
    }
}

impl std::fmt::Display for DiseaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse impact level of a detected disease
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    None,
    Unknown,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
        Severity::None,
        Severity::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::None => "none",
            Severity::Unknown => "unknown",
        }
    }

    pub fn parse_lenient(value: &str) -> Option<Self> {
        let key = vocabulary_key(value);
        let parsed = match key.as_str() {
            "mild" | "low" | "minor" | "light" => Severity::Mild,
            "moderate" | "medium" | "mid" => Severity::Moderate,
            "severe" | "high" | "critical" | "serious" | "heavy" => Severity::Severe,
            "none" | "no" | "n/a" | "na" => Severity::None,
            "unknown" | "undetermined" => Severity::Unknown,
            _ => return None,
        };
        Some(parsed)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn vocabulary_key(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(['-', ' '], "_")
}

/// Diagnosis returned for one uploaded leaf image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseAnalysisResult {
    pub disease_detected: bool,
    pub disease_name: Option<String>,
    pub disease_type: DiseaseType,
    pub severity: Severity,
    /// Confidence percentage (0-100)
    pub confidence: f64,
    pub symptoms: Vec<String>,
    pub possible_causes: Vec<String>,
    pub treatment: Vec<String>,
    #[serde(with = "utc_offset_timestamp")]
    pub analysis_timestamp: DateTime<Utc>,
}

impl DiseaseAnalysisResult {
    /// Result used when the model reply cannot be turned into a diagnosis
    pub fn degraded(reason: impl Into<String>, cause: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            disease_detected: false,
            disease_name: None,
            disease_type: DiseaseType::InvalidImage,
            severity: Severity::Unknown,
            confidence: 0.0,
            symptoms: vec![reason.into()],
            possible_causes: vec![cause.into()],
            treatment: default_treatment(DiseaseType::InvalidImage),
            analysis_timestamp: now,
        }
    }

    /// Check the cross-field rules every record handed to a caller satisfies
    pub fn is_consistent(&self) -> bool {
        let ty = self.disease_type;
        let severity_ok = match ty {
            DiseaseType::Healthy => self.severity == Severity::None,
            DiseaseType::InvalidImage => self.severity == Severity::Unknown,
            _ => !matches!(self.severity, Severity::None | Severity::Unknown),
        };

        self.disease_detected == ty.is_disease()
            && (self.disease_detected || self.disease_name.is_none())
            && severity_ok
            && (0.0..=100.0).contains(&self.confidence)
            && (ty != DiseaseType::InvalidImage || self.confidence == 0.0)
            && (ty != DiseaseType::Healthy
                || (self.symptoms.is_empty() && self.possible_causes.is_empty()))
            && !self.treatment.is_empty()
    }
}

/// Guidance used when the model leaves the treatment list empty
pub fn default_treatment(disease_type: DiseaseType) -> Vec<String> {
    let lines: &[&str] = match disease_type {
        DiseaseType::Healthy => &[
            "Continue regular watering, avoiding water on the leaves",
            "Keep a balanced fertilization schedule",
            "Inspect leaves weekly for early signs of disease or pests",
        ],
        DiseaseType::InvalidImage => &[
            "Upload a clear, well-lit photo of a single plant leaf",
        ],
        _ => &[
            "Remove and dispose of affected leaves",
            "Consult a local agricultural extension service for a treatment plan",
        ],
    };
    lines.iter().map(|s| s.to_string()).collect()
}

/// RFC 3339 timestamps written with an explicit `+00:00` offset
mod utc_offset_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_disease_type_synonyms() {
        assert_eq!(DiseaseType::parse_lenient("Fungus"), Some(DiseaseType::Fungal));
        assert_eq!(
            DiseaseType::parse_lenient(" nutrient-deficiency "),
            Some(DiseaseType::NutrientDeficiency)
        );
        assert_eq!(
            DiseaseType::parse_lenient("Invalid Image"),
            Some(DiseaseType::InvalidImage)
        );
        assert_eq!(DiseaseType::parse_lenient("fungal infection"), None);
    }

    #[test]
    fn test_severity_synonyms() {
        assert_eq!(Severity::parse_lenient("HIGH"), Some(Severity::Severe));
        assert_eq!(Severity::parse_lenient("medium"), Some(Severity::Moderate));
        assert_eq!(Severity::parse_lenient("low"), Some(Severity::Mild));
        assert_eq!(Severity::parse_lenient("extreme-ish"), None);
    }

    #[test]
    fn test_is_disease() {
        let diseases: Vec<_> = DiseaseType::ALL.iter().filter(|t| t.is_disease()).collect();
        assert_eq!(diseases.len(), 5);
        assert!(!DiseaseType::Healthy.is_disease());
        assert!(!DiseaseType::InvalidImage.is_disease());
    }

    #[test]
    fn test_serialized_field_order_and_names() {
        let result = DiseaseAnalysisResult::degraded("empty", "no output", fixed_now());
        let json = serde_json::to_string(&result).unwrap();

        let fields = [
            "disease_detected",
            "disease_name",
            "disease_type",
            "severity",
            "confidence",
            "symptoms",
            "possible_causes",
            "treatment",
            "analysis_timestamp",
        ];
        let positions: Vec<usize> = fields
            .iter()
            .map(|f| json.find(&format!("\"{}\"", f)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains("\"disease_type\":\"invalid_image\""));
        assert!(json.contains("\"analysis_timestamp\":\"2025-03-14T09:26:53.000000+00:00\""));
    }

    #[test]
    fn test_round_trip() {
        let result = DiseaseAnalysisResult {
            disease_detected: true,
            disease_name: Some("Early Blight".to_string()),
            disease_type: DiseaseType::Fungal,
            severity: Severity::Moderate,
            confidence: 92.5,
            symptoms: vec!["Concentric brown rings".to_string()],
            possible_causes: vec!["Alternaria solani".to_string()],
            treatment: vec!["Apply copper fungicide".to_string()],
            analysis_timestamp: fixed_now(),
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: DiseaseAnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_degraded_is_consistent() {
        let result = DiseaseAnalysisResult::degraded("reason", "cause", fixed_now());
        assert!(result.is_consistent());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.severity, Severity::Unknown);
    }

    #[test]
    fn test_default_treatment_never_empty() {
        for ty in DiseaseType::ALL {
            assert!(!default_treatment(ty).is_empty());
        }
    }
}
