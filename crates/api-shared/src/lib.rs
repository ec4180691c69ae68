//! # API Shared
//!
//! Shared request and response types for the Health Companion APIs.
//!
//! Contains:
//! - Request/response structs with OpenAPI schemas (`utoipa::ToSchema`)
//! - Conversions from core results into response bodies
//! - Form value coercion for the lipid panel form
//! - The shared `HealthService`

pub mod health;

pub use health::HealthService;

use hc_core::extraction::ExtractionMethod;
use hc_core::lipid::{AnalyteBand, ReferenceRange};
use hc_core::{LabPanel, PatientHistory, PredictionResult, RiskAssessment};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    pub llm_configured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SymptomListRes {
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictDiseaseReq {
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictDiseaseRes {
    pub prediction: String,
    pub confidence: u8,
    pub symptoms: Vec<String>,
    pub disclaimer: Option<String>,
}

impl PredictDiseaseRes {
    pub fn new(result: &PredictionResult, symptoms: Vec<String>) -> Self {
        Self {
            prediction: result.prediction.label().to_string(),
            confidence: result.confidence,
            symptoms,
            disclaimer: result.disclaimer().map(str::to_string),
        }
    }
}

/// Lipid panel form fields as submitted.
///
/// Values stay strings so that missing or malformed input can be coerced instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LipidForm {
    #[serde(default)]
    pub total_cholesterol: Option<String>,
    #[serde(default)]
    pub hdl_cholesterol: Option<String>,
    #[serde(default)]
    pub ldl_cholesterol: Option<String>,
    #[serde(default)]
    pub triglycerides: Option<String>,
}

/// Parse a form value, treating missing, blank or unparseable input as `0.0`.
pub fn coerce_lab_value(field: &str, value: Option<&str>) -> f64 {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return 0.0;
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            tracing::warn!(field, value = raw, "unparseable lab value, using 0");
            0.0
        }
    }
}

impl LipidForm {
    pub fn panel(&self) -> LabPanel {
        LabPanel::new(
            coerce_lab_value("total_cholesterol", self.total_cholesterol.as_deref()),
            coerce_lab_value("hdl_cholesterol", self.hdl_cholesterol.as_deref()),
            coerce_lab_value("ldl_cholesterol", self.ldl_cholesterol.as_deref()),
            coerce_lab_value("triglycerides", self.triglycerides.as_deref()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LipidAnalysisRes {
    pub result: String,
    pub risk_level: String,
    pub total_cholesterol_status: String,
    pub hdl_status: String,
    pub ldl_status: String,
    pub triglycerides_status: String,
    pub recommendations: Vec<String>,
    pub total_cholesterol: f64,
    pub hdl_cholesterol: f64,
    pub ldl_cholesterol: f64,
    pub triglycerides: f64,
}

impl LipidAnalysisRes {
    pub fn new(panel: &LabPanel, assessment: RiskAssessment) -> Self {
        Self {
            result: assessment.result_text,
            risk_level: assessment.risk_level.label().to_string(),
            total_cholesterol_status: assessment.total_cholesterol.label().to_string(),
            hdl_status: assessment.hdl.label().to_string(),
            ldl_status: assessment.ldl.label().to_string(),
            triglycerides_status: assessment.triglycerides.label().to_string(),
            recommendations: assessment.recommendations,
            total_cholesterol: panel.total_cholesterol,
            hdl_cholesterol: panel.hdl,
            ldl_cholesterol: panel.ldl,
            triglycerides: panel.triglycerides,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferenceBandDto {
    pub status: String,
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferenceRangeDto {
    pub analyte: String,
    pub unit: String,
    pub bands: Vec<ReferenceBandDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LipidReferenceRes {
    pub analytes: Vec<ReferenceRangeDto>,
}

impl From<Vec<ReferenceRange>> for LipidReferenceRes {
    fn from(ranges: Vec<ReferenceRange>) -> Self {
        Self {
            analytes: ranges
                .into_iter()
                .map(|r| ReferenceRangeDto {
                    analyte: r.analyte.to_string(),
                    unit: r.unit.to_string(),
                    bands: r
                        .bands
                        .into_iter()
                        .map(|b| ReferenceBandDto {
                            status: b.status.to_string(),
                            range: b.range.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatForm {
    #[serde(default)]
    pub user_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatRes {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SaveNoteReq {
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SaveNoteRes {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListNotesRes {
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMethod {
    #[default]
    Regex,
    Llm,
}

impl From<ExtractMethod> for ExtractionMethod {
    fn from(method: ExtractMethod) -> Self {
        match method {
            ExtractMethod::Regex => ExtractionMethod::Regex,
            ExtractMethod::Llm => ExtractionMethod::Llm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractNoteReq {
    pub note: String,
    #[serde(default)]
    pub method: ExtractMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractNoteRes {
    pub personal_details: String,
    pub chief_complaints: String,
    pub family_history: String,
    pub method: ExtractMethod,
}

impl ExtractNoteRes {
    pub fn new(history: PatientHistory, method: ExtractMethod) -> Self {
        Self {
            personal_details: history.personal_details,
            chief_complaints: history.chief_complaints,
            family_history: history.family_history,
            method,
        }
    }
}
