//! Lipid panel risk classification.
//!
//! Each analyte is bucketed independently against fixed cut points (mg/dL). Every band carries
//! an aggregate risk contribution and at most one recommendation. The overall risk is the
//! highest-ranked contribution across the four analytes.
//!
//! Cut points belong to the higher band: a total cholesterol of exactly 200 is
//! `Borderline High`, an LDL of exactly 190 is `Very High`.

use serde::{Serialize, Serializer};
use std::fmt;

const WELLNESS_RECOMMENDATIONS: [&str; 2] = [
    "Continue maintaining a healthy lifestyle with balanced diet and regular exercise.",
    "Get your lipid profile checked annually.",
];

const EVALUATION_RECOMMENDATION: &str =
    "Schedule a comprehensive cardiovascular evaluation with your healthcare provider.";

/// Aggregate cardiovascular risk, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
            Self::VeryHigh => "Very High Risk",
        }
    }

    /// True when the standing evaluation recommendation applies.
    pub const fn needs_evaluation(self) -> bool {
        matches!(self, Self::High | Self::VeryHigh)
    }
}

/// A severity band for one analyte.
pub trait AnalyteBand: Copy {
    fn label(self) -> &'static str;
    fn risk(self) -> RiskLevel;
    fn recommendation(self) -> Option<&'static str>;
}

macro_rules! display_and_serialize_by_label {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }

            impl Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    serializer.serialize_str(self.label())
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TotalCholesterolStatus {
    Optimal,
    BorderlineHigh,
    High,
}

impl TotalCholesterolStatus {
    pub fn classify(value: f64) -> Self {
        if value < 200.0 {
            Self::Optimal
        } else if value < 240.0 {
            Self::BorderlineHigh
        } else {
            Self::High
        }
    }
}

impl AnalyteBand for TotalCholesterolStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::BorderlineHigh => "Borderline High",
            Self::High => "High",
        }
    }

    fn risk(self) -> RiskLevel {
        match self {
            Self::Optimal => RiskLevel::Low,
            Self::BorderlineHigh => RiskLevel::Moderate,
            Self::High => RiskLevel::High,
        }
    }

    fn recommendation(self) -> Option<&'static str> {
        match self {
            Self::Optimal => None,
            Self::BorderlineHigh => Some("Consider dietary changes to reduce total cholesterol."),
            Self::High => {
                Some("Consult with a healthcare provider about your high total cholesterol.")
            }
        }
    }
}

/// HDL is protective, so severity rises as the value falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HdlStatus {
    Optimal,
    Normal,
    Low,
}

impl HdlStatus {
    pub fn classify(value: f64) -> Self {
        if value >= 60.0 {
            Self::Optimal
        } else if value >= 40.0 {
            Self::Normal
        } else {
            Self::Low
        }
    }
}

impl AnalyteBand for HdlStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal (Protective)",
            Self::Normal => "Normal",
            Self::Low => "Low",
        }
    }

    fn risk(self) -> RiskLevel {
        match self {
            Self::Optimal | Self::Normal => RiskLevel::Low,
            Self::Low => RiskLevel::Moderate,
        }
    }

    fn recommendation(self) -> Option<&'static str> {
        match self {
            Self::Optimal | Self::Normal => None,
            Self::Low => Some("Work on increasing your HDL through exercise and diet."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LdlStatus {
    Optimal,
    NearOptimal,
    BorderlineHigh,
    High,
    VeryHigh,
}

impl LdlStatus {
    pub fn classify(value: f64) -> Self {
        if value < 100.0 {
            Self::Optimal
        } else if value < 130.0 {
            Self::NearOptimal
        } else if value < 160.0 {
            Self::BorderlineHigh
        } else if value < 190.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }
}

impl AnalyteBand for LdlStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::NearOptimal => "Near Optimal",
            Self::BorderlineHigh => "Borderline High",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    fn risk(self) -> RiskLevel {
        match self {
            Self::Optimal | Self::NearOptimal => RiskLevel::Low,
            Self::BorderlineHigh => RiskLevel::Moderate,
            Self::High => RiskLevel::High,
            Self::VeryHigh => RiskLevel::VeryHigh,
        }
    }

    fn recommendation(self) -> Option<&'static str> {
        match self {
            Self::Optimal | Self::NearOptimal => None,
            Self::BorderlineHigh => Some("Consider dietary changes to reduce LDL cholesterol."),
            Self::High => Some("Consult with a healthcare provider about your high LDL cholesterol."),
            Self::VeryHigh => Some(
                "Urgent: Consult with a healthcare provider about your very high LDL cholesterol.",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TriglycerideStatus {
    Normal,
    BorderlineHigh,
    High,
    VeryHigh,
}

impl TriglycerideStatus {
    pub fn classify(value: f64) -> Self {
        if value < 150.0 {
            Self::Normal
        } else if value < 200.0 {
            Self::BorderlineHigh
        } else if value < 500.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }
}

impl AnalyteBand for TriglycerideStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::BorderlineHigh => "Borderline High",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    fn risk(self) -> RiskLevel {
        match self {
            Self::Normal => RiskLevel::Low,
            Self::BorderlineHigh => RiskLevel::Moderate,
            Self::High => RiskLevel::High,
            Self::VeryHigh => RiskLevel::VeryHigh,
        }
    }

    fn recommendation(self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::BorderlineHigh => Some("Consider dietary changes to reduce triglycerides."),
            Self::High => Some("Consult with a healthcare provider about your high triglycerides."),
            Self::VeryHigh => {
                Some("Urgent: Consult with a healthcare provider about your very high triglycerides.")
            }
        }
    }
}

display_and_serialize_by_label!(
    RiskLevel,
    TotalCholesterolStatus,
    HdlStatus,
    LdlStatus,
    TriglycerideStatus
);

/// The four measured lipid values, in mg/dL.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LabPanel {
    pub total_cholesterol: f64,
    pub hdl: f64,
    pub ldl: f64,
    pub triglycerides: f64,
}

/// Result of classifying a [`LabPanel`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub total_cholesterol: TotalCholesterolStatus,
    pub hdl: HdlStatus,
    pub ldl: LdlStatus,
    pub triglycerides: TriglycerideStatus,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
    pub result_text: String,
}

impl LabPanel {
    pub fn new(total_cholesterol: f64, hdl: f64, ldl: f64, triglycerides: f64) -> Self {
        Self {
            total_cholesterol,
            hdl,
            ldl,
            triglycerides,
        }
    }

    pub fn classify(&self) -> RiskAssessment {
        let total = TotalCholesterolStatus::classify(self.total_cholesterol);
        let hdl = HdlStatus::classify(self.hdl);
        let ldl = LdlStatus::classify(self.ldl);
        let triglycerides = TriglycerideStatus::classify(self.triglycerides);

        let risk_level = [total.risk(), hdl.risk(), ldl.risk(), triglycerides.risk()]
            .into_iter()
            .max()
            .unwrap_or(RiskLevel::Low);

        let mut recommendations: Vec<String> = [
            total.recommendation(),
            hdl.recommendation(),
            ldl.recommendation(),
            triglycerides.recommendation(),
        ]
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

        if recommendations.is_empty() {
            if risk_level == RiskLevel::Low {
                recommendations.extend(WELLNESS_RECOMMENDATIONS.iter().map(|r| r.to_string()));
            }
        } else if risk_level.needs_evaluation() {
            recommendations.push(EVALUATION_RECOMMENDATION.to_string());
        }

        let result_text = format!(
            "Analysis Results:\n\
             - Total Cholesterol: {:?} mg/dL ({})\n\
             - HDL Cholesterol: {:?} mg/dL ({})\n\
             - LDL Cholesterol: {:?} mg/dL ({})\n\
             - Triglycerides: {:?} mg/dL ({})\n\
             \n\
             Overall Risk Assessment: {}",
            self.total_cholesterol,
            total,
            self.hdl,
            hdl,
            self.ldl,
            ldl,
            self.triglycerides,
            triglycerides,
            risk_level,
        );

        tracing::debug!(risk = %risk_level, "classified lipid panel");

        RiskAssessment {
            total_cholesterol: total,
            hdl,
            ldl,
            triglycerides,
            risk_level,
            recommendations,
            result_text,
        }
    }
}

/// Classify a lipid panel from its four values.
pub fn classify_lipids(total_cholesterol: f64, hdl: f64, ldl: f64, triglycerides: f64) -> RiskAssessment {
    LabPanel::new(total_cholesterol, hdl, ldl, triglycerides).classify()
}

/// One band of an analyte's reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceBand {
    pub status: &'static str,
    pub range: &'static str,
}

/// Reference ranges for one analyte, used by the lipid profile form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRange {
    pub analyte: &'static str,
    pub unit: &'static str,
    pub bands: Vec<ReferenceBand>,
}

/// Reference ranges for all four analytes, best band first.
pub fn reference_ranges() -> Vec<ReferenceRange> {
    fn range(analyte: &'static str, bands: &[(&'static str, &'static str)]) -> ReferenceRange {
        ReferenceRange {
            analyte,
            unit: "mg/dL",
            bands: bands
                .iter()
                .map(|&(status, range)| ReferenceBand { status, range })
                .collect(),
        }
    }

    vec![
        range(
            "Total Cholesterol",
            &[("Optimal", "< 200"), ("Borderline High", "200-239"), ("High", ">= 240")],
        ),
        range(
            "HDL Cholesterol",
            &[("Optimal (Protective)", ">= 60"), ("Normal", "40-59"), ("Low", "< 40")],
        ),
        range(
            "LDL Cholesterol",
            &[
                ("Optimal", "< 100"),
                ("Near Optimal", "100-129"),
                ("Borderline High", "130-159"),
                ("High", "160-189"),
                ("Very High", ">= 190"),
            ],
        ),
        range(
            "Triglycerides",
            &[
                ("Normal", "< 150"),
                ("Borderline High", "150-199"),
                ("High", "200-499"),
                ("Very High", ">= 500"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_optimal_panel_gets_wellness_advice() {
        let r = classify_lipids(150.0, 70.0, 80.0, 100.0);
        assert_eq!(r.total_cholesterol, TotalCholesterolStatus::Optimal);
        assert_eq!(r.hdl, HdlStatus::Optimal);
        assert_eq!(r.ldl, LdlStatus::Optimal);
        assert_eq!(r.triglycerides, TriglycerideStatus::Normal);
        assert_eq!(r.risk_level, RiskLevel::Low);
        assert_eq!(r.recommendations, WELLNESS_RECOMMENDATIONS.to_vec());
    }

    #[test]
    fn worst_panel_is_very_high_with_evaluation() {
        let r = classify_lipids(250.0, 30.0, 200.0, 600.0);
        assert_eq!(r.risk_level, RiskLevel::VeryHigh);
        assert_eq!(r.recommendations.len(), 5);
        assert!(r.recommendations[0].contains("high total cholesterol"));
        assert!(r.recommendations[1].contains("HDL"));
        assert!(r.recommendations[2].contains("very high LDL"));
        assert!(r.recommendations[3].contains("very high triglycerides"));
        assert_eq!(r.recommendations[4], EVALUATION_RECOMMENDATION);
    }

    #[test]
    fn cut_points_fall_into_higher_band() {
        assert_eq!(TotalCholesterolStatus::classify(199.9), TotalCholesterolStatus::Optimal);
        assert_eq!(TotalCholesterolStatus::classify(200.0), TotalCholesterolStatus::BorderlineHigh);
        assert_eq!(TotalCholesterolStatus::classify(240.0), TotalCholesterolStatus::High);

        assert_eq!(HdlStatus::classify(60.0), HdlStatus::Optimal);
        assert_eq!(HdlStatus::classify(59.9), HdlStatus::Normal);
        assert_eq!(HdlStatus::classify(40.0), HdlStatus::Normal);
        assert_eq!(HdlStatus::classify(39.9), HdlStatus::Low);

        assert_eq!(LdlStatus::classify(100.0), LdlStatus::NearOptimal);
        assert_eq!(LdlStatus::classify(130.0), LdlStatus::BorderlineHigh);
        assert_eq!(LdlStatus::classify(160.0), LdlStatus::High);
        assert_eq!(LdlStatus::classify(190.0), LdlStatus::VeryHigh);

        assert_eq!(TriglycerideStatus::classify(150.0), TriglycerideStatus::BorderlineHigh);
        assert_eq!(TriglycerideStatus::classify(200.0), TriglycerideStatus::High);
        assert_eq!(TriglycerideStatus::classify(500.0), TriglycerideStatus::VeryHigh);
    }

    #[test]
    fn near_optimal_ldl_adds_nothing() {
        let r = classify_lipids(150.0, 50.0, 120.0, 100.0);
        assert_eq!(r.ldl, LdlStatus::NearOptimal);
        assert_eq!(r.hdl, HdlStatus::Normal);
        assert_eq!(r.risk_level, RiskLevel::Low);
        assert_eq!(r.recommendations.len(), 2);
    }

    #[test]
    fn moderate_risk_has_no_evaluation_line() {
        let r = classify_lipids(210.0, 70.0, 80.0, 100.0);
        assert_eq!(r.risk_level, RiskLevel::Moderate);
        assert_eq!(
            r.recommendations,
            vec!["Consider dietary changes to reduce total cholesterol.".to_string()]
        );
    }

    #[test]
    fn borderline_after_high_keeps_high() {
        // High from total cholesterol must survive a later borderline triglyceride.
        let r = classify_lipids(250.0, 70.0, 80.0, 160.0);
        assert_eq!(r.risk_level, RiskLevel::High);
        assert_eq!(r.recommendations.last().unwrap(), EVALUATION_RECOMMENDATION);
    }

    #[test]
    fn aggregate_is_monotone_in_each_analyte() {
        let ldl_values = [50.0, 110.0, 140.0, 170.0, 200.0];
        let mut previous = RiskLevel::Low;
        for ldl in ldl_values {
            let level = classify_lipids(210.0, 50.0, ldl, 100.0).risk_level;
            assert!(level >= previous, "ldl {ldl} lowered risk");
            previous = level;
        }

        let hdl_values = [80.0, 50.0, 20.0];
        let mut previous = RiskLevel::Low;
        for hdl in hdl_values {
            let level = classify_lipids(150.0, hdl, 80.0, 100.0).risk_level;
            assert!(level >= previous, "hdl {hdl} lowered risk");
            previous = level;
        }

        let total_values = [150.0, 210.0, 250.0];
        let mut previous = RiskLevel::Low;
        for total in total_values {
            let level = classify_lipids(total, 50.0, 80.0, 100.0).risk_level;
            assert!(level >= previous, "total {total} lowered risk");
            previous = level;
        }

        let triglyceride_values = [100.0, 160.0, 300.0, 600.0];
        let mut previous = RiskLevel::Low;
        for triglycerides in triglyceride_values {
            let level = classify_lipids(150.0, 50.0, 80.0, triglycerides).risk_level;
            assert!(level >= previous, "triglycerides {triglycerides} lowered risk");
            previous = level;
        }
        assert_eq!(previous, RiskLevel::VeryHigh);
    }

    #[test]
    fn negative_values_are_compared_literally() {
        let r = classify_lipids(-5.0, -5.0, -5.0, -5.0);
        assert_eq!(r.total_cholesterol, TotalCholesterolStatus::Optimal);
        assert_eq!(r.hdl, HdlStatus::Low);
        assert_eq!(r.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn result_text_lists_each_analyte() {
        let r = classify_lipids(250.0, 30.0, 200.0, 600.0);
        assert!(r.result_text.contains("Total Cholesterol: 250.0 mg/dL (High)"));
        assert!(r.result_text.contains("HDL Cholesterol: 30.0 mg/dL (Low)"));
        assert!(classify_lipids(212.5, 50.0, 80.0, 100.0)
            .result_text
            .contains("Total Cholesterol: 212.5 mg/dL (Borderline High)"));
        assert!(r.result_text.contains("Overall Risk Assessment: Very High Risk"));
    }

    #[test]
    fn classification_is_idempotent() {
        let a = classify_lipids(205.5, 45.0, 135.0, 180.0);
        let b = classify_lipids(205.5, 45.0, 135.0, 180.0);
        assert_eq!(a, b);
    }

    #[test]
    fn statuses_serialize_as_labels() {
        let r = classify_lipids(150.0, 70.0, 80.0, 100.0);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["hdl"], "Optimal (Protective)");
        assert_eq!(json["risk_level"], "Low Risk");
    }

    #[test]
    fn reference_ranges_cover_every_analyte() {
        let ranges = reference_ranges();
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[2].bands.len(), 5);
    }
}
