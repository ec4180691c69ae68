//! Symptom-overlap disease prediction.
//!
//! Every recognised input symptom votes for each disease it is associated with. The disease
//! with the most votes wins; ties are broken by the order in which diseases first received a
//! vote. Confidence comes from the overlap with the winner's ideal symptom profile when one is
//! known, otherwise from the raw vote count.

use crate::constants::PREDICTION_DISCLAIMER;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// The closed symptom vocabulary, in display order.
pub const SYMPTOMS: [&str; 20] = [
    "Fever",
    "Cough",
    "Fatigue",
    "Difficulty Breathing",
    "Headache",
    "Sore Throat",
    "Body Aches",
    "Runny Nose",
    "Nausea",
    "Diarrhea",
    "Chest Pain",
    "Abdominal Pain",
    "Dizziness",
    "Rash",
    "Loss of Taste/Smell",
    "Joint Pain",
    "Swelling",
    "Chills",
    "Vomiting",
    "Confusion",
];

const SYMPTOM_DISEASE_TABLE: &[(&str, &[&str])] = &[
    ("Fever", &["Common Cold", "Flu", "COVID-19", "Malaria"]),
    ("Cough", &["Common Cold", "Flu", "COVID-19", "Bronchitis"]),
    ("Fatigue", &["Common Cold", "Flu", "COVID-19", "Anemia", "Depression"]),
    ("Difficulty Breathing", &["Asthma", "COVID-19", "Pneumonia", "Anxiety"]),
    ("Headache", &["Migraine", "Tension Headache", "Sinusitis", "Flu"]),
    ("Sore Throat", &["Common Cold", "Flu", "Strep Throat"]),
    ("Body Aches", &["Flu", "COVID-19", "Fibromyalgia"]),
    ("Runny Nose", &["Common Cold", "Flu", "Allergies"]),
    ("Nausea", &["Food Poisoning", "Migraine", "Gastritis", "Pregnancy"]),
    ("Diarrhea", &["Food Poisoning", "Gastroenteritis", "IBS"]),
    ("Chest Pain", &["Heart Attack", "Angina", "Acid Reflux", "Anxiety"]),
    ("Abdominal Pain", &["Appendicitis", "Gallstones", "IBS", "Food Poisoning"]),
    ("Dizziness", &["Vertigo", "Anemia", "Low Blood Pressure", "Anxiety"]),
    ("Rash", &["Allergic Reaction", "Eczema", "Psoriasis", "Chickenpox"]),
    ("Loss of Taste/Smell", &["COVID-19", "Common Cold", "Sinusitis"]),
    ("Joint Pain", &["Arthritis", "Gout", "Lupus", "Lyme Disease"]),
    ("Swelling", &["Edema", "Allergic Reaction", "Injury", "Infection"]),
    ("Chills", &["Flu", "COVID-19", "Malaria", "Infection"]),
    ("Vomiting", &["Food Poisoning", "Gastroenteritis", "Migraine", "Pregnancy"]),
    ("Confusion", &["Concussion", "Stroke", "Infection", "Low Blood Sugar"]),
];

const DISEASE_PROFILE_TABLE: &[(&str, &[&str])] = &[
    ("Common Cold", &["Fever", "Cough", "Runny Nose", "Sore Throat"]),
    (
        "Flu",
        &["Fever", "Cough", "Body Aches", "Fatigue", "Headache", "Chills"],
    ),
    (
        "COVID-19",
        &["Fever", "Cough", "Fatigue", "Difficulty Breathing", "Loss of Taste/Smell"],
    ),
    ("Migraine", &["Headache", "Nausea", "Sensitivity to Light", "Vomiting"]),
    ("Food Poisoning", &["Nausea", "Vomiting", "Diarrhea", "Abdominal Pain"]),
    (
        "Allergic Reaction",
        &["Rash", "Swelling", "Difficulty Breathing", "Runny Nose"],
    ),
    ("Anxiety", &["Chest Pain", "Difficulty Breathing", "Dizziness", "Confusion"]),
    (
        "Gastroenteritis",
        &["Nausea", "Vomiting", "Diarrhea", "Abdominal Pain", "Fever"],
    ),
];

static SYMPTOM_TO_DISEASES: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| SYMPTOM_DISEASE_TABLE.iter().copied().collect());

static DISEASE_PROFILES: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| DISEASE_PROFILE_TABLE.iter().copied().collect());

/// Diseases associated with a symptom, in table order.
pub fn diseases_for(symptom: &str) -> Option<&'static [&'static str]> {
    SYMPTOM_TO_DISEASES.get(symptom).copied()
}

/// The ideal symptom profile of a disease, when one is defined.
pub fn ideal_profile(disease: &str) -> Option<&'static [&'static str]> {
    DISEASE_PROFILES.get(disease).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    NoSymptoms,
    UnknownCondition,
    Disease(&'static str),
}

impl Prediction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoSymptoms => "No symptoms selected",
            Self::UnknownCondition => "Unknown condition",
            Self::Disease(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub prediction: Prediction,
    /// Percentage in `0..=100`.
    pub confidence: u8,
}

impl PredictionResult {
    fn sentinel(prediction: Prediction) -> Self {
        Self {
            prediction,
            confidence: 0,
        }
    }

    /// Disclaimer shown with every real prediction.
    pub fn disclaimer(&self) -> Option<&'static str> {
        match self.prediction {
            Prediction::Disease(_) => Some(PREDICTION_DISCLAIMER),
            _ => None,
        }
    }
}

impl Serialize for PredictionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("PredictionResult", 3)?;
        state.serialize_field("prediction", self.prediction.label())?;
        state.serialize_field("confidence", &self.confidence)?;
        state.serialize_field("disclaimer", &self.disclaimer())?;
        state.end()
    }
}

/// Predict the most likely disease for a set of symptom labels.
///
/// Duplicate labels count once and unknown labels are ignored.
pub fn predict<S: AsRef<str>>(symptoms: &[S]) -> PredictionResult {
    if symptoms.is_empty() {
        return PredictionResult::sentinel(Prediction::NoSymptoms);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(symptoms.len());
    let mut selected: Vec<&str> = Vec::with_capacity(symptoms.len());
    for symptom in symptoms {
        let symptom = symptom.as_ref();
        if seen.insert(symptom) {
            selected.push(symptom);
        }
    }

    // Insertion-ordered counts; position is the tie-break.
    let mut counts: Vec<(&'static str, u32)> = Vec::new();
    for symptom in &selected {
        let Some(diseases) = diseases_for(symptom) else {
            tracing::debug!(symptom, "ignoring unrecognised symptom");
            continue;
        };
        for &disease in diseases {
            match counts.iter_mut().find(|(name, _)| *name == disease) {
                Some((_, count)) => *count += 1,
                None => counts.push((disease, 1)),
            }
        }
    }

    let mut best: Option<(&'static str, u32)> = None;
    for &(disease, count) in &counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((disease, count));
        }
    }

    let Some((disease, count)) = best else {
        return PredictionResult::sentinel(Prediction::UnknownCondition);
    };

    let confidence = match ideal_profile(disease) {
        Some(profile) => {
            let matched = profile.iter().filter(|s| seen.contains(*s)).count();
            let pct = (100.0 * matched as f64 / profile.len() as f64).round();
            pct.min(100.0) as u8
        }
        None => count.saturating_mul(15).min(90) as u8,
    };

    tracing::debug!(disease, confidence, "predicted disease");

    PredictionResult {
        prediction: Prediction::Disease(disease),
        confidence,
    }
}

/// Convenience wrapper returning the label and confidence pair.
pub fn predict_disease<S: AsRef<str>>(symptoms: &[S]) -> (&'static str, u8) {
    let result = predict(symptoms);
    (result.prediction.label(), result.confidence)
}
