//! Structured history extraction from free-text notes.
//!
//! Notes are usually consultation transcripts where `P:` lines are the patient and `D:` lines
//! are the doctor. Two extractors fill the same [`PatientHistory`]: a deterministic regex pass
//! and a language model prompt that returns JSON.

use crate::constants::NOT_MENTIONED;
use crate::llm::LlmClient;
use crate::{CoreError, CoreResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const SYSTEM_PROMPT: &str = "You are a third year medical student. You have just ended an interaction session with a patient. Your goal is to reconstruct a structured medical history presentation based on your patient conversation, to present to your professor for discussion about the patient.";

const FORMAT_INSTRUCTIONS: &str = r#"Respond with a single JSON object and nothing else. It must have exactly these string fields:
- "personal_details": only personal demographics such as age, sex, residential city or town and marital status. No medical history.
- "chief_complaints": only the major or initial complaint that made the patient seek a consultation, such as chest pain or headache.
- "family_history": diseases that run in the family, such as heart disease or diabetes.
Use "Not mentioned" for any field the transcript does not cover."#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientHistory {
    #[serde(default = "not_mentioned")]
    pub personal_details: String,
    #[serde(default = "not_mentioned")]
    pub chief_complaints: String,
    #[serde(default = "not_mentioned")]
    pub family_history: String,
}

fn not_mentioned() -> String {
    NOT_MENTIONED.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Regex,
    Llm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Speaker {
    Patient,
    Doctor,
    Narrative,
}

struct Utterance<'a> {
    speaker: Speaker,
    text: &'a str,
}

fn utterances(note: &str) -> Vec<Utterance<'_>> {
    note.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if let Some(rest) = line.strip_prefix("P:") {
                Utterance {
                    speaker: Speaker::Patient,
                    text: rest.trim(),
                }
            } else if let Some(rest) = line.strip_prefix("D:") {
                Utterance {
                    speaker: Speaker::Doctor,
                    text: rest.trim(),
                }
            } else {
                Utterance {
                    speaker: Speaker::Narrative,
                    text: line,
                }
            }
        })
        .collect()
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid extraction regex pattern")
}

static AGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        regex(r"(?i)\b(\d{1,3})[- ]?(?:years?|yrs?)[- ]old\b"),
        regex(r"(?i)\baged?\s*(?:is\s*)?(\d{1,3})\b"),
        regex(r"(?i)\bI(?:['’]m| am)\s+(\d{1,3})\b"),
    ]
});

static SEX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)\b(male|female|man|woman|boy|girl)\b"));

static MARITAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)\b(married|single|divorced|widowed|separated)\b"));

static RESIDENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)\b(?:live|living|reside|residing) in\s+([^,.!?;]+)"));

static COMPLAINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"(?i)\b(?:I(?:['’]ve| have) been having|I(?:['’]ve| have) been experiencing|I(?:['’]ve| have) had|I have|I(?:['’]m| am) suffering from|suffering from|complain(?:s|ing)? of|present(?:s|ing) with)\s+([^.!?;]+)",
    )
});

static PAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)[^.!?;]*\bpain\b[^.!?;]*"));

static RELATIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"(?i)\b(mother|father|mom|mum|dad|brother|sister|son|daughter|grandmother|grandfather|grandma|grandpa|aunt|uncle|cousin|parents?|siblings?|family)\b",
    )
});

fn first_capture<'a>(pattern: &Regex, texts: &[&'a str]) -> Option<&'a str> {
    texts
        .iter()
        .find_map(|&text| pattern.captures(text).and_then(|c| c.get(1)))
        .map(|m| m.as_str().trim())
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn or_not_mentioned(parts: Vec<String>, separator: &str) -> String {
    if parts.is_empty() {
        not_mentioned()
    } else {
        parts.join(separator)
    }
}

/// Extract history fields with fixed patterns.
///
/// Patient and narrative lines are searched; doctor lines are ignored so that questions
/// like "any heart disease in the family?" are not mistaken for answers.
pub fn extract_regex(note: &str) -> PatientHistory {
    let lines = utterances(note);
    let texts: Vec<&str> = lines
        .iter()
        .filter(|u| u.speaker != Speaker::Doctor)
        .map(|u| u.text)
        .collect();

    let mut personal = Vec::new();
    if let Some(age) = AGE_PATTERNS.iter().find_map(|p| first_capture(p, &texts)) {
        personal.push(format!("Age: {age}"));
    }
    if let Some(sex) = first_capture(&SEX_PATTERN, &texts) {
        let sex = match sex.to_lowercase().as_str() {
            "male" | "man" | "boy" => "male",
            _ => "female",
        };
        personal.push(format!("Sex: {sex}"));
    }
    if let Some(status) = first_capture(&MARITAL_PATTERN, &texts) {
        personal.push(format!("Marital status: {}", status.to_lowercase()));
    }
    if let Some(place) = first_capture(&RESIDENCE_PATTERN, &texts) {
        personal.push(format!("Residence: {place}"));
    }

    let complaint = first_capture(&COMPLAINT_PATTERN, &texts).or_else(|| {
        texts
            .iter()
            .find_map(|&text| PAIN_PATTERN.find(text))
            .map(|m| m.as_str().trim())
    });

    let family: Vec<String> = texts
        .iter()
        .flat_map(|&text| sentences(text))
        .filter(|s| RELATIVE_PATTERN.is_match(s))
        .map(str::to_string)
        .collect();

    PatientHistory {
        personal_details: or_not_mentioned(personal, "; "),
        chief_complaints: complaint.map_or_else(not_mentioned, str::to_string),
        family_history: or_not_mentioned(family, "; "),
    }
}

fn llm_prompt(note: &str) -> String {
    format!(
        "Based on the history session transcript, summarize the patient's history following the below instructions. Note that `P: ` means the patient and `D: ` means doctor in the transcript.\n\n{note}\n\nFormat instructions:\n{FORMAT_INSTRUCTIONS}\n\nYou should follow the concepts of history taking in the medical domain to aid a comprehensive diagnosis."
    )
}

/// Parse a model reply into a [`PatientHistory`].
///
/// Accepts a bare JSON object or one wrapped in prose or a markdown code fence.
pub fn parse_llm_output(reply: &str) -> CoreResult<PatientHistory> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply.trim(),
    };
    serde_json::from_str(json).map_err(|e| {
        tracing::warn!("unparseable extraction output: {e}");
        CoreError::ExtractionParse(e)
    })
}

/// Extract history fields by prompting a language model. Blocks on the model call.
pub fn extract_with_llm(llm: &dyn LlmClient, note: &str) -> CoreResult<PatientHistory> {
    let reply = llm.complete(SYSTEM_PROMPT, &llm_prompt(note))?;
    tracing::debug!(model = llm.model(), bytes = reply.len(), "received extraction reply");
    parse_llm_output(&reply)
}

/// Extract with the requested method.
///
/// # Errors
///
/// `CoreError::LlmNotConfigured` when `method` is `Llm` and no client is available, otherwise
/// any error of [`extract_with_llm`].
pub fn extract(
    note: &str,
    method: ExtractionMethod,
    llm: Option<&dyn LlmClient>,
) -> CoreResult<PatientHistory> {
    match method {
        ExtractionMethod::Regex => Ok(extract_regex(note)),
        ExtractionMethod::Llm => {
            let llm = llm.ok_or(CoreError::LlmNotConfigured)?;
            extract_with_llm(llm, note)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    const TRANSCRIPT: &str = "D: Good morning, what brings you in today?
P: I've been having chest pain for three days.
D: Tell me a little about yourself.
P: I'm a 54-year-old man, married, and I live in Leeds.
D: Any illnesses that run in the family?
P: My father had a heart attack at 60. My mother has diabetes.
D: Thank you.";

    #[test]
    fn regex_extracts_all_fields() {
        let history = extract_regex(TRANSCRIPT);
        assert_eq!(
            history.personal_details,
            "Age: 54; Sex: male; Marital status: married; Residence: Leeds"
        );
        assert_eq!(history.chief_complaints, "chest pain for three days");
        assert_eq!(
            history.family_history,
            "My father had a heart attack at 60; My mother has diabetes"
        );
    }

    #[test]
    fn doctor_lines_are_ignored() {
        let history = extract_regex("D: Does your mother have diabetes?\nP: No.");
        assert_eq!(history.family_history, NOT_MENTIONED);
    }

    #[test]
    fn narrative_note_without_prefixes() {
        let history = extract_regex(
            "35 year old female presenting with severe headache. Sister has migraines.",
        );
        assert_eq!(history.personal_details, "Age: 35; Sex: female");
        assert_eq!(history.chief_complaints, "severe headache");
        assert_eq!(history.family_history, "Sister has migraines");
    }

    #[test]
    fn pain_sentence_is_complaint_fallback() {
        let history = extract_regex("P: My knee pain is worse on stairs.");
        assert_eq!(history.chief_complaints, "My knee pain is worse on stairs");
    }

    #[test]
    fn empty_note_is_not_mentioned() {
        let history = extract_regex("");
        assert_eq!(history.personal_details, NOT_MENTIONED);
        assert_eq!(history.chief_complaints, NOT_MENTIONED);
        assert_eq!(history.family_history, NOT_MENTIONED);
    }

    #[test]
    fn parses_fenced_json_reply() {
        let reply = "Here you go:\n```json\n{\"personal_details\": \"40, female\", \"chief_complaints\": \"cough\", \"family_history\": \"none\"}\n```";
        let history = parse_llm_output(reply).unwrap();
        assert_eq!(history.personal_details, "40, female");
        assert_eq!(history.chief_complaints, "cough");
        assert_eq!(history.family_history, "none");
    }

    #[test]
    fn missing_fields_default_to_not_mentioned() {
        let history = parse_llm_output(r#"{"chief_complaints": "fever"}"#).unwrap();
        assert_eq!(history.chief_complaints, "fever");
        assert_eq!(history.personal_details, NOT_MENTIONED);
    }

    #[test]
    fn garbage_reply_is_parse_error() {
        assert!(matches!(
            parse_llm_output("I cannot help with that"),
            Err(CoreError::ExtractionParse(_))
        ));
    }

    #[test]
    fn llm_extraction_sends_transcript() {
        let mock = MockLlmClient::new(
            r#"{"personal_details": "54, male", "chief_complaints": "chest pain", "family_history": "father MI"}"#,
        );
        let history = extract(TRANSCRIPT, ExtractionMethod::Llm, Some(&mock)).unwrap();
        assert_eq!(history.chief_complaints, "chest pain");

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("P: I've been having chest pain"));
        assert!(prompts[0].contains("\"family_history\""));
    }

    #[test]
    fn llm_method_without_client_errors() {
        assert!(matches!(
            extract(TRANSCRIPT, ExtractionMethod::Llm, None),
            Err(CoreError::LlmNotConfigured)
        ));
    }

    #[test]
    fn llm_failure_propagates() {
        let mock = MockLlmClient::failing("down");
        assert!(matches!(
            extract(TRANSCRIPT, ExtractionMethod::Llm, Some(&mock)),
            Err(CoreError::Llm(_))
        ));
    }
}
