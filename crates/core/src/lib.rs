//! # Health Companion Core
//!
//! Core business logic for the Health Companion application.
//!
//! This crate contains:
//! - Lipid panel risk classification
//! - Symptom-to-disease prediction over static association tables
//! - The health assistant chatbot (keyword responder and model proxy)
//! - The append-only clinical note store
//! - History field extraction from notes
//!
//! **No API concerns**: HTTP servers and request parsing belong in `api-rest` and `api-shared`.
//! The HTTP language model client lives in `hc-llm`.

pub mod chat;
pub mod config;
pub mod constants;
pub mod error;
pub mod extraction;
pub mod lipid;
pub mod llm;
pub mod notes;
pub mod symptoms;
pub mod validation;

pub use chat::{ChatReply, ChatService, ReplySource};
pub use config::{CoreConfig, LlmConfig};
pub use error::{CoreError, CoreResult};
pub use extraction::{ExtractionMethod, PatientHistory};
pub use lipid::{classify_lipids, LabPanel, RiskAssessment, RiskLevel};
pub use llm::{LlmClient, LlmError, MockLlmClient};
pub use notes::NoteStore;
pub use symptoms::{predict_disease, Prediction, PredictionResult, SYMPTOMS};
pub use validation::NoteText;
