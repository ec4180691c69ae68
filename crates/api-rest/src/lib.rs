//! # API REST
//!
//! REST API implementation for Health Companion.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (form and JSON parsing, CORS, status codes)
//!
//! Uses `api-shared` for request/response types and `hc-core` for all domain logic.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    ChatForm, ChatRes, ExtractMethod, ExtractNoteReq, ExtractNoteRes, HealthRes, HealthService,
    LipidAnalysisRes, LipidForm, LipidReferenceRes, ListNotesRes, PredictDiseaseReq,
    PredictDiseaseRes, SaveNoteReq, SaveNoteRes, SymptomListRes,
};
use hc_core::{
    extraction, lipid, symptoms, ChatService, CoreConfig, CoreError, LlmClient, NoteStore,
    NoteText,
};

/// Application state shared across REST API handlers
///
/// Holds the note store and the optional language model client. Both are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    notes: NoteStore,
    chat: ChatService,
    llm: Option<Arc<dyn LlmClient>>,
}

impl AppState {
    pub fn new(cfg: &CoreConfig, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self::with_notes(NoteStore::new(cfg.notes_file()), llm)
    }

    pub fn with_notes(notes: NoteStore, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self {
            notes,
            chat: ChatService::new(llm.clone()),
            llm,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        symptom_checker,
        predict_disease,
        lipid_profile,
        analyze_lipid,
        get_chatbot_response,
        save_note,
        list_notes,
        extract_note,
    ),
    components(schemas(
        HealthRes,
        SymptomListRes,
        PredictDiseaseReq,
        PredictDiseaseRes,
        LipidReferenceRes,
        api_shared::ReferenceRangeDto,
        api_shared::ReferenceBandDto,
        LipidForm,
        LipidAnalysisRes,
        ChatForm,
        ChatRes,
        SaveNoteReq,
        SaveNoteRes,
        ListNotesRes,
        ExtractMethod,
        ExtractNoteReq,
        ExtractNoteRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/symptom_checker", get(symptom_checker))
        .route("/predict_disease", post(predict_disease))
        .route("/lipid_profile", get(lipid_profile))
        .route("/analyze_lipid", post(analyze_lipid))
        .route("/get_chatbot_response", post(get_chatbot_response))
        .route("/save_note", post(save_note))
        .route("/notes", get(list_notes))
        .route("/notes/extract", post(extract_note))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, &'static str);

fn core_error_response(e: CoreError) -> ApiError {
    match e {
        CoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
        CoreError::LlmNotConfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            "No language model is configured",
        ),
        CoreError::Llm(_) | CoreError::ExtractionParse(_) => {
            (StatusCode::BAD_GATEWAY, "Language model request failed")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    }
}

fn join_error_response(e: tokio::task::JoinError) -> ApiError {
    tracing::error!("Blocking task failed: {:?}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Also reports whether a language
/// model was configured at startup.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health(state.llm.is_some()))
}

#[utoipa::path(
    get,
    path = "/symptom_checker",
    responses(
        (status = 200, description = "Selectable symptoms in display order", body = SymptomListRes)
    )
)]
/// List the symptom vocabulary for the checkbox form
#[axum::debug_handler]
async fn symptom_checker() -> Json<SymptomListRes> {
    Json(SymptomListRes {
        symptoms: symptoms::SYMPTOMS.iter().map(|s| s.to_string()).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/predict_disease",
    request_body = PredictDiseaseReq,
    responses(
        (status = 200, description = "Best matching disease and confidence", body = PredictDiseaseRes),
        (status = 400, description = "Bad request")
    )
)]
/// Predict a disease from selected symptoms
///
/// An empty selection or a selection with no recognised symptoms returns a sentinel
/// prediction with confidence 0 rather than an error.
#[axum::debug_handler]
async fn predict_disease(Json(req): Json<PredictDiseaseReq>) -> Json<PredictDiseaseRes> {
    let result = symptoms::predict(&req.symptoms);
    Json(PredictDiseaseRes::new(&result, req.symptoms))
}

#[utoipa::path(
    get,
    path = "/lipid_profile",
    responses(
        (status = 200, description = "Reference ranges for each analyte", body = LipidReferenceRes)
    )
)]
/// Reference ranges shown alongside the lipid panel form
#[axum::debug_handler]
async fn lipid_profile() -> Json<LipidReferenceRes> {
    Json(lipid::reference_ranges().into())
}

#[utoipa::path(
    post,
    path = "/analyze_lipid",
    request_body(content = LipidForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Lipid panel risk assessment", body = LipidAnalysisRes)
    )
)]
/// Classify a submitted lipid panel
///
/// Missing, blank or non-numeric fields are treated as 0 mg/dL.
#[axum::debug_handler]
async fn analyze_lipid(Form(form): Form<LipidForm>) -> Json<LipidAnalysisRes> {
    let panel = form.panel();
    let assessment = panel.classify();
    tracing::info!(risk = %assessment.risk_level, "analysed lipid panel");
    Json(LipidAnalysisRes::new(&panel, assessment))
}

#[utoipa::path(
    post,
    path = "/get_chatbot_response",
    request_body(content = ChatForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Assistant reply", body = ChatRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Answer a chatbot message
///
/// Proxies to the configured language model, falling back to the keyword responder.
#[axum::debug_handler]
async fn get_chatbot_response(
    State(state): State<AppState>,
    Form(form): Form<ChatForm>,
) -> Result<Json<ChatRes>, ApiError> {
    let chat = state.chat.clone();
    let reply = tokio::task::spawn_blocking(move || chat.respond(&form.user_message))
        .await
        .map_err(join_error_response)?;

    tracing::debug!(source = ?reply.source, "chat reply");
    Ok(Json(ChatRes {
        response: reply.text,
    }))
}

#[utoipa::path(
    post,
    path = "/save_note",
    request_body = SaveNoteReq,
    responses(
        (status = 200, description = "Note stored", body = SaveNoteRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Append a clinical note to the note file
///
/// # Errors
/// Returns `400 Bad Request` if the note is blank and `500 Internal Server Error` if the
/// note file cannot be written.
#[axum::debug_handler]
async fn save_note(
    State(state): State<AppState>,
    Json(req): Json<SaveNoteReq>,
) -> Result<Json<SaveNoteRes>, ApiError> {
    let note = match NoteText::new(&req.note) {
        Ok(note) => note,
        Err(e) => {
            tracing::error!("Invalid note: {:?}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid note"));
        }
    };

    match state.notes.append(&note) {
        Ok(()) => Ok(Json(SaveNoteRes {
            status: "success".into(),
        })),
        Err(e) => {
            tracing::error!("Save note error: {:?}", e);
            Err(core_error_response(e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "Stored notes, oldest first", body = ListNotesRes),
        (status = 500, description = "Internal server error")
    )
)]
/// List all stored notes
#[axum::debug_handler]
async fn list_notes(State(state): State<AppState>) -> Result<Json<ListNotesRes>, ApiError> {
    match state.notes.read_all() {
        Ok(notes) => Ok(Json(ListNotesRes { notes })),
        Err(e) => {
            tracing::error!("List notes error: {:?}", e);
            Err(core_error_response(e))
        }
    }
}

#[utoipa::path(
    post,
    path = "/notes/extract",
    request_body = ExtractNoteReq,
    responses(
        (status = 200, description = "Extracted history fields", body = ExtractNoteRes),
        (status = 400, description = "Bad request"),
        (status = 502, description = "Language model request failed"),
        (status = 503, description = "No language model is configured")
    )
)]
/// Extract personal details, chief complaints and family history from a note
///
/// `method` selects the regex extractor (default) or the language model.
#[axum::debug_handler]
async fn extract_note(
    State(state): State<AppState>,
    Json(req): Json<ExtractNoteReq>,
) -> Result<Json<ExtractNoteRes>, ApiError> {
    if req.note.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Invalid note"));
    }

    let method = req.method;
    let llm = state.llm.clone();
    let note = req.note;
    let result = tokio::task::spawn_blocking(move || {
        extraction::extract(&note, method.into(), llm.as_deref())
    })
    .await
    .map_err(join_error_response)?;

    match result {
        Ok(history) => Ok(Json(ExtractNoteRes::new(history, method))),
        Err(e) => {
            tracing::error!("Extract note error: {:?}", e);
            Err(core_error_response(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use hc_core::MockLlmClient;
    use tower::ServiceExt;

    fn test_state(llm: Option<Arc<dyn LlmClient>>) -> (AppState, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let notes = NoteStore::new(tmp.path().join("notes.txt"));
        (AppState::with_notes(notes, llm), tmp)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_llm_flag() {
        let (state, _tmp) = test_state(None);
        let response = router(state).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["llm_configured"], false);
    }

    #[tokio::test]
    async fn symptom_checker_lists_vocabulary() {
        let (state, _tmp) = test_state(None);
        let response = router(state)
            .oneshot(get_request("/symptom_checker"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["symptoms"].as_array().unwrap().len(), 20);
        assert_eq!(json["symptoms"][0], "Fever");
    }

    #[tokio::test]
    async fn predict_disease_common_cold() {
        let (state, _tmp) = test_state(None);
        let req = json_request(
            "/predict_disease",
            serde_json::json!({"symptoms": ["Fever", "Cough", "Runny Nose", "Sore Throat"]}),
        );
        let response = router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["prediction"], "Common Cold");
        assert_eq!(json["confidence"], 100);
        assert_eq!(json["symptoms"].as_array().unwrap().len(), 4);
        assert!(json["disclaimer"].is_string());
    }

    #[tokio::test]
    async fn predict_disease_empty_selection() {
        let (state, _tmp) = test_state(None);
        let req = json_request("/predict_disease", serde_json::json!({}));
        let json = body_json(router(state).oneshot(req).await.unwrap()).await;
        assert_eq!(json["prediction"], "No symptoms selected");
        assert_eq!(json["confidence"], 0);
        assert!(json["disclaimer"].is_null());
    }

    #[tokio::test]
    async fn lipid_profile_lists_reference_ranges() {
        let (state, _tmp) = test_state(None);
        let json = body_json(
            router(state)
                .oneshot(get_request("/lipid_profile"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json["analytes"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn analyze_lipid_from_form() {
        let (state, _tmp) = test_state(None);
        let req = form_request(
            "/analyze_lipid",
            "total_cholesterol=250&hdl_cholesterol=30&ldl_cholesterol=200&triglycerides=600",
        );
        let response = router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["risk_level"], "Very High Risk");
        assert_eq!(json["recommendations"].as_array().unwrap().len(), 5);
        assert_eq!(json["total_cholesterol"], 250.0);
    }

    #[tokio::test]
    async fn analyze_lipid_missing_fields_default_to_zero() {
        let (state, _tmp) = test_state(None);
        let req = form_request("/analyze_lipid", "total_cholesterol=abc");
        let json = body_json(router(state).oneshot(req).await.unwrap()).await;
        assert_eq!(json["total_cholesterol"], 0.0);
        // An HDL of 0 is Low, which makes the aggregate Moderate.
        assert_eq!(json["hdl_status"], "Low");
        assert_eq!(json["risk_level"], "Moderate Risk");
    }

    #[tokio::test]
    async fn chatbot_uses_keywords_without_model() {
        let (state, _tmp) = test_state(None);
        let req = form_request("/get_chatbot_response", "user_message=How+much+SLEEP");
        let json = body_json(router(state).oneshot(req).await.unwrap()).await;
        assert!(json["response"].as_str().unwrap().contains("7-9 hours"));
    }

    #[tokio::test]
    async fn chatbot_proxies_to_model() {
        let (state, _tmp) = test_state(Some(Arc::new(MockLlmClient::new("Model says hi"))));
        let req = form_request("/get_chatbot_response", "user_message=hello");
        let json = body_json(router(state).oneshot(req).await.unwrap()).await;
        assert_eq!(json["response"], "Model says hi");
    }

    #[tokio::test]
    async fn save_then_list_notes() {
        let (state, _tmp) = test_state(None);
        let app = router(state);

        let req = json_request("/save_note", serde_json::json!({"note": "BP 130/85"}));
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "success");

        let req = json_request("/save_note", serde_json::json!({"note": "Follow up in 2 weeks"}));
        app.clone().oneshot(req).await.unwrap();

        let json = body_json(app.oneshot(get_request("/notes")).await.unwrap()).await;
        assert_eq!(
            json["notes"],
            serde_json::json!(["BP 130/85", "Follow up in 2 weeks"])
        );
    }

    #[tokio::test]
    async fn save_blank_note_is_bad_request() {
        let (state, _tmp) = test_state(None);
        let req = json_request("/save_note", serde_json::json!({"note": "   "}));
        let response = router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn extract_note_with_regex() {
        let (state, _tmp) = test_state(None);
        let req = json_request(
            "/notes/extract",
            serde_json::json!({"note": "P: I have a sore throat.\nP: My brother has asthma."}),
        );
        let response = router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["method"], "regex");
        assert_eq!(json["chief_complaints"], "a sore throat");
        assert_eq!(json["family_history"], "My brother has asthma");
    }

    #[tokio::test]
    async fn extract_note_with_llm_requires_model() {
        let (state, _tmp) = test_state(None);
        let req = json_request(
            "/notes/extract",
            serde_json::json!({"note": "P: I have a cough.", "method": "llm"}),
        );
        let response = router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn extract_note_with_llm() {
        let mock = MockLlmClient::new(
            r#"{"personal_details":"Not mentioned","chief_complaints":"cough","family_history":"Not mentioned"}"#,
        );
        let (state, _tmp) = test_state(Some(Arc::new(mock)));
        let req = json_request(
            "/notes/extract",
            serde_json::json!({"note": "P: I have a cough.", "method": "llm"}),
        );
        let json = body_json(router(state).oneshot(req).await.unwrap()).await;
        assert_eq!(json["method"], "llm");
        assert_eq!(json["chief_complaints"], "cough");
    }

    #[tokio::test]
    async fn extract_note_bad_model_output_is_bad_gateway() {
        let (state, _tmp) = test_state(Some(Arc::new(MockLlmClient::new("no json here"))));
        let req = json_request(
            "/notes/extract",
            serde_json::json!({"note": "P: I have a cough.", "method": "llm"}),
        );
        let response = router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (state, _tmp) = test_state(None);
        let response = router(state)
            .oneshot(get_request("/api-docs/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["paths"]["/predict_disease"].is_object());
    }
}
