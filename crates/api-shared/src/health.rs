use crate::HealthRes;

/// Health check shared by the REST API and the CLI
///
/// Reports whether the service is alive and whether a language model is configured.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance
    ///
    /// # Arguments
    /// * `llm_configured` - Whether a language model client was built at startup
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health(llm_configured: bool) -> HealthRes {
        HealthRes {
            ok: true,
            message: "Health Companion is alive".into(),
            llm_configured,
        }
    }
}
