//! API-surface configuration (SPEC_FULL.md §9.3): bind address, path prefix,
//! and CORS. Engine/downstream/status-store settings come from
//! `onboard_pipeline::PipelineConfig` and aren't duplicated here.
//!
//! Default prefix matches §4.5: all routes (including `/health`) are
//! mounted under `/api/v1/pipeline`.

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub prefix: String,
    pub cors_allowed_origins: Vec<String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let prefix =
            std::env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1/pipeline".to_string());
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();

        Self {
            bind_addr,
            prefix,
            cors_allowed_origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        std::env::remove_var("API_BIND_ADDR");
        std::env::remove_var("API_PREFIX");
        std::env::remove_var("CORS_ALLOWED_ORIGINS");

        let config = ApiConfig::from_env();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.prefix, "/api/v1/pipeline");
        assert!(config.cors_allowed_origins.is_empty());
    }
}
