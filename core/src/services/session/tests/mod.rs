mod service_tests;

use std::sync::Arc;

use nl_shared::config::SessionConfig;

use crate::domain::value_objects::ClientInfo;
use crate::repositories::{InMemorySessionRepository, InMemoryTokenRepository};
use crate::services::session::SessionManagementService;
use crate::services::token::{TokenService, TokenServiceConfig};

pub(super) struct Harness {
    pub service: SessionManagementService,
    pub sessions: Arc<InMemorySessionRepository>,
    pub tokens: Arc<TokenService>,
}

pub(super) fn harness(config: SessionConfig) -> Harness {
    let sessions = Arc::new(InMemorySessionRepository::new());
    let tokens = Arc::new(TokenService::new(
        Arc::new(InMemoryTokenRepository::new()),
        TokenServiceConfig::default(),
    ));
    let service = SessionManagementService::new(sessions.clone(), tokens.clone(), config);
    Harness {
        service,
        sessions,
        tokens,
    }
}

pub(super) fn laptop() -> ClientInfo {
    ClientInfo::new(
        "203.0.113.10",
        Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0".to_string()),
        None,
    )
}

pub(super) fn phone() -> ClientInfo {
    ClientInfo::new("198.51.100.7", Some("NutriLog-iOS/2.3".to_string()), Some("ios-device-42".to_string()))
}
