use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::{config::AppConfig, db::app_storage::AppStorage, middleware::auth::Auth};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<AppStorage>,
    pub config: Arc<AppConfig>,
    pub auth: Arc<Auth>,
}

impl AppState {
    pub fn new(storage: AppStorage, config: AppConfig, auth: Auth) -> Self {
        Self {
            storage: Arc::new(storage),
            config: Arc::new(config),
            auth: Arc::new(auth),
        }
    }

    /// Current time in the configured dashboard offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.config.utc_offset())
    }
}
