use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService};
use crate::session::SessionCodec;

/// Process-wide state. Configuration is loaded once at startup and never
/// mutated; request handlers share it by reference.
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub session: SessionCodec,

    pub auth: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let session = SessionCodec::new(
            config.session.secret.clone(),
            config.session.max_age_seconds,
            config.server.secure_cookies,
        );

        let auth = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        Ok(Self {
            config,
            store,
            session,
            auth,
        })
    }
}
