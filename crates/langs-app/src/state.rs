use std::sync::Arc;

use langs_dal::repository::Collection;
use langs_types::app::AppInfo;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, collection: Collection) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                app_config,
                collection,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn collection(&self) -> &Collection {
        &self.state.collection
    }
}

struct AppStateInner {
    collection: Collection,
    app_config: AppConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub info: AppInfo,
}
