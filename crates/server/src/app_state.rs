use std::sync::Arc;

use server_api::ApiContext;

/// Read-only after startup; handlers share it through an `Arc`.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: Arc<ApiContext>,
}

impl AppState {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api: Arc::new(api) }
    }
}
