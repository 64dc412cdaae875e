//! Shared application state.

use std::sync::Arc;

use homebridgr_analysis::CaptionAnalyzer;
use homebridgr_core::HomeBridgrConfig;
use homebridgr_store::RecordStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: HomeBridgrConfig,
    pub store: Arc<dyn RecordStore>,
    pub analyzer: CaptionAnalyzer,
}

impl AppState {
    pub fn new(
        config: HomeBridgrConfig,
        store: Arc<dyn RecordStore>,
        analyzer: CaptionAnalyzer,
    ) -> Self {
        Self {
            config,
            store,
            analyzer,
        }
    }
}
