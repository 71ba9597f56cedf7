//! Selection diagnostics report types.

use crate::*;
use std::sync::Arc;

/// Receives advisory diagnostics from the selection engine.
///
/// Nothing reported here is ever used for a selection decision, so
/// implementations need no stronger guarantee than eventual visibility.
pub trait SelectionReport: 'static + Send + Sync + std::fmt::Debug {
    /// To aid in concrete downcasting.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Notify that the cheap ownership guess answered "own" and exact
    /// verification is about to run.
    fn guessed_own(&self) {
        // provided impl is a no-op
    }

    /// Notify that an enumeration requested a directory reset.
    fn directory_reset(&self) {
        // provided impl is a no-op
    }
}

/// Trait object [SelectionReport].
pub type DynSelectionReport = Arc<dyn SelectionReport>;

/// A factory for creating report instances.
pub trait SelectionReportFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut Config) -> PsResult<()>;

    /// Validate configuration.
    fn validate_config(&self, config: &Config) -> PsResult<()>;

    /// Construct a report instance.
    fn create(
        &self,
        builder: Arc<Builder>,
    ) -> BoxFut<'static, PsResult<DynSelectionReport>>;
}

/// Trait object [SelectionReportFactory].
pub type DynSelectionReportFactory = Arc<dyn SelectionReportFactory>;
