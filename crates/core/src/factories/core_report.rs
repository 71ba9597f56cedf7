use peersel_api::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A default report module that counts selection diagnostics.
#[derive(Debug)]
pub struct CoreSelectionReportFactory {}

impl CoreSelectionReportFactory {
    /// Construct a new [`CoreSelectionReportFactory`]
    pub fn create() -> DynSelectionReportFactory {
        let out: DynSelectionReportFactory = Arc::new(Self {});
        out
    }
}

impl SelectionReportFactory for CoreSelectionReportFactory {
    fn default_config(&self, _config: &mut Config) -> PsResult<()> {
        Ok(())
    }

    fn validate_config(&self, _config: &Config) -> PsResult<()> {
        Ok(())
    }

    fn create(
        &self,
        _builder: Arc<Builder>,
    ) -> BoxFut<'static, PsResult<DynSelectionReport>> {
        Box::pin(async move {
            let out: DynSelectionReport =
                Arc::new(CoreSelectionReport::default());
            Ok(out)
        })
    }
}

/// Counts of selection diagnostics. Downcast a [DynSelectionReport]
/// through [SelectionReport::as_any] to read them.
#[derive(Debug, Default)]
pub struct CoreSelectionReport {
    guessed_own: AtomicU64,
    directory_reset: AtomicU64,
}

impl CoreSelectionReport {
    /// How often the ownership guess answered "own".
    pub fn guessed_own_count(&self) -> u64 {
        self.guessed_own.load(Ordering::Relaxed)
    }

    /// How often an enumeration requested a directory reset.
    pub fn directory_reset_count(&self) -> u64 {
        self.directory_reset.load(Ordering::Relaxed)
    }
}

impl SelectionReport for CoreSelectionReport {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn guessed_own(&self) {
        self.guessed_own.fetch_add(1, Ordering::Relaxed);
    }

    fn directory_reset(&self) {
        self.directory_reset.fetch_add(1, Ordering::Relaxed);
    }
}
