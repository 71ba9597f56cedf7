//! Builder-related types.

use crate::*;
use std::sync::Arc;

/// The general peer selection builder.
/// This contains both configuration and factory instances,
/// allowing construction of runtime module instances.
#[derive(Debug)]
pub struct Builder {
    /// The module configuration to be used when building modules.
    /// This can be loaded from disk or modified before freezing the builder.
    pub config: Config,

    /// The [DirectoryFactory] to be used for creating [Directory]
    /// instances.
    pub directory: DynDirectoryFactory,

    /// The [SelectionReportFactory] to be used for creating
    /// [SelectionReport] instances.
    pub report: DynSelectionReportFactory,
}

impl Builder {
    /// Construct a default config given the configured module factories.
    /// Note, this should be called before freezing the Builder instance
    /// in an Arc<>.
    pub fn set_default_config(&mut self) -> PsResult<()> {
        let Self {
            config,
            directory,
            report,
        } = self;

        config.set_module_config(&SelectorModConfig::default())?;
        directory.default_config(config)?;
        report.default_config(config)?;

        Ok(())
    }

    /// Validate the current config against all configured module
    /// factories.
    pub fn validate_config(&self) -> PsResult<()> {
        self.config
            .get_module_config::<SelectorModConfig>()?
            .selector
            .validate()?;
        self.directory.validate_config(&self.config)?;
        self.report.validate_config(&self.config)?;
        Ok(())
    }

    /// Freeze this builder so it can be shared with module factories.
    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }
}
