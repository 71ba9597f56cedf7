//! Peer selection error types.

use std::sync::Arc;

/// A clonable trait-object inner error.
#[derive(Clone, Default)]
pub struct DynInnerError(
    pub Option<Arc<dyn std::error::Error + 'static + Send + Sync>>,
);

impl std::fmt::Debug for DynInnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for DynInnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_ref() {
            None => f.write_str("None"),
            Some(s) => s.fmt(f),
        }
    }
}

impl std::error::Error for DynInnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.as_ref().map(|s| {
            let out: &(dyn std::error::Error + 'static) = &**s;
            out
        })
    }
}

impl DynInnerError {
    /// Construct a new DynInnerError from a source error.
    pub fn new<E: std::error::Error + 'static + Send + Sync>(e: E) -> Self {
        Self(Some(Arc::new(e)))
    }
}

/// The peer selection error type.
///
/// The enumerators in the core crate never hand [PsError::Inconsistent]
/// or [PsError::CapacityExceeded] to their callers. They log the fault,
/// apply the recovery action and end the sequence early instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PsError {
    /// Generic internal error.
    #[error("{ctx} (src: {src})")]
    Other {
        /// Any context associated with this error.
        ctx: Arc<str>,

        /// The inner error (if any).
        #[source]
        src: DynInnerError,
    },

    /// The peer directory detected a structural fault while scanning.
    /// The recovery action is [crate::Directory::reset_active_set].
    #[error("directory inconsistency: {ctx}")]
    Inconsistent {
        /// Description of the fault.
        ctx: Arc<str>,
    },

    /// A dedup set could not record one more identity.
    #[error("dedup capacity of {limit} identities exceeded")]
    CapacityExceeded {
        /// The capacity that was exhausted.
        limit: usize,
    },
}

impl PsError {
    /// Construct an "other" error with an inner source error.
    pub fn other_src<
        C: std::fmt::Display,
        S: std::error::Error + 'static + Send + Sync,
    >(
        ctx: C,
        src: S,
    ) -> Self {
        Self::Other {
            ctx: ctx.to_string().into_boxed_str().into(),
            src: DynInnerError::new(src),
        }
    }

    /// Construct an "other" error.
    pub fn other<C: std::fmt::Display>(ctx: C) -> Self {
        Self::Other {
            ctx: ctx.to_string().into_boxed_str().into(),
            src: DynInnerError::default(),
        }
    }

    /// Construct a directory inconsistency error.
    pub fn inconsistent<C: std::fmt::Display>(ctx: C) -> Self {
        Self::Inconsistent {
            ctx: ctx.to_string().into_boxed_str().into(),
        }
    }

    /// Returns `true` if this error reports a directory inconsistency.
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, Self::Inconsistent { .. })
    }
}

/// The peer selection result type.
pub type PsResult<T> = Result<T, PsError>;
