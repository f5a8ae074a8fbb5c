use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::Result;

use super::spec::{CurveKey, CurveSpec};
use super::FittedCurve;

/// Fitted curves keyed by the content hash of their spec.
///
/// Curves are shared through `Arc`, so any number of animations can hold the
/// same fitted curve. Entries are never evicted.
#[derive(Debug, Default)]
pub struct CurveCache {
    entries: HashMap<CurveKey, (CurveSpec, Arc<FittedCurve>)>,
}

impl CurveCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fitted curve for `spec`, fitting and storing it on a miss.
    ///
    /// A hash hit is confirmed against the stored spec before it is reused.
    /// Failed fits are not cached.
    ///
    /// # Errors
    ///
    /// Returns the fit error if `spec` cannot be fitted.
    pub fn get_or_fit(&mut self, spec: &CurveSpec) -> Result<Arc<FittedCurve>> {
        let key = spec.key();
        if let Some((stored, curve)) = self.entries.get(&key) {
            if stored == spec {
                trace!(key = key.value(), "curve cache hit");
                return Ok(Arc::clone(curve));
            }
        }

        let curve = Arc::new(spec.fit()?);
        self.entries.insert(key, (spec.clone(), Arc::clone(&curve)));
        trace!(key = key.value(), entries = self.entries.len(), "curve cache miss");
        Ok(curve)
    }

    /// Returns the number of cached curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached curve. Animations keep their own references.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
