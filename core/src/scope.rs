use std::sync::{Arc, RwLock};

/// Liveness handle tied to whoever started a request.
///
/// Scoped writes hold a read lock for their whole duration and `close` takes the
/// write lock, so once `close` returns no scoped write can land.
#[derive(Debug, Clone)]
pub struct RequestScope {
    open: Arc<RwLock<bool>>,
}

impl RequestScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: Arc::new(RwLock::new(true)),
        }
    }

    /// A scope nobody ever closes.
    #[must_use]
    pub fn detached() -> Self {
        Self::new()
    }

    /// Create a scope together with a guard that closes it when dropped.
    #[must_use]
    pub fn guarded() -> (Self, ScopeGuard) {
        let scope = Self::new();
        let guard = ScopeGuard {
            scope: scope.clone(),
        };
        (scope, guard)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.read().map(|open| *open).unwrap_or(false)
    }

    /// Close the scope, waiting for any scoped write already in progress.
    pub fn close(&self) {
        match self.open.write() {
            Ok(mut open) => *open = false,
            Err(poisoned) => *poisoned.into_inner() = false,
        }
    }

    /// Run `write` only if the scope is still open; `None` means it was skipped.
    pub fn run_if_open<T>(&self, write: impl FnOnce() -> T) -> Option<T> {
        let open = self.open.read().ok()?;
        if *open { Some(write()) } else { None }
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes its scope on drop.
#[derive(Debug)]
pub struct ScopeGuard {
    scope: RequestScope,
}

impl ScopeGuard {
    #[must_use]
    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_scope_runs_write() {
        let scope = RequestScope::new();
        assert_eq!(scope.run_if_open(|| 7), Some(7));
    }

    #[test]
    fn test_closed_scope_skips_write() {
        let scope = RequestScope::new();
        scope.close();
        assert!(!scope.is_open());

        let mut ran = false;
        assert!(scope.run_if_open(|| ran = true).is_none());
        assert!(!ran);
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let (scope, guard) = RequestScope::guarded();
        assert!(guard.scope().is_open());
        drop(guard);
        assert!(!scope.is_open());
    }

    #[test]
    fn test_clones_share_state() {
        let scope = RequestScope::detached();
        let other = scope.clone();
        other.close();
        assert!(!scope.is_open());
    }
}
