//! Read scopes and scope-bound relationship references.
//!
//! A [`ReadScope`] bounds how long references produced by a store read stay
//! resolvable. Repositories that return projections take the scope
//! explicitly and bind lazily-resolved relationships to it; reading such a
//! reference after the scope closed is a data-access error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::error::RepoError;

/// A bounded read. Closed on [`ReadScope::close`] or drop.
#[derive(Debug)]
pub struct ReadScope {
    id: Uuid,
    label: &'static str,
    open: Arc<AtomicBool>,
}

impl ReadScope {
    pub fn begin(label: &'static str) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(scope_id = %id, scope = label, "Read scope opened");
        Self {
            id,
            label,
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle for binding references to this scope.
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            id: self.id,
            open: Arc::clone(&self.open),
        }
    }

    pub fn close(self) {}
}

impl Drop for ReadScope {
    fn drop(&mut self) {
        self.open.store(false, Ordering::Release);
        tracing::debug!(scope_id = %self.id, scope = self.label, "Read scope closed");
    }
}

/// Cloneable view of a scope's liveness.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    id: Uuid,
    open: Arc<AtomicBool>,
}

impl ScopeHandle {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn ensure_open(&self) -> Result<(), RepoError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(RepoError::DataAccess(format!(
                "lazy reference read after read scope {} closed",
                self.id
            )))
        }
    }
}

/// A to-one relationship reference.
///
/// `Eager` references were resolved by a join and are always readable.
/// `Scoped` references are only readable while their originating scope is open.
#[derive(Debug, Clone)]
pub enum Lazy<T> {
    Eager(Option<T>),
    Scoped { value: Option<T>, scope: ScopeHandle },
}

impl<T> Lazy<T> {
    pub fn eager(value: Option<T>) -> Self {
        Self::Eager(value)
    }

    pub fn scoped(value: Option<T>, scope: ScopeHandle) -> Self {
        Self::Scoped { value, scope }
    }

    /// Resolve the reference. `Ok(None)` means the relationship is empty.
    pub fn get(&self) -> Result<Option<&T>, RepoError> {
        match self {
            Self::Eager(value) => Ok(value.as_ref()),
            Self::Scoped { value, scope } => {
                scope.ensure_open()?;
                Ok(value.as_ref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_reference_readable_while_open() {
        let scope = ReadScope::begin("test");
        let reference = Lazy::scoped(Some(7), scope.handle());

        assert_eq!(reference.get().unwrap(), Some(&7));
        scope.close();
    }

    #[test]
    fn test_scoped_reference_fails_after_close() {
        let scope = ReadScope::begin("test");
        let reference = Lazy::scoped(Some("Java"), scope.handle());
        scope.close();

        assert!(matches!(reference.get(), Err(RepoError::DataAccess(_))));
    }

    #[test]
    fn test_eager_reference_outlives_scope() {
        let scope = ReadScope::begin("test");
        let reference: Lazy<&str> = Lazy::eager(None);
        drop(scope);

        assert_eq!(reference.get().unwrap(), None);
    }
}
