//! Scoped use of an engine: finish runs on every exit path.

use crate::error::Error;

pub(crate) trait Finishable {
    fn needs_finish(&self) -> bool;
    fn finish_scope(&mut self) -> Result<(), Error>;
}

struct ScopeGuard<E: Finishable> {
    engine: E,
}

impl<E: Finishable> Drop for ScopeGuard<E> {
    fn drop(&mut self) {
        if self.engine.needs_finish() {
            // The callback already failed or panicked; its outcome is what
            // the caller sees.
            if let Err(e) = self.engine.finish_scope() {
                tracing::debug!(error = %e, "finish after aborted scope failed");
            }
        }
    }
}

/// Run `f` with `engine`, then finish it. An error from `f` is returned as is
/// after a best-effort finish.
pub(crate) fn scoped<E, F, R, X>(engine: E, f: F) -> Result<R, X>
where
    E: Finishable,
    F: FnOnce(&mut E) -> Result<R, X>,
    X: From<Error>,
{
    let mut guard = ScopeGuard { engine };
    let value = f(&mut guard.engine)?;
    if guard.engine.needs_finish() {
        guard.engine.finish_scope()?;
    }
    Ok(value)
}
