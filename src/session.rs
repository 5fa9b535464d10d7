//! Tracks metadata for a loading/compiling session.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Diagnostic;
use crate::log;

/// Metadata for a loading/compiling session.
///
/// When the calling program first uses one of the API entry points (e.g. `Loader::new()`),
/// there is no context yet where the library may start to track things.  This struct
/// provides that context: whether to log, and the diagnostics collected so far.
///
/// Cloning a `Session` is cheap; clones share the same diagnostics list.
#[derive(Clone)]
pub struct Session {
    inner: Rc<SessionInner>,
}

struct SessionInner {
    log_enabled: bool,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::new_with_log(log::log_enabled())
    }

    pub fn new_with_log(log_enabled: bool) -> Self {
        Self {
            inner: Rc::new(SessionInner {
                log_enabled,
                diagnostics: RefCell::new(Vec::new()),
            }),
        }
    }

    #[cfg(test)]
    pub fn new_for_test_suite() -> Self {
        Self::new_with_log(false)
    }

    pub fn log_enabled(&self) -> bool {
        self.inner.log_enabled
    }

    /// Logs a degraded condition and keeps it for later inspection.
    pub fn report(&self, diagnostic: Diagnostic) {
        svgops_log!(self, "{}", diagnostic);
        self.inner.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Returns a copy of the diagnostics reported so far, in order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_diagnostics() {
        let session = Session::new_for_test_suite();
        let other = session.clone();

        other.report(Diagnostic::unsupported("elliptical arc"));

        assert_eq!(
            session.diagnostics(),
            vec![Diagnostic::unsupported("elliptical arc")]
        );
    }
}
