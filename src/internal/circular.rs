//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

const MAX_DEPTH: usize = 1024;

// Resolution never suspends, so a per-thread stack sees every nested `get`
// of one top-level resolution.
thread_local! {
    static RESOLUTION_TLS: RefCell<ResolutionTls> = RefCell::new(ResolutionTls::default());
}

#[derive(Default)]
struct ResolutionTls {
    /// (container id, identifier) frames; `None` marks an anonymous `make`
    stack: Vec<(usize, Option<String>)>,
}

impl ResolutionTls {
    fn push(&mut self, container: usize, id: Option<&str>) -> DiResult<()> {
        if self.stack.len() >= MAX_DEPTH {
            return Err(DiError::DepthExceeded(self.stack.len()));
        }
        self.stack.push((container, id.map(str::to_string)));
        Ok(())
    }
}

/// Marks a resolution frame as active until dropped.
pub(crate) struct ResolutionGuard {
    container: usize,
}

impl ResolutionGuard {
    /// Pushes `id` for `container`, failing if it is already being resolved.
    pub(crate) fn enter(container: usize, id: &str) -> DiResult<Self> {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();

            // Circular detection BEFORE pushing the new name
            let resolving = tls
                .stack
                .iter()
                .any(|(c, n)| *c == container && n.as_deref() == Some(id));
            if resolving {
                let mut path: Vec<String> = tls
                    .stack
                    .iter()
                    .filter(|(c, _)| *c == container)
                    .filter_map(|(_, n)| n.clone())
                    .skip_while(|n| n != id)
                    .collect();
                path.push(id.to_string());
                return Err(DiError::Circular(path));
            }

            tls.push(container, Some(id))?;
            Ok(Self { container })
        })
    }

    /// Pushes a frame that only counts toward the depth limit.
    ///
    /// Used by `make`, which caches nothing and may legitimately recurse
    /// into the same class.
    pub(crate) fn nested(container: usize) -> DiResult<Self> {
        RESOLUTION_TLS.with(|tls| tls.borrow_mut().push(container, None))?;
        Ok(Self { container })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();
            if let Some((container, _)) = tls.stack.pop() {
                debug_assert_eq!(container, self.container);
            }
        });
    }
}
