//! Scoped ownership of a started context

use sdk::{ContextError, ManagedContext, ServiceRegistry};

/// Owns a started context and guarantees it is closed exactly once
///
/// The normal path calls [`ContextGuard::close`], which consumes the guard so
/// nothing borrowed from the context's services can outlive it. If the guard
/// is dropped without that call (a panic unwinding through the action), the
/// drop handler closes the context and logs any failure.
pub struct ContextGuard {
    context: Box<dyn ManagedContext>,
    released: bool,
}

impl ContextGuard {
    pub fn new(context: Box<dyn ManagedContext>) -> Self {
        Self {
            context,
            released: false,
        }
    }

    /// Services of the guarded context
    pub fn services(&self) -> &ServiceRegistry {
        self.context.services()
    }

    pub fn entry_point(&self) -> &str {
        self.context.entry_point()
    }

    /// Close the context and release the guard
    pub fn close(mut self) -> Result<(), ContextError> {
        self.released = true;
        tracing::info!("Closing context '{}'", self.context.entry_point());
        self.context.close()
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        tracing::warn!(
            "Context '{}' released without explicit close, closing now",
            self.context.entry_point()
        );
        if let Err(e) = self.context.close() {
            tracing::error!(
                "Failed to close context '{}': {}",
                self.context.entry_point(),
                e
            );
        }
    }
}
