//! Once-only teardown guard

use skiff_core::domain::stack::StackSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::service::stack::StackService;

/// Deletes a job's stacks at most once
///
/// Both the completion stage and the controller may ask for cleanup; only
/// the first request reaches the backend.
pub struct Cleanup<'a> {
    service: &'a StackService,
    stacks: &'a StackSet,
    done: AtomicBool,
}

impl<'a> Cleanup<'a> {
    pub fn new(service: &'a StackService, stacks: &'a StackSet) -> Self {
        Self {
            service,
            stacks,
            done: AtomicBool::new(false),
        }
    }

    /// Tears the stacks down unless that already happened
    ///
    /// Failures are logged as warnings and never returned.
    pub async fn run_once(&self) {
        if self.done.swap(true, Ordering::SeqCst) {
            debug!("Cleanup of {} already ran", self.stacks.main);
            return;
        }

        info!("Cleaning up stacks of {}", self.stacks.main);
        match self.service.teardown(self.stacks).await {
            Ok(()) => info!("Cleanup of {} complete", self.stacks.main),
            Err(e) => warn!("Cleanup of {} incomplete: {}", self.stacks.main, e),
        }
    }

    /// Whether cleanup was already requested
    pub fn has_run(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}
