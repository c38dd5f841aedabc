//! Bundle of service clients shared by one provisioning run

use crate::iam::RoleDirectory;
use crate::stack::StackService;
use crate::storage::ObjectStore;
use std::sync::Arc;

/// Service clients used by a provisioning run
///
/// Cheap to clone; rollback actions keep their own clone of the object
/// store so they can outlive the step that registered them.
#[derive(Clone)]
pub struct CloudSession {
    pub object_store: Arc<dyn ObjectStore>,
    pub roles: Arc<dyn RoleDirectory>,
    pub stacks: Arc<dyn StackService>,

    /// Region the clients are bound to, if known
    pub region: Option<String>,
}

impl CloudSession {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        roles: Arc<dyn RoleDirectory>,
        stacks: Arc<dyn StackService>,
    ) -> Self {
        Self {
            object_store,
            roles,
            stacks,
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl std::fmt::Debug for CloudSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudSession")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
