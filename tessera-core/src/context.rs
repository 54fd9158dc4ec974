//! Resolution context — everything expansion needs, threaded explicitly.

use crate::device::DeviceState;
use crate::policy::PolicyRegistry;
use crate::registry::TraitRegistry;
use std::fmt;

/// Trait registry, enterprise policy table and device view for one planning
/// session. Shared read-only by the resolver, pre-passes and expander.
pub struct ResolutionContext {
    registry: TraitRegistry,
    policies: PolicyRegistry,
    device: Box<dyn DeviceState + Send + Sync>,
}

impl ResolutionContext {
    pub fn new(registry: TraitRegistry, device: impl DeviceState + Send + Sync + 'static) -> Self {
        Self {
            registry,
            policies: PolicyRegistry::default(),
            device: Box::new(device),
        }
    }

    pub fn with_policies(mut self, policies: PolicyRegistry) -> Self {
        self.policies = policies;
        self
    }

    pub fn registry(&self) -> &TraitRegistry {
        &self.registry
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    pub fn device(&self) -> &dyn DeviceState {
        self.device.as_ref()
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("trait_types", &self.registry.len())
            .field("policies", &self.policies.len())
            .field(
                "headless_system_user_mode",
                &self.device.is_headless_system_user_mode(),
            )
            .finish()
    }
}
