//! Tessera Core — declarative test-trait resolution and parameterization.
//!
//! This crate turns the traits declared on a test class and its methods into
//! the concrete runs ("variants") a test runner executes:
//! - Trait model (declared traits, composites, attribute values)
//! - Trait registry with validation and the built-in vocabulary
//! - Pre-passes that rewrite sugar traits into parameterized alternatives
//! - Resolver that flattens a trait list for one selected alternative
//! - Precedence ordering of traits and variants
//! - Expander producing one variant per selection × parameter value

pub mod context;
pub mod device;
pub mod expander;
pub mod model;
pub mod policy;
pub mod precedence;
pub mod prepass;
pub mod registry;
pub mod resolver;
pub mod special;
pub mod variant;
pub mod vocabulary;

pub use context::ResolutionContext;
pub use device::{DeviceState, StaticDeviceState};
pub use expander::{ExpandError, Expander, MethodParam, TestClass, TestMethod};
pub use model::{
    AttrError, AttrValue, AxisKind, CompositeTrait, DeclaredTrait, ParamValue, TestTrait,
    TraitKind, TraitTypeId,
};
pub use registry::{Namespaces, RegistryBuilder, RegistryError, TraitDefinition, TraitRegistry};
pub use resolver::{ResolveError, Resolver};
pub use variant::{MethodId, Variant, VariantFingerprint};
