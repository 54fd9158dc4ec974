//! Resolver — flattens a declared trait list into the traits of one run.
//!
//! Resolution is a worklist over trait nodes. Each node is either settled
//! (emitted as-is) or pending (replaced by its expansion, which is sorted by
//! precedence and spliced back in at the front of the queue). Expansion rules
//! for a pending trait:
//!
//! - composite: dropped unless it is the selection; the selected composite
//!   is replaced by its expanded payload
//! - special expansion: the device-dependent rewrite; the trait itself is
//!   settled, the other outputs stay pending
//! - repeating: replaced by its `value` payload, all pending
//! - unselected parameterized: dropped
//! - type in an ignored namespace: settled untouched
//! - anything else: sub-traits expanded depth first (ignored namespaces
//!   skipped), followed by the trait itself, settled
//!
//! Registry acyclicity bounds the recursion; the final list is precedence
//! sorted.

use crate::context::ResolutionContext;
use crate::model::{AttrError, DeclaredTrait, TestTrait, TraitKind, TraitTypeId};
use crate::precedence::{precedence_key, sort_traits};
use crate::vocabulary;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown trait type: {0}")]
    UnknownTraitType(TraitTypeId),
    #[error("special expansion of {trait_type} failed: {source}")]
    SpecialExpansion {
        trait_type: TraitTypeId,
        #[source]
        source: AttrError,
    },
    #[error("malformed repeating trait {trait_type}: {source}")]
    MalformedRepeating {
        trait_type: TraitTypeId,
        #[source]
        source: AttrError,
    },
}

/// A trait awaiting resolution, or one already final.
#[derive(Debug, Clone)]
struct Node {
    item: TestTrait,
    settled: bool,
}

impl Node {
    fn pending(item: impl Into<TestTrait>) -> Self {
        Self {
            item: item.into(),
            settled: false,
        }
    }

    fn settled(item: impl Into<TestTrait>) -> Self {
        Self {
            item: item.into(),
            settled: true,
        }
    }
}

/// Borrowing resolver over a shared context.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    ctx: &'a ResolutionContext,
}

impl<'a> Resolver<'a> {
    pub fn new(ctx: &'a ResolutionContext) -> Self {
        Self { ctx }
    }

    /// Resolve `traits` for the run selected by `selection`.
    ///
    /// The output contains no composites, no repeating wrappers and no
    /// unselected parameterized traits.
    pub fn resolve(
        &self,
        traits: &[TestTrait],
        selection: Option<&TestTrait>,
    ) -> Result<Vec<TestTrait>, ResolveError> {
        let mut queue: VecDeque<Node> = traits.iter().cloned().map(Node::pending).collect();
        let mut out = Vec::with_capacity(traits.len());

        while let Some(node) = queue.pop_front() {
            if node.settled {
                out.push(node.item);
                continue;
            }
            let mut replacement = self.replacement(&node.item, selection)?;
            let registry = self.ctx.registry();
            replacement.sort_by_key(|n| precedence_key(registry, &n.item));
            for n in replacement.into_iter().rev() {
                queue.push_front(n);
            }
        }

        sort_traits(self.ctx.registry(), &mut out);
        trace!(input = traits.len(), output = out.len(), "resolved trait list");
        Ok(out)
    }

    fn replacement(
        &self,
        item: &TestTrait,
        selection: Option<&TestTrait>,
    ) -> Result<Vec<Node>, ResolveError> {
        match item {
            TestTrait::Composite(c) => {
                if selection != Some(item) {
                    return Ok(Vec::new());
                }
                let mut out = Vec::new();
                for inner in &c.traits {
                    if self.is_ignored(inner) {
                        continue;
                    }
                    out.extend(self.replacement(inner, selection)?);
                }
                Ok(out)
            }
            TestTrait::Declared(d) => self.declared_replacement(d, item, selection),
        }
    }

    fn declared_replacement(
        &self,
        d: &DeclaredTrait,
        item: &TestTrait,
        selection: Option<&TestTrait>,
    ) -> Result<Vec<Node>, ResolveError> {
        let registry = self.ctx.registry();
        let namespaces = registry.namespaces();
        let def = match registry.get(&d.type_id) {
            Some(def) => def,
            // Foreign traits need no definition; they are opaque leaves.
            None if !namespaces.is_framework(&d.type_id) || namespaces.is_ignored(&d.type_id) => {
                return Ok(vec![Node::settled(d.clone())])
            }
            None => return Err(ResolveError::UnknownTraitType(d.type_id.clone())),
        };

        if let Some(special) = def.special {
            let expanded = special
                .expand(self.ctx.device(), d)
                .map_err(|source| ResolveError::SpecialExpansion {
                    trait_type: d.type_id.clone(),
                    source,
                })?;
            return Ok(expanded
                .into_iter()
                .map(|t| if &t == d { Node::settled(t) } else { Node::pending(t) })
                .collect());
        }

        match def.kind {
            TraitKind::Repeating => {
                let payload = d.traits_attr(vocabulary::VALUE).map_err(|source| {
                    ResolveError::MalformedRepeating {
                        trait_type: d.type_id.clone(),
                        source,
                    }
                })?;
                return Ok(payload.iter().cloned().map(Node::pending).collect());
            }
            TraitKind::Parameterized if selection != Some(item) => return Ok(Vec::new()),
            _ => {}
        }

        if namespaces.is_ignored(&d.type_id) {
            return Ok(vec![Node::settled(d.clone())]);
        }

        let mut out = Vec::new();
        for sub in &def.sub_traits {
            if namespaces.is_ignored(&sub.type_id) {
                continue;
            }
            out.extend(self.declared_replacement(sub, &TestTrait::Declared(sub.clone()), selection)?);
        }
        out.push(Node::settled(d.clone()));
        Ok(out)
    }

    fn is_ignored(&self, t: &TestTrait) -> bool {
        t.type_id()
            .is_some_and(|id| self.ctx.registry().namespaces().is_ignored(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::StaticDeviceState;
    use crate::model::{AttrValue, CompositeTrait};
    use crate::registry::{Namespaces, RegistryBuilder, TraitDefinition};
    use crate::vocabulary::*;

    fn ctx_with(defs: Vec<TraitDefinition>, headless: bool) -> ResolutionContext {
        let mut b = RegistryBuilder::framework();
        b.extend(defs);
        let device = StaticDeviceState {
            headless_system_user_mode: headless,
        };
        ResolutionContext::new(b.build().unwrap(), device)
    }

    fn names(traits: &[TestTrait]) -> Vec<&str> {
        traits.iter().map(TestTrait::parameter_name).collect()
    }

    #[test]
    fn meta_trait_expands_and_is_retained() {
        let ctx = ctx_with(
            vec![
                TraitDefinition::leaf("tessera.test.X").with_weight(1),
                TraitDefinition::leaf("tessera.test.Y").with_weight(5),
                TraitDefinition::meta(
                    "tessera.test.M",
                    vec![DeclaredTrait::new("tessera.test.Y"), DeclaredTrait::new("tessera.test.X")],
                ),
            ],
            false,
        );
        let out = Resolver::new(&ctx)
            .resolve(&[TestTrait::declared("tessera.test.M")], None)
            .unwrap();
        assert_eq!(names(&out), vec!["X", "Y", "M"]);
    }

    #[test]
    fn unselected_parameterized_is_dropped() {
        let ctx = ctx_with(vec![], false);
        let out = Resolver::new(&ctx)
            .resolve(&[TestTrait::declared(INCLUDE_RUN_ON_DEVICE_OWNER_USER)], None)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn selected_parameterized_expands_and_is_retained() {
        let ctx = ctx_with(vec![], false);
        let include = TestTrait::declared(INCLUDE_RUN_ON_DEVICE_OWNER_USER);
        let out = Resolver::new(&ctx)
            .resolve(std::slice::from_ref(&include), Some(&include))
            .unwrap();
        assert_eq!(
            names(&out),
            vec!["EnsureHasDeviceOwner", "RequireRunOnSystemUser", "IncludeRunOnDeviceOwnerUser"]
        );
    }

    #[test]
    fn composite_is_replaced_by_its_payload_when_selected() {
        let ctx = ctx_with(vec![], false);
        let composite = TestTrait::Composite(CompositeTrait::from_declared(
            "CAMERA",
            vec![ensure_has_permission(&["CAMERA"])],
        ));
        let resolver = Resolver::new(&ctx);
        assert!(resolver
            .resolve(std::slice::from_ref(&composite), None)
            .unwrap()
            .is_empty());
        let out = resolver
            .resolve(std::slice::from_ref(&composite), Some(&composite))
            .unwrap();
        assert_eq!(out, vec![TestTrait::Declared(ensure_has_permission(&["CAMERA"]))]);
    }

    #[test]
    fn repeating_trait_is_unwrapped() {
        let ctx = ctx_with(vec![], false);
        let wrapper = DeclaredTrait::new(ENSURE_FEATURE_FLAGS_ENABLED).with(
            VALUE,
            AttrValue::Traits(vec![
                ensure_feature_flag_enabled("ns", "a"),
                ensure_feature_flag_enabled("ns", "b"),
            ]),
        );
        let out = Resolver::new(&ctx).resolve(&[wrapper.into()], None).unwrap();
        assert_eq!(
            out,
            vec![
                TestTrait::Declared(ensure_feature_flag_enabled("ns", "a")),
                TestTrait::Declared(ensure_feature_flag_enabled("ns", "b")),
            ]
        );
    }

    #[test]
    fn malformed_repeating_payload_is_an_error() {
        let ctx = ctx_with(vec![], false);
        let wrapper = DeclaredTrait::new(ENSURE_FEATURE_FLAGS_ENABLED).with(VALUE, AttrValue::Int(1));
        let err = Resolver::new(&ctx).resolve(&[wrapper.into()], None).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedRepeating { .. }));
    }

    #[test]
    fn initial_user_headless_expands_to_secondary() {
        let ctx = ctx_with(vec![], true);
        let t = require_run_on_initial_user(OptionalBool::True);
        let out = Resolver::new(&ctx).resolve(&[t.into()], None).unwrap();
        assert_eq!(
            names(&out),
            vec![
                "EnsureHasSecondaryUser",
                "EnsureHasSecondaryUser",
                "RequireRunOnInitialUser",
                "RequireRunOnSecondaryUser",
            ]
        );
    }

    #[test]
    fn initial_user_not_headless_expands_to_primary() {
        let ctx = ctx_with(vec![], false);
        let t = require_run_on_initial_user(OptionalBool::False);
        let out = Resolver::new(&ctx).resolve(&[t.into()], None).unwrap();
        assert_eq!(names(&out), vec!["RequireRunOnInitialUser", "RequireRunOnPrimaryUser"]);
        assert_eq!(
            out[1].as_declared().unwrap().str_attr(SWITCHED_TO_USER).unwrap(),
            "FALSE"
        );
    }

    #[test]
    fn ignored_namespace_sub_traits_are_skipped() {
        let ctx = ctx_with(
            vec![TraitDefinition::meta(
                "tessera.test.Annotated",
                vec![DeclaredTrait::new(IGNORE)],
            )],
            false,
        );
        let out = Resolver::new(&ctx)
            .resolve(&[TestTrait::declared("tessera.test.Annotated")], None)
            .unwrap();
        assert_eq!(names(&out), vec!["Annotated"]);
    }

    #[test]
    fn top_level_ignored_trait_is_kept() {
        let ctx = ctx_with(vec![], false);
        let out = Resolver::new(&ctx)
            .resolve(&[ignore("flaky").into()], None)
            .unwrap();
        assert_eq!(out, vec![TestTrait::Declared(ignore("flaky"))]);
    }

    #[test]
    fn foreign_traits_pass_through_first() {
        let ctx = ctx_with(vec![], false);
        let foreign = TestTrait::declared("acme.Retry");
        let out = Resolver::new(&ctx)
            .resolve(
                &[TestTrait::declared(REQUIRE_RUN_ON_SYSTEM_USER), foreign.clone()],
                None,
            )
            .unwrap();
        assert_eq!(out[0], foreign);
    }

    #[test]
    fn unknown_framework_type_is_an_error() {
        let ctx = ctx_with(vec![], false);
        let err = Resolver::new(&ctx)
            .resolve(&[TestTrait::declared("tessera.users.Nobody")], None)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownTraitType(TraitTypeId::new("tessera.users.Nobody"))
        );
    }

    #[test]
    fn namespaces_are_configurable() {
        let mut b = RegistryBuilder::new(Namespaces {
            framework: "acme".into(),
            ignored: vec![],
        });
        b.register(TraitDefinition::leaf("acme.A").with_weight(2));
        b.register(TraitDefinition::leaf("acme.B").with_weight(1));
        let ctx = ResolutionContext::new(b.build().unwrap(), StaticDeviceState::default());
        let out = Resolver::new(&ctx)
            .resolve(&[TestTrait::declared("acme.A"), TestTrait::declared("acme.B")], None)
            .unwrap();
        assert_eq!(names(&out), vec!["B", "A"]);
    }

    #[test]
    fn ignored_sub_traits_are_skipped_and_foreign_ones_kept() {
        let ctx = ctx_with(
            vec![TraitDefinition::meta(
                "tessera.test.M",
                vec![
                    DeclaredTrait::new("java.lang.annotation.Retention"),
                    DeclaredTrait::new("acme.Foreign"),
                ],
            )],
            false,
        );
        let out = Resolver::new(&ctx)
            .resolve(&[TestTrait::declared("tessera.test.M")], None)
            .unwrap();
        assert_eq!(names(&out), vec!["Foreign", "M"]);
    }
}
