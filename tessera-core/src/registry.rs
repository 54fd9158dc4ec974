//! Trait registry — static table mapping each trait type to its definition.
//!
//! The registry is built once, validated, and then shared read-only by the
//! resolver, the pre-passes and the expander. Validation rejects:
//! - duplicate trait types
//! - sub-traits (or nested payloads) naming unregistered types
//! - leaf, repeating and axis types declaring sub-traits
//! - cycles in the "has sub-trait" graph

use crate::model::{DeclaredTrait, TestTrait, TraitKind, TraitTypeId};
use crate::special::SpecialExpansion;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("trait type registered twice: {0}")]
    Duplicate(TraitTypeId),
    #[error("trait type {owner} references unregistered trait type {missing}")]
    UnknownSubTrait {
        owner: TraitTypeId,
        missing: TraitTypeId,
    },
    #[error("{kind} trait type {id} cannot declare sub-traits")]
    UnexpectedSubTraits { id: TraitTypeId, kind: TraitKind },
    #[error("trait type {0} expands into itself")]
    Cycle(TraitTypeId),
}

// ─── Namespaces ──────────────────────────────────────────────────────

/// Namespace rules applied during resolution and sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    /// Traits outside this namespace are foreign and always sort first.
    pub framework: String,
    /// Sub-traits in these namespaces are never expanded. A pattern ending
    /// in `.*` matches the prefix and everything nested below it.
    pub ignored: Vec<String>,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            framework: "tessera".to_string(),
            ignored: vec![
                "tessera.meta".to_string(),
                "org.junit".to_string(),
                "kotlin.*".to_string(),
                "java.lang.annotation".to_string(),
            ],
        }
    }
}

impl Namespaces {
    pub fn is_framework(&self, id: &TraitTypeId) -> bool {
        id.in_namespace(&self.framework)
    }

    pub fn is_ignored(&self, id: &TraitTypeId) -> bool {
        self.ignored.iter().any(|pattern| match pattern.strip_suffix(".*") {
            Some(prefix) => id.in_namespace(prefix),
            None => id.namespace() == pattern,
        })
    }
}

// ─── Definitions ─────────────────────────────────────────────────────

/// Static description of one trait type.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitDefinition {
    pub id: TraitTypeId,
    pub kind: TraitKind,
    /// Precedence weight; `None` sorts as not important.
    pub weight: Option<i32>,
    /// Traits this type expands into (meta and parameterized types).
    pub sub_traits: Vec<DeclaredTrait>,
    /// Trait types that this one makes redundant when both are present.
    pub shadows: Vec<TraitTypeId>,
    /// Device-dependent rewrite applied instead of sub-trait expansion.
    pub special: Option<SpecialExpansion>,
    /// False for parameterized markers that must not produce a run.
    pub generates_run: bool,
}

impl TraitDefinition {
    pub fn new(id: impl Into<TraitTypeId>, kind: TraitKind) -> Self {
        Self {
            id: id.into(),
            kind,
            weight: None,
            sub_traits: Vec::new(),
            shadows: Vec::new(),
            special: None,
            generates_run: true,
        }
    }

    pub fn leaf(id: impl Into<TraitTypeId>) -> Self {
        Self::new(id, TraitKind::Leaf)
    }

    pub fn meta(id: impl Into<TraitTypeId>, sub_traits: Vec<DeclaredTrait>) -> Self {
        Self::new(id, TraitKind::Meta).with_sub_traits(sub_traits)
    }

    pub fn parameterized(id: impl Into<TraitTypeId>, sub_traits: Vec<DeclaredTrait>) -> Self {
        Self::new(id, TraitKind::Parameterized).with_sub_traits(sub_traits)
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_sub_traits(mut self, sub_traits: Vec<DeclaredTrait>) -> Self {
        self.sub_traits = sub_traits;
        self
    }

    pub fn with_shadows(mut self, shadows: Vec<TraitTypeId>) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn with_special(mut self, special: SpecialExpansion) -> Self {
        self.special = Some(special);
        self
    }

    pub fn without_run(mut self) -> Self {
        self.generates_run = false;
        self
    }
}

// ─── Builder ─────────────────────────────────────────────────────────

/// Collects definitions; `build` validates them into a `TraitRegistry`.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    namespaces: Namespaces,
    defs: Vec<TraitDefinition>,
}

impl RegistryBuilder {
    pub fn new(namespaces: Namespaces) -> Self {
        Self {
            namespaces,
            defs: Vec::new(),
        }
    }

    pub fn register(&mut self, def: TraitDefinition) -> &mut Self {
        self.defs.push(def);
        self
    }

    pub fn extend(&mut self, defs: impl IntoIterator<Item = TraitDefinition>) -> &mut Self {
        self.defs.extend(defs);
        self
    }

    pub fn build(self) -> Result<TraitRegistry, RegistryError> {
        let mut defs: HashMap<TraitTypeId, TraitDefinition> = HashMap::with_capacity(self.defs.len());
        for def in self.defs {
            if matches!(def.kind, TraitKind::Leaf | TraitKind::Repeating | TraitKind::Axis(_))
                && !def.sub_traits.is_empty()
            {
                return Err(RegistryError::UnexpectedSubTraits {
                    id: def.id,
                    kind: def.kind,
                });
            }
            if defs.contains_key(&def.id) {
                return Err(RegistryError::Duplicate(def.id));
            }
            defs.insert(def.id.clone(), def);
        }

        check_acyclic(&self.namespaces, &defs)?;

        debug!(trait_types = defs.len(), "trait registry built");
        Ok(TraitRegistry {
            namespaces: self.namespaces,
            defs,
        })
    }
}

/// Every referenced framework type must be registered and the expansion
/// graph acyclic. Foreign and ignored-namespace sub-traits are terminals
/// and need no definition.
fn check_acyclic(
    namespaces: &Namespaces,
    defs: &HashMap<TraitTypeId, TraitDefinition>,
) -> Result<(), RegistryError> {
    let mut sorted: Vec<&TraitDefinition> = defs.values().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for def in &sorted {
        graph.add_node(def.id.as_str());
    }
    for def in &sorted {
        let referenced = def
            .sub_traits
            .iter()
            .flat_map(|sub| std::iter::once(sub).chain(sub.nested_traits()));
        for sub in referenced {
            if !defs.contains_key(&sub.type_id) {
                if namespaces.is_framework(&sub.type_id) && !namespaces.is_ignored(&sub.type_id) {
                    return Err(RegistryError::UnknownSubTrait {
                        owner: def.id.clone(),
                        missing: sub.type_id.clone(),
                    });
                }
                continue;
            }
            if sub.type_id == def.id {
                return Err(RegistryError::Cycle(def.id.clone()));
            }
            graph.add_edge(def.id.as_str(), sub.type_id.as_str(), ());
        }
    }
    toposort(&graph, None)
        .map(|_| ())
        .map_err(|cycle| RegistryError::Cycle(TraitTypeId::new(cycle.node_id())))
}

// ─── Registry ────────────────────────────────────────────────────────

/// Validated, read-only trait type table.
#[derive(Debug, Clone)]
pub struct TraitRegistry {
    namespaces: Namespaces,
    defs: HashMap<TraitTypeId, TraitDefinition>,
}

impl TraitRegistry {
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn get(&self, id: &TraitTypeId) -> Option<&TraitDefinition> {
        self.defs.get(id)
    }

    pub fn contains(&self, id: &TraitTypeId) -> bool {
        self.defs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions in type-id order.
    pub fn definitions(&self) -> Vec<&TraitDefinition> {
        let mut all: Vec<&TraitDefinition> = self.defs.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Composites are always parameterized; declared traits per their type.
    pub fn is_parameterized(&self, t: &TestTrait) -> bool {
        match t {
            TestTrait::Composite(_) => true,
            TestTrait::Declared(d) => self
                .get(&d.type_id)
                .is_some_and(|def| def.kind == TraitKind::Parameterized),
        }
    }

    /// False only for parameterized markers registered with `without_run`.
    pub fn generates_run(&self, t: &TestTrait) -> bool {
        match t {
            TestTrait::Composite(_) => true,
            TestTrait::Declared(d) => self.get(&d.type_id).map_or(true, |def| def.generates_run),
        }
    }

    /// Unregistered types in `t`, including nested payloads.
    pub fn unknown_types(&self, t: &TestTrait) -> Vec<TraitTypeId> {
        let mut missing = Vec::new();
        self.collect_unknown(t, &mut missing);
        missing
    }

    fn collect_unknown(&self, t: &TestTrait, out: &mut Vec<TraitTypeId>) {
        match t {
            TestTrait::Declared(d) => {
                for id in std::iter::once(d).chain(d.nested_traits()).map(|x| &x.type_id) {
                    if !self.contains(id) && !out.contains(id) {
                        out.push(id.clone());
                    }
                }
            }
            TestTrait::Composite(c) => {
                for inner in &c.traits {
                    self.collect_unknown(inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RegistryBuilder {
        RegistryBuilder::new(Namespaces::default())
    }

    #[test]
    fn ignored_namespace_patterns() {
        let ns = Namespaces::default();
        assert!(ns.is_ignored(&TraitTypeId::new("org.junit.Ignore")));
        assert!(ns.is_ignored(&TraitTypeId::new("kotlin.jvm.JvmStatic")));
        assert!(ns.is_ignored(&TraitTypeId::new("kotlin.Metadata")));
        assert!(!ns.is_ignored(&TraitTypeId::new("org.junit.runner.RunWith")));
        assert!(!ns.is_ignored(&TraitTypeId::new("tessera.users.RequireRunOnSystemUser")));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut b = builder();
        b.register(TraitDefinition::leaf("tessera.A"));
        b.register(TraitDefinition::leaf("tessera.A"));
        assert_eq!(
            b.build().unwrap_err(),
            RegistryError::Duplicate(TraitTypeId::new("tessera.A"))
        );
    }

    #[test]
    fn unknown_sub_trait_is_rejected() {
        let mut b = builder();
        b.register(TraitDefinition::meta(
            "tessera.M",
            vec![DeclaredTrait::new("tessera.Missing")],
        ));
        assert!(matches!(
            b.build(),
            Err(RegistryError::UnknownSubTrait { .. })
        ));
    }

    #[test]
    fn leaf_with_sub_traits_is_rejected() {
        let mut b = builder();
        b.register(TraitDefinition::leaf("tessera.A"));
        b.register(TraitDefinition::leaf("tessera.L").with_sub_traits(vec![DeclaredTrait::new("tessera.A")]));
        assert!(matches!(
            b.build(),
            Err(RegistryError::UnexpectedSubTraits { .. })
        ));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut b = builder();
        b.register(TraitDefinition::meta("tessera.M", vec![DeclaredTrait::new("tessera.M")]));
        assert_eq!(
            b.build().unwrap_err(),
            RegistryError::Cycle(TraitTypeId::new("tessera.M"))
        );
    }

    #[test]
    fn indirect_cycle_is_rejected() {
        let mut b = builder();
        b.register(TraitDefinition::meta("tessera.A", vec![DeclaredTrait::new("tessera.B")]));
        b.register(TraitDefinition::meta("tessera.B", vec![DeclaredTrait::new("tessera.C")]));
        b.register(TraitDefinition::meta("tessera.C", vec![DeclaredTrait::new("tessera.A")]));
        assert!(matches!(b.build(), Err(RegistryError::Cycle(_))));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut b = builder();
        b.register(TraitDefinition::leaf("tessera.D"));
        b.register(TraitDefinition::meta("tessera.B", vec![DeclaredTrait::new("tessera.D")]));
        b.register(TraitDefinition::meta("tessera.C", vec![DeclaredTrait::new("tessera.D")]));
        b.register(TraitDefinition::meta(
            "tessera.A",
            vec![DeclaredTrait::new("tessera.B"), DeclaredTrait::new("tessera.C")],
        ));
        let registry = b.build().unwrap();
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn definitions_are_listed_in_id_order() {
        let mut b = builder();
        b.register(TraitDefinition::leaf("tessera.Z"));
        b.register(TraitDefinition::leaf("tessera.A"));
        let registry = b.build().unwrap();
        let ids: Vec<&str> = registry.definitions().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["tessera.A", "tessera.Z"]);
    }

    #[test]
    fn foreign_and_ignored_sub_traits_need_no_definition() {
        let mut b = builder();
        b.register(TraitDefinition::meta(
            "tessera.test.M",
            vec![
                DeclaredTrait::new("java.lang.annotation.Retention"),
                DeclaredTrait::new("acme.Foreign"),
            ],
        ));
        let registry = b.build().unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn cycle_error_names_the_same_trait_whatever_the_registration_order() {
        let defs = || {
            vec![
                TraitDefinition::meta("tessera.A", vec![DeclaredTrait::new("tessera.B")]),
                TraitDefinition::meta("tessera.B", vec![DeclaredTrait::new("tessera.A")]),
                TraitDefinition::meta("tessera.X", vec![DeclaredTrait::new("tessera.Y")]),
                TraitDefinition::meta("tessera.Y", vec![DeclaredTrait::new("tessera.X")]),
            ]
        };
        let mut first = builder();
        first.extend(defs());
        let expected = first.build().unwrap_err();

        for _ in 0..8 {
            let mut b = builder();
            b.extend(defs().into_iter().rev());
            assert_eq!(b.build().unwrap_err(), expected);
        }
    }
}
