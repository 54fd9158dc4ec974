//! Precedence — trait ordering within a list and variant ordering in a class.
//!
//! Trait order: foreign traits (outside the framework namespace) first, then
//! framework traits by ascending weight. Composites and unweighted traits
//! share the `NOT_IMPORTANT` weight and therefore sort last. All sorts are
//! stable, so equal keys keep their input order.
//!
//! Variant order: framework traits are ranked by how many variants carry
//! them (most frequent first, first-seen on ties); variants are then ordered
//! lexicographically on "does not have / has" for each ranked trait type.

use crate::model::{DeclaredTrait, TestTrait, TraitTypeId};
use crate::registry::TraitRegistry;
use crate::variant::Variant;
use indexmap::IndexMap;

pub const FIRST: i32 = 0;
pub const EARLY: i32 = 10;
pub const MIDDLE: i32 = 50;
pub const LATE: i32 = 90;
pub const LAST: i32 = 100;
pub const NOT_IMPORTANT: i32 = i32::MAX;

/// Sort key of a single trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrecedenceKey {
    Foreign,
    Framework(i32),
}

pub fn precedence_key(registry: &TraitRegistry, t: &TestTrait) -> PrecedenceKey {
    match t {
        TestTrait::Composite(_) => PrecedenceKey::Framework(NOT_IMPORTANT),
        TestTrait::Declared(d) => {
            if !registry.namespaces().is_framework(&d.type_id) {
                return PrecedenceKey::Foreign;
            }
            let weight = registry
                .get(&d.type_id)
                .and_then(|def| def.weight)
                .unwrap_or(NOT_IMPORTANT);
            PrecedenceKey::Framework(weight)
        }
    }
}

/// Stable precedence sort.
pub fn sort_traits(registry: &TraitRegistry, traits: &mut [TestTrait]) {
    traits.sort_by_key(|t| precedence_key(registry, t));
}

/// Framework trait types ranked by descending frequency across `variants`.
///
/// Frequency is counted per distinct trait instance, so two variants whose
/// traits differ only in attributes contribute two entries of the same type.
pub fn rank_trait_types(registry: &TraitRegistry, variants: &[Variant]) -> Vec<TraitTypeId> {
    let mut counts: IndexMap<&DeclaredTrait, usize> = IndexMap::new();
    for variant in variants {
        for d in variant.traits().iter().filter_map(TestTrait::as_declared) {
            if registry.namespaces().is_framework(&d.type_id) {
                *counts.entry(d).or_insert(0) += 1;
            }
        }
    }
    let mut ranked: Vec<(&DeclaredTrait, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().map(|(d, _)| d.type_id.clone()).collect()
}

/// Order variants so that runs sharing common traits are adjacent, and a
/// variant carrying a trait type the other lacks comes later.
pub fn sort_variants(registry: &TraitRegistry, variants: &mut [Variant]) {
    let ranked = rank_trait_types(registry, variants);
    variants.sort_by_cached_key(|v| ranked.iter().map(|ty| v.has(ty.as_str())).collect::<Vec<bool>>());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompositeTrait;
    use crate::registry::{Namespaces, RegistryBuilder, TraitDefinition};

    fn registry() -> TraitRegistry {
        let mut b = RegistryBuilder::new(Namespaces::default());
        b.register(TraitDefinition::leaf("tessera.X").with_weight(1));
        b.register(TraitDefinition::leaf("tessera.Y").with_weight(5));
        b.register(TraitDefinition::leaf("tessera.Unweighted"));
        b.register(TraitDefinition::leaf("acme.Foreign"));
        b.build().unwrap()
    }

    fn names(traits: &[TestTrait]) -> Vec<&str> {
        traits.iter().map(TestTrait::parameter_name).collect()
    }

    #[test]
    fn foreign_first_then_weight_then_not_important() {
        let r = registry();
        let mut traits = vec![
            TestTrait::Composite(CompositeTrait::new("Combo", vec![])),
            TestTrait::declared("tessera.Unweighted"),
            TestTrait::declared("tessera.Y"),
            TestTrait::declared("acme.Foreign"),
            TestTrait::declared("tessera.X"),
        ];
        sort_traits(&r, &mut traits);
        assert_eq!(names(&traits), vec!["Foreign", "X", "Y", "Combo", "Unweighted"]);
    }

    #[test]
    fn equal_weights_keep_input_order() {
        let r = registry();
        let a = TestTrait::Declared(DeclaredTrait::new("tessera.X").with_str("k", "a"));
        let b = TestTrait::Declared(DeclaredTrait::new("tessera.X").with_str("k", "b"));
        let mut traits = vec![b.clone(), a.clone()];
        sort_traits(&r, &mut traits);
        assert_eq!(traits, vec![b, a]);
    }

    #[test]
    fn unregistered_framework_type_is_not_important() {
        let r = registry();
        let key = precedence_key(&r, &TestTrait::declared("tessera.Unknown"));
        assert_eq!(key, PrecedenceKey::Framework(NOT_IMPORTANT));
        assert!(PrecedenceKey::Foreign < PrecedenceKey::Framework(FIRST));
    }
}
