//! Criterion benchmarks for planning hot paths.
//!
//! Benchmarks:
//! 1. Resolver on nested meta traits of increasing depth
//! 2. Method expansion (selections × parameter values)
//! 3. Variant ordering across a class

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tessera_core::model::{AttrValue, DeclaredTrait, TestTrait};
use tessera_core::precedence::sort_variants;
use tessera_core::vocabulary::*;
use tessera_core::{
    Expander, MethodParam, RegistryBuilder, ResolutionContext, Resolver, StaticDeviceState,
    TestClass, TestMethod, TraitDefinition, TraitRegistry,
};

// ── Helpers ──────────────────────────────────────────────────────────

/// Chain of metas `Meta{depth-1} → ... → Meta0 → Leaf`, each with a side leaf.
fn chain_context(depth: usize) -> ResolutionContext {
    let mut b = RegistryBuilder::framework();
    b.register(TraitDefinition::leaf("tessera.bench.Leaf").with_weight(1));
    for i in 0..depth {
        let side = format!("tessera.bench.Side{i}");
        b.register(TraitDefinition::leaf(side.as_str()).with_weight(i as i32));
        let below = if i == 0 {
            "tessera.bench.Leaf".to_string()
        } else {
            format!("tessera.bench.Meta{}", i - 1)
        };
        b.register(TraitDefinition::meta(
            format!("tessera.bench.Meta{i}").as_str(),
            vec![DeclaredTrait::new(below.as_str()), DeclaredTrait::new(side.as_str())],
        ));
    }
    ResolutionContext::new(b.build().unwrap(), StaticDeviceState::headless())
}

fn user_method(users: &[&str], values: usize) -> TestMethod {
    let axis: Vec<i64> = (0..values as i64).collect();
    TestMethod::new("m")
        .with_trait(DeclaredTrait::new(USER_TEST).with_strs(VALUE, users))
        .with_trait(require_run_on_initial_user(OptionalBool::True))
        .with_param(MethodParam::new(
            "n",
            vec![DeclaredTrait::new(INT_TEST_PARAMETER)
                .with(VALUE, AttrValue::IntList(axis))
                .into()],
        ))
}

const USERS: &[&str] = &[
    "SYSTEM_USER",
    "PRIMARY_USER",
    "SECONDARY_USER",
    "WORK_PROFILE",
    "TV_PROFILE",
    "CLONE_PROFILE",
    "INITIAL_USER",
    "ADDITIONAL_USER",
];

// ── 1. Resolver ──────────────────────────────────────────────────────

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for depth in [4usize, 16, 64] {
        let ctx = chain_context(depth);
        let top = vec![TestTrait::declared(
            format!("tessera.bench.Meta{}", depth - 1).as_str(),
        )];
        group.bench_with_input(BenchmarkId::new("meta_chain", depth), &depth, |b, _| {
            let resolver = Resolver::new(&ctx);
            b.iter(|| resolver.resolve(black_box(&top), None).unwrap())
        });
    }
    group.finish();
}

// ── 2. Expansion ─────────────────────────────────────────────────────

fn bench_expand(c: &mut Criterion) {
    let ctx = ResolutionContext::new(TraitRegistry::framework().unwrap(), StaticDeviceState::headless());
    let class = TestClass::new("C");
    let mut group = c.benchmark_group("expand");
    for values in [1usize, 8, 32] {
        let method = user_method(USERS, values);
        group.bench_with_input(BenchmarkId::new("users_x_ints", values), &values, |b, _| {
            let expander = Expander::new(&ctx);
            b.iter(|| expander.expand_method(&class, black_box(&method)).unwrap())
        });
    }
    group.finish();
}

// ── 3. Variant ordering ──────────────────────────────────────────────

fn bench_sort_variants(c: &mut Criterion) {
    let ctx = ResolutionContext::new(TraitRegistry::framework().unwrap(), StaticDeviceState::default());
    let class = (0..8).fold(TestClass::new("C"), |class, i| {
        class.with_method(TestMethod {
            name: format!("m{i}"),
            ..user_method(&USERS[..=i], 4)
        })
    });
    let expander = Expander::new(&ctx);
    let variants: Vec<_> = class
        .methods
        .iter()
        .flat_map(|m| expander.expand_method(&class, m).unwrap())
        .collect();

    c.bench_function("sort_variants_class", |b| {
        b.iter(|| {
            let mut v = variants.clone();
            sort_variants(ctx.registry(), black_box(&mut v));
            v
        })
    });
}

criterion_group!(benches, bench_resolve, bench_expand, bench_sort_variants);
criterion_main!(benches);
