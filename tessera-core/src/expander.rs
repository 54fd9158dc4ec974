//! Expander — turns a test method into its concrete variants.
//!
//! Expansion of one method:
//! 1. Trait list: class traits (sorted) followed by method traits (sorted),
//!    passed through the pre-passes.
//! 2. Selections: the distinct parameterized traits of that list. No
//!    selections yields a single unselected variant; selections whose type
//!    does not generate a run are skipped.
//! 3. Each selection resolves the trait list into one variant.
//! 4. Every method parameter multiplies the variants by the values of its
//!    axis-marking trait, in declaration order.
//!
//! `expand_class` expands every method and orders the combined result with
//! `precedence::sort_variants`.

use crate::context::ResolutionContext;
use crate::model::{AttrError, AxisKind, ParamValue, TestTrait, TraitKind};
use crate::precedence::{sort_traits, sort_variants};
use crate::prepass::{apply_prepasses, PrepassError};
use crate::resolver::{ResolveError, Resolver};
use crate::variant::{MethodId, Variant};
use crate::vocabulary;
use std::fmt;
use thiserror::Error;
use tracing::debug;

// ─── Test declarations ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParam {
    pub name: String,
    pub traits: Vec<TestTrait>,
}

impl MethodParam {
    pub fn new(name: impl Into<String>, traits: Vec<TestTrait>) -> Self {
        Self {
            name: name.into(),
            traits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestMethod {
    pub name: String,
    pub traits: Vec<TestTrait>,
    pub params: Vec<MethodParam>,
}

impl TestMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_trait(mut self, t: impl Into<TestTrait>) -> Self {
        self.traits.push(t.into());
        self
    }

    pub fn with_param(mut self, param: MethodParam) -> Self {
        self.params.push(param);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestClass {
    pub name: String,
    pub traits: Vec<TestTrait>,
    pub methods: Vec<TestMethod>,
}

impl TestClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_trait(mut self, t: impl Into<TestTrait>) -> Self {
        self.traits.push(t.into());
        self
    }

    pub fn with_method(mut self, method: TestMethod) -> Self {
        self.methods.push(method);
        self
    }
}

// ─── Error type ──────────────────────────────────────────────────────

/// Why a single parameter could not be bound to values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamProblem {
    MissingAxis { param: String },
    AmbiguousAxis { param: String, found: usize },
    BadAxis { param: String, source: AttrError },
}

impl fmt::Display for ParamProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamProblem::MissingAxis { param } => {
                write!(f, "parameter '{param}' has no axis-marking trait")
            }
            ParamProblem::AmbiguousAxis { param, found } => {
                write!(f, "parameter '{param}' has {found} axis-marking traits, expected one")
            }
            ParamProblem::BadAxis { param, source } => {
                write!(f, "parameter '{param}': {source}")
            }
        }
    }
}

fn join_problems(problems: &[ParamProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("{method}: {source}")]
    Prepass {
        method: MethodId,
        #[source]
        source: PrepassError,
    },
    #[error("{method}: {source}")]
    Resolve {
        method: MethodId,
        #[source]
        source: ResolveError,
    },
    #[error("{class}: class declares no test methods")]
    EmptyClass { class: String },
    #[error("{method}: {}", join_problems(.problems))]
    Params {
        method: MethodId,
        problems: Vec<ParamProblem>,
    },
}

// ─── Expander ────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub struct Expander<'a> {
    ctx: &'a ResolutionContext,
}

impl<'a> Expander<'a> {
    pub fn new(ctx: &'a ResolutionContext) -> Self {
        Self { ctx }
    }

    /// Every variant of every method, in run order.
    pub fn expand_class(&self, class: &TestClass) -> Result<Vec<Variant>, ExpandError> {
        if class.methods.is_empty() {
            return Err(ExpandError::EmptyClass {
                class: class.name.clone(),
            });
        }
        let mut variants = Vec::new();
        for method in &class.methods {
            variants.extend(self.expand_method(class, method)?);
        }
        sort_variants(self.ctx.registry(), &mut variants);
        debug!(class = %class.name, variants = variants.len(), "expanded class");
        Ok(variants)
    }

    /// Variants of one method, in generation order.
    pub fn expand_method(
        &self,
        class: &TestClass,
        method: &TestMethod,
    ) -> Result<Vec<Variant>, ExpandError> {
        let id = MethodId::new(&class.name, &method.name);
        let traits = self.trait_list(&id, class, method)?;
        let resolver = Resolver::new(self.ctx);
        let registry = self.ctx.registry();

        let mut selections: Vec<&TestTrait> = Vec::new();
        let mut skipped = 0usize;
        for t in traits.iter().filter(|t| registry.is_parameterized(t)) {
            if selections.contains(&t) {
                continue;
            }
            if !registry.generates_run(t) {
                debug!(method = %id, selection = t.parameter_name(), "selection skipped");
                skipped += 1;
                continue;
            }
            selections.push(t);
        }

        let resolve = |selection: Option<&TestTrait>| -> Result<Variant, ExpandError> {
            resolver
                .resolve(&traits, selection)
                .map(|resolved| Variant::new(id.clone(), selection.cloned(), resolved))
                .map_err(|source| ExpandError::Resolve {
                    method: id.clone(),
                    source,
                })
        };

        let mut variants = if selections.is_empty() && skipped == 0 {
            vec![resolve(None)?]
        } else {
            selections
                .iter()
                .map(|s| resolve(Some(*s)))
                .collect::<Result<Vec<_>, _>>()?
        };

        for (param, values) in self.param_axes(&id, method)? {
            variants = variants
                .iter()
                .flat_map(|v| values.iter().map(|value| v.with_param(&param, value.clone())))
                .collect();
        }

        debug!(method = %id, variants = variants.len(), "expanded method");
        Ok(variants)
    }

    fn trait_list(
        &self,
        id: &MethodId,
        class: &TestClass,
        method: &TestMethod,
    ) -> Result<Vec<TestTrait>, ExpandError> {
        let registry = self.ctx.registry();
        let mut class_traits = class.traits.clone();
        sort_traits(registry, &mut class_traits);
        let mut method_traits = method.traits.clone();
        sort_traits(registry, &mut method_traits);
        class_traits.extend(method_traits);

        apply_prepasses(self.ctx, class_traits).map_err(|source| ExpandError::Prepass {
            method: id.clone(),
            source,
        })
    }

    /// Values for every parameter, failing with all problems at once.
    fn param_axes(
        &self,
        id: &MethodId,
        method: &TestMethod,
    ) -> Result<Vec<(String, Vec<ParamValue>)>, ExpandError> {
        let resolver = Resolver::new(self.ctx);
        let mut axes = Vec::with_capacity(method.params.len());
        let mut problems = Vec::new();

        for param in &method.params {
            let resolved = resolver
                .resolve(&param.traits, None)
                .map_err(|source| ExpandError::Resolve {
                    method: id.clone(),
                    source,
                })?;
            let markers: Vec<(AxisKind, &TestTrait)> = resolved
                .iter()
                .filter_map(|t| {
                    let def = self.ctx.registry().get(t.type_id()?)?;
                    match def.kind {
                        TraitKind::Axis(kind) => Some((kind, t)),
                        _ => None,
                    }
                })
                .collect();

            match markers.as_slice() {
                [] => problems.push(ParamProblem::MissingAxis {
                    param: param.name.clone(),
                }),
                [(kind, marker)] => match axis_values(*kind, marker) {
                    Ok(values) => axes.push((param.name.clone(), values)),
                    Err(source) => problems.push(ParamProblem::BadAxis {
                        param: param.name.clone(),
                        source,
                    }),
                },
                many => problems.push(ParamProblem::AmbiguousAxis {
                    param: param.name.clone(),
                    found: many.len(),
                }),
            }
        }

        if problems.is_empty() {
            Ok(axes)
        } else {
            Err(ExpandError::Params {
                method: id.clone(),
                problems,
            })
        }
    }
}

fn axis_values(kind: AxisKind, marker: &TestTrait) -> Result<Vec<ParamValue>, AttrError> {
    let Some(d) = marker.as_declared() else {
        return Ok(Vec::new());
    };
    let values = match kind {
        AxisKind::String => d
            .str_list(vocabulary::VALUE)?
            .into_iter()
            .map(ParamValue::Str)
            .collect(),
        AxisKind::Int => d
            .int_list(vocabulary::VALUE)?
            .into_iter()
            .map(ParamValue::Int)
            .collect(),
        AxisKind::Enum => {
            let enum_type = d.str_attr(vocabulary::ENUM)?.to_string();
            d.str_list(vocabulary::VALUE)?
                .into_iter()
                .map(|constant| ParamValue::Enum {
                    enum_type: enum_type.clone(),
                    constant,
                })
                .collect()
        }
    };
    Ok(values)
}
