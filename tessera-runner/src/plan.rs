//! Suite planning — expand every class of a suite into ordered variants.

use crate::suite::LoadedSuite;
use serde::Serialize;
use tessera_core::{ExpandError, Expander, Variant, VariantFingerprint};
use tracing::info;

/// Variants of one class in run order.
#[derive(Debug, Clone)]
pub struct ClassPlan {
    pub class: String,
    pub variants: Vec<Variant>,
}

/// Serializable view of a planned variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedVariant {
    pub name: String,
    pub qualified_name: String,
    pub selection: Option<String>,
    pub params: Vec<(String, String)>,
    pub traits: Vec<String>,
    pub fingerprint: VariantFingerprint,
    pub ignored: bool,
}

impl From<&Variant> for PlannedVariant {
    fn from(v: &Variant) -> Self {
        Self {
            name: v.name(),
            qualified_name: v.qualified_name(),
            selection: v.selection().map(|s| s.parameter_name().to_string()),
            params: v
                .params()
                .iter()
                .map(|p| (p.name.clone(), p.value.to_string()))
                .collect(),
            traits: v.traits().iter().map(ToString::to_string).collect(),
            fingerprint: v.fingerprint(),
            ignored: v.is_ignored(),
        }
    }
}

impl ClassPlan {
    pub fn planned(&self) -> Vec<PlannedVariant> {
        self.variants.iter().map(PlannedVariant::from).collect()
    }
}

/// Expand every class. Fails on the first method that cannot be expanded.
pub fn plan_suite(suite: &LoadedSuite) -> Result<Vec<ClassPlan>, ExpandError> {
    let expander = Expander::new(&suite.context);
    let plans = suite
        .classes
        .iter()
        .map(|class| {
            expander.expand_class(class).map(|variants| ClassPlan {
                class: class.name.clone(),
                variants,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        classes = plans.len(),
        variants = plans.iter().map(|p| p.variants.len()).sum::<usize>(),
        "suite planned"
    );
    Ok(plans)
}
