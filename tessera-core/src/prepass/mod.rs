//! Pre-passes — rewrite sugar traits into parameterized alternatives.
//!
//! Each pass scans the trait list once and splices a precedence-sorted
//! replacement in place of every sugar trait it recognizes. Passes run in a
//! fixed order:
//! - enterprise policy tests (`PolicyAppliesTest`, `CanSetPolicyTest`, ...)
//! - permission tests
//! - user and cross-user tests
//! - feature-flag tests

pub mod enterprise;
pub mod flag;
pub mod permission;
pub mod user;

pub use enterprise::EnterprisePass;
pub use flag::FlagPass;
pub use permission::PermissionPass;
pub use user::UserPass;

use crate::context::ResolutionContext;
use crate::model::{AttrError, DeclaredTrait, TestTrait};
use crate::policy::PolicyError;
use crate::precedence::sort_traits;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrepassError {
    #[error(transparent)]
    Attr(#[from] AttrError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("unknown user type '{0}'")]
    UnknownUserType(String),
    #[error("user type {0} cannot be a run target")]
    IncompatibleUserType(String),
    #[error("malformed user pair '{0}', expected FROM:TO")]
    MalformedUserPair(String),
}

/// One sugar-rewriting pass.
pub trait Prepass {
    fn name(&self) -> &'static str;

    /// Replacement for `t`, or `None` if this pass does not handle it.
    fn rewrite(
        &self,
        ctx: &ResolutionContext,
        t: &DeclaredTrait,
    ) -> Result<Option<Vec<TestTrait>>, PrepassError>;
}

/// Run every pass, in order, over `traits`.
pub fn apply_prepasses(
    ctx: &ResolutionContext,
    traits: Vec<TestTrait>,
) -> Result<Vec<TestTrait>, PrepassError> {
    let passes: [&dyn Prepass; 4] = [&EnterprisePass, &PermissionPass, &UserPass, &FlagPass];
    passes
        .into_iter()
        .try_fold(traits, |traits, pass| run_pass(ctx, pass, traits))
}

fn run_pass(
    ctx: &ResolutionContext,
    pass: &dyn Prepass,
    traits: Vec<TestTrait>,
) -> Result<Vec<TestTrait>, PrepassError> {
    let mut out = Vec::with_capacity(traits.len());
    for t in traits {
        let rewritten = match &t {
            TestTrait::Declared(d) => pass.rewrite(ctx, d)?,
            TestTrait::Composite(_) => None,
        };
        match rewritten {
            Some(mut replacement) => {
                sort_traits(ctx.registry(), &mut replacement);
                debug!(
                    pass = pass.name(),
                    sugar = %t.parameter_name(),
                    generated = replacement.len(),
                    "sugar trait rewritten"
                );
                out.extend(replacement);
            }
            None => out.push(t),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::StaticDeviceState;
    use crate::registry::TraitRegistry;
    use crate::vocabulary::*;

    #[test]
    fn untouched_traits_keep_their_position() {
        let ctx = ResolutionContext::new(TraitRegistry::framework().unwrap(), StaticDeviceState::default());
        let input = vec![
            TestTrait::declared(REQUIRE_RUN_ON_SYSTEM_USER),
            DeclaredTrait::new(RUN_WITH_FEATURE_FLAG_ENABLED_AND_DISABLED)
                .with_str(NAMESPACE, "ns")
                .with_str(KEY, "k")
                .into(),
            TestTrait::declared("acme.Foreign"),
        ];
        let out = apply_prepasses(&ctx, input).unwrap();
        let names: Vec<&str> = out.iter().map(TestTrait::parameter_name).collect();
        assert_eq!(
            names,
            vec!["RequireRunOnSystemUser", "ns_k_true", "ns_k_false", "Foreign"]
        );
    }
}
