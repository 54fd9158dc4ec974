//! Enterprise policy tests → one alternative per relevant DPC state.

use super::{Prepass, PrepassError};
use crate::context::ResolutionContext;
use crate::model::{DeclaredTrait, TestTrait};
use crate::policy::{merge_policies, PolicyStates};
use crate::vocabulary as v;

pub struct EnterprisePass;

impl Prepass for EnterprisePass {
    fn name(&self) -> &'static str {
        "enterprise"
    }

    fn rewrite(
        &self,
        ctx: &ResolutionContext,
        t: &DeclaredTrait,
    ) -> Result<Option<Vec<TestTrait>>, PrepassError> {
        let id = t.type_id.as_str();
        if ![
            v::POLICY_APPLIES_TEST,
            v::POLICY_DOES_NOT_APPLY_TEST,
            v::CAN_SET_POLICY_TEST,
            v::CANNOT_SET_POLICY_TEST,
        ]
        .contains(&id)
        {
            return Ok(None);
        }

        let names = t.str_list(v::POLICY)?;
        let policies = ctx.policies().lookup(&names)?;
        let merged = merge_policies(&policies)?;
        let states = PolicyStates::new(ctx.registry(), &merged);

        let generated = match id {
            v::POLICY_APPLIES_TEST => states.applies(),
            v::POLICY_DOES_NOT_APPLY_TEST => states.does_not_apply(),
            v::CAN_SET_POLICY_TEST => states.can_set(t.bool_attr_or(v::SINGLE_TEST_ONLY, false)?),
            _ => states.cannot_set(
                t.bool_attr_or(v::INCLUDE_DEVICE_ADMIN_STATES, true)?,
                t.bool_attr_or(v::INCLUDE_NON_DEVICE_ADMIN_STATES, true)?,
            ),
        };
        Ok(Some(generated))
    }
}
