//! Permission tests → one alternative per permission, holding only that one.

use super::{Prepass, PrepassError};
use crate::context::ResolutionContext;
use crate::model::{CompositeTrait, DeclaredTrait, TestTrait};
use crate::vocabulary as v;

pub struct PermissionPass;

impl Prepass for PermissionPass {
    fn name(&self) -> &'static str {
        "permission"
    }

    fn rewrite(
        &self,
        _ctx: &ResolutionContext,
        t: &DeclaredTrait,
    ) -> Result<Option<Vec<TestTrait>>, PrepassError> {
        if t.type_id.as_str() != v::PERMISSION_TEST {
            return Ok(None);
        }
        let permissions = t.str_list(v::VALUE)?;
        let generated: Vec<TestTrait> = permissions
            .iter()
            .map(|granted| {
                let others: Vec<&String> = permissions.iter().filter(|p| *p != granted).collect();
                CompositeTrait::from_declared(
                    granted.clone(),
                    vec![
                        v::ensure_has_permission(&[granted]),
                        v::ensure_does_not_have_permission(&others),
                    ],
                )
                .into()
            })
            .collect();
        Ok(Some(generated))
    }
}
