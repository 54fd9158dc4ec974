//! Feature-flag tests → a flag-on and a flag-off alternative.

use super::{Prepass, PrepassError};
use crate::context::ResolutionContext;
use crate::model::{CompositeTrait, DeclaredTrait, TestTrait};
use crate::vocabulary as v;

pub struct FlagPass;

impl Prepass for FlagPass {
    fn name(&self) -> &'static str {
        "flag"
    }

    fn rewrite(
        &self,
        _ctx: &ResolutionContext,
        t: &DeclaredTrait,
    ) -> Result<Option<Vec<TestTrait>>, PrepassError> {
        if t.type_id.as_str() != v::RUN_WITH_FEATURE_FLAG_ENABLED_AND_DISABLED {
            return Ok(None);
        }
        let namespace = t.str_attr(v::NAMESPACE)?;
        let key = t.str_attr(v::KEY)?;
        Ok(Some(vec![
            CompositeTrait::from_declared(
                format!("{namespace}_{key}_true"),
                vec![v::ensure_feature_flag_enabled(namespace, key)],
            )
            .into(),
            CompositeTrait::from_declared(
                format!("{namespace}_{key}_false"),
                vec![v::ensure_feature_flag_not_enabled(namespace, key)],
            )
            .into(),
        ]))
    }
}
