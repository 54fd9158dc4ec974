//! Special expansions — device-dependent rewrites of user-placement traits.
//!
//! A trait type carrying a `SpecialExpansion` is not expanded through its
//! sub-traits. Instead the rewrite below produces a short list that always
//! contains the original trait; the resolver keeps that trait as-is and
//! continues resolving the others.

use crate::device::DeviceState;
use crate::model::{AttrError, DeclaredTrait};
use crate::vocabulary::{self, OptionalBool};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialExpansion {
    /// "Run on the user the device boots into for interactive use."
    RunOnInitialUser,
    /// "Run on some user other than the initial one."
    RunOnAdditionalUser,
}

impl SpecialExpansion {
    /// Rewrite `t` for the given device. The output contains `t` itself.
    ///
    /// | trait               | headless                                   | otherwise                         |
    /// |---------------------|--------------------------------------------|-----------------------------------|
    /// | `RunOnInitialUser`  | `t`, has-secondary, run-on-secondary(s)    | `t`, run-on-primary(s)            |
    /// | `RunOnAdditionalUser` | has-secondary, `t`                       | `t`, run-on-secondary(s)          |
    ///
    /// `s` is the trait's `switched_to_user` attribute, forwarded verbatim.
    pub fn expand(
        self,
        device: &dyn DeviceState,
        t: &DeclaredTrait,
    ) -> Result<Vec<DeclaredTrait>, AttrError> {
        let headless = device.is_headless_system_user_mode();
        match self {
            SpecialExpansion::RunOnInitialUser => {
                let switched = switched_to_user(t, OptionalBool::True)?;
                if headless {
                    Ok(vec![
                        t.clone(),
                        vocabulary::ensure_has_secondary_user(),
                        vocabulary::require_run_on_secondary_user(switched),
                    ])
                } else {
                    Ok(vec![
                        t.clone(),
                        vocabulary::require_run_on_primary_user(switched),
                    ])
                }
            }
            SpecialExpansion::RunOnAdditionalUser => {
                let switched = switched_to_user(t, OptionalBool::Any)?;
                if headless {
                    Ok(vec![vocabulary::ensure_has_secondary_user(), t.clone()])
                } else {
                    Ok(vec![
                        t.clone(),
                        vocabulary::require_run_on_secondary_user(switched),
                    ])
                }
            }
        }
    }
}

fn switched_to_user(t: &DeclaredTrait, default: OptionalBool) -> Result<OptionalBool, AttrError> {
    let raw = t.str_attr_or(vocabulary::SWITCHED_TO_USER, default.as_str())?;
    raw.parse().map_err(|_| AttrError::InvalidValue {
        trait_type: t.type_id.clone(),
        attr: vocabulary::SWITCHED_TO_USER.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::StaticDeviceState;
    use crate::vocabulary::*;

    fn types(list: &[DeclaredTrait]) -> Vec<&str> {
        list.iter().map(|t| t.type_id.simple_name()).collect()
    }

    #[test]
    fn initial_user_headless() {
        let t = require_run_on_initial_user(OptionalBool::False);
        let out = SpecialExpansion::RunOnInitialUser
            .expand(&StaticDeviceState::headless(), &t)
            .unwrap();
        assert_eq!(
            types(&out),
            vec!["RequireRunOnInitialUser", "EnsureHasSecondaryUser", "RequireRunOnSecondaryUser"]
        );
        assert_eq!(out[0], t);
        assert_eq!(out[2].str_attr(SWITCHED_TO_USER).unwrap(), "FALSE");
    }

    #[test]
    fn initial_user_not_headless_defaults_switched_to_true() {
        let t = DeclaredTrait::new(REQUIRE_RUN_ON_INITIAL_USER);
        let out = SpecialExpansion::RunOnInitialUser
            .expand(&StaticDeviceState::default(), &t)
            .unwrap();
        assert_eq!(types(&out), vec!["RequireRunOnInitialUser", "RequireRunOnPrimaryUser"]);
        assert_eq!(out[1].str_attr(SWITCHED_TO_USER).unwrap(), "TRUE");
    }

    #[test]
    fn additional_user_headless_puts_secondary_first() {
        let t = require_run_on_additional_user();
        let out = SpecialExpansion::RunOnAdditionalUser
            .expand(&StaticDeviceState::headless(), &t)
            .unwrap();
        assert_eq!(types(&out), vec!["EnsureHasSecondaryUser", "RequireRunOnAdditionalUser"]);
    }

    #[test]
    fn additional_user_not_headless() {
        let t = require_run_on_additional_user();
        let out = SpecialExpansion::RunOnAdditionalUser
            .expand(&StaticDeviceState::default(), &t)
            .unwrap();
        assert_eq!(types(&out), vec!["RequireRunOnAdditionalUser", "RequireRunOnSecondaryUser"]);
        assert_eq!(out[1].str_attr(SWITCHED_TO_USER).unwrap(), "ANY");
    }

    #[test]
    fn additional_user_forwards_switched_to_user() {
        let t = require_run_on_additional_user().with_str(SWITCHED_TO_USER, "FALSE");
        let out = SpecialExpansion::RunOnAdditionalUser
            .expand(&StaticDeviceState::default(), &t)
            .unwrap();
        assert_eq!(out[0], t);
        assert_eq!(out[1].str_attr(SWITCHED_TO_USER).unwrap(), "FALSE");
    }

    #[test]
    fn malformed_switched_to_user_is_an_attribute_error() {
        let t = DeclaredTrait::new(REQUIRE_RUN_ON_INITIAL_USER).with_str(SWITCHED_TO_USER, "MAYBE");
        let err = SpecialExpansion::RunOnInitialUser
            .expand(&StaticDeviceState::default(), &t)
            .unwrap_err();
        assert!(matches!(err, AttrError::InvalidValue { ref value, .. } if value == "MAYBE"));
    }
}
