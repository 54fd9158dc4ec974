//! Built-in trait vocabulary.
//!
//! Trait type ids, attribute names, constructor helpers for the traits that
//! pre-passes and special expansions synthesize, and `framework_definitions`
//! which registers the whole vocabulary with its kinds and weights.

use crate::model::{AttrValue, AxisKind, DeclaredTrait, TraitKind};
use crate::precedence::{EARLY, FIRST, LATE, MIDDLE};
use crate::registry::{Namespaces, RegistryBuilder, RegistryError, TraitDefinition, TraitRegistry};
use crate::special::SpecialExpansion;
use std::fmt;
use std::str::FromStr;

// ─── Attribute names ─────────────────────────────────────────────────

pub const VALUE: &str = "value";
pub const SWITCHED_TO_USER: &str = "switched_to_user";
pub const NAMESPACE: &str = "namespace";
pub const KEY: &str = "key";
pub const POLICY: &str = "policy";
pub const SINGLE_TEST_ONLY: &str = "single_test_only";
pub const INCLUDE_DEVICE_ADMIN_STATES: &str = "include_device_admin_states";
pub const INCLUDE_NON_DEVICE_ADMIN_STATES: &str = "include_non_device_admin_states";
pub const ENUM: &str = "enum";
pub const REASON: &str = "reason";

// ─── Users ───────────────────────────────────────────────────────────

pub const REQUIRE_RUN_ON_SYSTEM_USER: &str = "tessera.users.RequireRunOnSystemUser";
pub const REQUIRE_RUN_ON_PRIMARY_USER: &str = "tessera.users.RequireRunOnPrimaryUser";
pub const REQUIRE_RUN_ON_SECONDARY_USER: &str = "tessera.users.RequireRunOnSecondaryUser";
pub const REQUIRE_RUN_ON_WORK_PROFILE: &str = "tessera.users.RequireRunOnWorkProfile";
pub const REQUIRE_RUN_ON_TV_PROFILE: &str = "tessera.users.RequireRunOnTvProfile";
pub const REQUIRE_RUN_ON_CLONE_PROFILE: &str = "tessera.users.RequireRunOnCloneProfile";
pub const REQUIRE_RUN_ON_INITIAL_USER: &str = "tessera.users.RequireRunOnInitialUser";
pub const REQUIRE_RUN_ON_ADDITIONAL_USER: &str = "tessera.users.RequireRunOnAdditionalUser";
pub const ENSURE_HAS_SECONDARY_USER: &str = "tessera.users.EnsureHasSecondaryUser";
pub const ENSURE_HAS_ADDITIONAL_USER: &str = "tessera.users.EnsureHasAdditionalUser";
pub const ENSURE_HAS_WORK_PROFILE: &str = "tessera.users.EnsureHasWorkProfile";
pub const ENSURE_HAS_TV_PROFILE: &str = "tessera.users.EnsureHasTvProfile";
pub const ENSURE_HAS_CLONE_PROFILE: &str = "tessera.users.EnsureHasCloneProfile";
pub const OTHER_USER: &str = "tessera.users.OtherUser";
pub const USER_TEST: &str = "tessera.users.UserTest";
pub const CROSS_USER_TEST: &str = "tessera.users.CrossUserTest";
pub const REQUIRE_NOT_HEADLESS_SYSTEM_USER_MODE: &str =
    "tessera.users.RequireNotHeadlessSystemUserMode";

// ─── Permissions ─────────────────────────────────────────────────────

pub const ENSURE_HAS_PERMISSION: &str = "tessera.permissions.EnsureHasPermission";
pub const ENSURE_DOES_NOT_HAVE_PERMISSION: &str = "tessera.permissions.EnsureDoesNotHavePermission";
pub const ENSURE_HAS_APP_OP: &str = "tessera.permissions.EnsureHasAppOp";
pub const ENSURE_DOES_NOT_HAVE_APP_OP: &str = "tessera.permissions.EnsureDoesNotHaveAppOp";
pub const PERMISSION_TEST: &str = "tessera.permissions.PermissionTest";

// ─── Feature flags ───────────────────────────────────────────────────

pub const ENSURE_FEATURE_FLAG_ENABLED: &str = "tessera.flags.EnsureFeatureFlagEnabled";
pub const ENSURE_FEATURE_FLAG_NOT_ENABLED: &str = "tessera.flags.EnsureFeatureFlagNotEnabled";
pub const ENSURE_FEATURE_FLAGS_ENABLED: &str = "tessera.flags.EnsureFeatureFlagsEnabled";
pub const RUN_WITH_FEATURE_FLAG_ENABLED_AND_DISABLED: &str =
    "tessera.flags.RunWithFeatureFlagEnabledAndDisabled";

// ─── Enterprise ──────────────────────────────────────────────────────

pub const ENSURE_HAS_DEVICE_OWNER: &str = "tessera.enterprise.EnsureHasDeviceOwner";
pub const ENSURE_HAS_NO_DEVICE_OWNER: &str = "tessera.enterprise.EnsureHasNoDeviceOwner";
pub const ENSURE_HAS_PROFILE_OWNER: &str = "tessera.enterprise.EnsureHasProfileOwner";
pub const ENSURE_HAS_DELEGATE: &str = "tessera.enterprise.EnsureHasDelegate";
pub const ENSURE_TEST_APP_INSTALLED: &str = "tessera.enterprise.EnsureTestAppInstalled";
pub const ENSURE_TEST_APP_HAS_PERMISSION: &str = "tessera.enterprise.EnsureTestAppHasPermission";
pub const ENSURE_TEST_APP_HAS_APP_OP: &str = "tessera.enterprise.EnsureTestAppHasAppOp";

pub const INCLUDE_RUN_ON_DEVICE_OWNER_USER: &str = "tessera.enterprise.IncludeRunOnDeviceOwnerUser";
pub const INCLUDE_RUN_ON_BACKGROUND_DEVICE_OWNER_USER: &str =
    "tessera.enterprise.IncludeRunOnBackgroundDeviceOwnerUser";
pub const INCLUDE_RUN_ON_AFFILIATED_DEVICE_OWNER_SECONDARY_USER: &str =
    "tessera.enterprise.IncludeRunOnAffiliatedDeviceOwnerSecondaryUser";
pub const INCLUDE_RUN_ON_UNAFFILIATED_DEVICE_OWNER_SECONDARY_USER: &str =
    "tessera.enterprise.IncludeRunOnUnaffiliatedDeviceOwnerSecondaryUser";
pub const INCLUDE_RUN_ON_PROFILE_OWNER_PRIMARY_USER: &str =
    "tessera.enterprise.IncludeRunOnProfileOwnerPrimaryUser";
pub const INCLUDE_RUN_ON_PROFILE_OWNER_PROFILE_WITH_NO_DEVICE_OWNER: &str =
    "tessera.enterprise.IncludeRunOnProfileOwnerProfileWithNoDeviceOwner";
pub const INCLUDE_RUN_ON_PARENT_OF_PROFILE_OWNER_WITH_NO_DEVICE_OWNER: &str =
    "tessera.enterprise.IncludeRunOnParentOfProfileOwnerWithNoDeviceOwner";
pub const INCLUDE_RUN_ON_ORGANIZATION_OWNED_PROFILE_OWNER: &str =
    "tessera.enterprise.IncludeRunOnOrganizationOwnedProfileOwner";
pub const INCLUDE_NONE: &str = "tessera.enterprise.IncludeNone";

pub const POLICY_APPLIES_TEST: &str = "tessera.enterprise.PolicyAppliesTest";
pub const POLICY_DOES_NOT_APPLY_TEST: &str = "tessera.enterprise.PolicyDoesNotApplyTest";
pub const CAN_SET_POLICY_TEST: &str = "tessera.enterprise.CanSetPolicyTest";
pub const CANNOT_SET_POLICY_TEST: &str = "tessera.enterprise.CannotSetPolicyTest";

// ─── Markers ─────────────────────────────────────────────────────────

pub const STRING_TEST_PARAMETER: &str = "tessera.meta.StringTestParameter";
pub const INT_TEST_PARAMETER: &str = "tessera.meta.IntTestParameter";
pub const ENUM_TEST_PARAMETER: &str = "tessera.meta.EnumTestParameter";
pub const PARAMETERIZED_MARKER: &str = "tessera.meta.ParameterizedMarker";
pub const REPEATING_MARKER: &str = "tessera.meta.RepeatingMarker";
pub const IGNORE: &str = "org.junit.Ignore";

// ─── Feature-flag constants used by enterprise states ────────────────

pub const DEVICE_POLICY_FLAG_NAMESPACE: &str = "device_policy_manager";
pub const POLICY_ENGINE_FLAG: &str = "enable_device_policy_engine";
pub const PERMISSION_ACCESS_FLAG: &str = "permission_based_access_experiment";

// ─── OptionalBool ────────────────────────────────────────────────────

/// Tri-state used by `switched_to_user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalBool {
    True,
    False,
    Any,
}

impl OptionalBool {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionalBool::True => "TRUE",
            OptionalBool::False => "FALSE",
            OptionalBool::Any => "ANY",
        }
    }
}

impl FromStr for OptionalBool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRUE" => Ok(OptionalBool::True),
            "FALSE" => Ok(OptionalBool::False),
            "ANY" => Ok(OptionalBool::Any),
            other => Err(format!("not an optional bool: {other}")),
        }
    }
}

impl fmt::Display for OptionalBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── UserType ────────────────────────────────────────────────────────

/// User kinds accepted by the user-oriented sugar traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    SystemUser,
    CurrentUser,
    InitialUser,
    AdditionalUser,
    PrimaryUser,
    SecondaryUser,
    WorkProfile,
    TvProfile,
    CloneProfile,
    InstrumentedUser,
    Any,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::SystemUser => "SYSTEM_USER",
            UserType::CurrentUser => "CURRENT_USER",
            UserType::InitialUser => "INITIAL_USER",
            UserType::AdditionalUser => "ADDITIONAL_USER",
            UserType::PrimaryUser => "PRIMARY_USER",
            UserType::SecondaryUser => "SECONDARY_USER",
            UserType::WorkProfile => "WORK_PROFILE",
            UserType::TvProfile => "TV_PROFILE",
            UserType::CloneProfile => "CLONE_PROFILE",
            UserType::InstrumentedUser => "INSTRUMENTED_USER",
            UserType::Any => "ANY",
        }
    }

    /// Instrumented and wildcard users cannot be targeted by a run.
    pub fn is_runnable(self) -> bool {
        !matches!(self, UserType::InstrumentedUser | UserType::Any)
    }

    /// Placement trait for this user; `None` for the current user.
    pub fn run_on(self) -> Option<DeclaredTrait> {
        let id = match self {
            UserType::SystemUser => REQUIRE_RUN_ON_SYSTEM_USER,
            UserType::InitialUser => return Some(require_run_on_initial_user(OptionalBool::True)),
            UserType::AdditionalUser => REQUIRE_RUN_ON_ADDITIONAL_USER,
            UserType::PrimaryUser => REQUIRE_RUN_ON_PRIMARY_USER,
            UserType::SecondaryUser => REQUIRE_RUN_ON_SECONDARY_USER,
            UserType::WorkProfile => REQUIRE_RUN_ON_WORK_PROFILE,
            UserType::TvProfile => REQUIRE_RUN_ON_TV_PROFILE,
            UserType::CloneProfile => REQUIRE_RUN_ON_CLONE_PROFILE,
            UserType::CurrentUser | UserType::InstrumentedUser | UserType::Any => return None,
        };
        Some(DeclaredTrait::new(id))
    }

    /// Existence trait for this user; `None` for users that always exist.
    pub fn has_user(self) -> Option<DeclaredTrait> {
        let id = match self {
            UserType::AdditionalUser => ENSURE_HAS_ADDITIONAL_USER,
            UserType::SecondaryUser => ENSURE_HAS_SECONDARY_USER,
            UserType::WorkProfile => ENSURE_HAS_WORK_PROFILE,
            UserType::TvProfile => ENSURE_HAS_TV_PROFILE,
            UserType::CloneProfile => ENSURE_HAS_CLONE_PROFILE,
            _ => return None,
        };
        Some(DeclaredTrait::new(id))
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SYSTEM_USER" => UserType::SystemUser,
            "CURRENT_USER" => UserType::CurrentUser,
            "INITIAL_USER" => UserType::InitialUser,
            "ADDITIONAL_USER" => UserType::AdditionalUser,
            "PRIMARY_USER" => UserType::PrimaryUser,
            "SECONDARY_USER" => UserType::SecondaryUser,
            "WORK_PROFILE" => UserType::WorkProfile,
            "TV_PROFILE" => UserType::TvProfile,
            "CLONE_PROFILE" => UserType::CloneProfile,
            "INSTRUMENTED_USER" => UserType::InstrumentedUser,
            "ANY" => UserType::Any,
            other => return Err(other.to_string()),
        })
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Constructors ────────────────────────────────────────────────────

pub fn require_run_on_initial_user(switched: OptionalBool) -> DeclaredTrait {
    DeclaredTrait::new(REQUIRE_RUN_ON_INITIAL_USER).with_str(SWITCHED_TO_USER, switched.as_str())
}

pub fn require_run_on_additional_user() -> DeclaredTrait {
    DeclaredTrait::new(REQUIRE_RUN_ON_ADDITIONAL_USER)
}

pub fn require_run_on_primary_user(switched: OptionalBool) -> DeclaredTrait {
    DeclaredTrait::new(REQUIRE_RUN_ON_PRIMARY_USER).with_str(SWITCHED_TO_USER, switched.as_str())
}

pub fn require_run_on_secondary_user(switched: OptionalBool) -> DeclaredTrait {
    DeclaredTrait::new(REQUIRE_RUN_ON_SECONDARY_USER).with_str(SWITCHED_TO_USER, switched.as_str())
}

pub fn ensure_has_secondary_user() -> DeclaredTrait {
    DeclaredTrait::new(ENSURE_HAS_SECONDARY_USER)
}

pub fn other_user(user: UserType) -> DeclaredTrait {
    DeclaredTrait::new(OTHER_USER).with_str(VALUE, user.as_str())
}

pub fn ensure_has_permission<S: AsRef<str>>(permissions: &[S]) -> DeclaredTrait {
    DeclaredTrait::new(ENSURE_HAS_PERMISSION).with_strs(VALUE, permissions)
}

pub fn ensure_does_not_have_permission<S: AsRef<str>>(permissions: &[S]) -> DeclaredTrait {
    DeclaredTrait::new(ENSURE_DOES_NOT_HAVE_PERMISSION).with_strs(VALUE, permissions)
}

pub fn ensure_has_app_op<S: AsRef<str>>(ops: &[S]) -> DeclaredTrait {
    DeclaredTrait::new(ENSURE_HAS_APP_OP).with_strs(VALUE, ops)
}

pub fn ensure_does_not_have_app_op<S: AsRef<str>>(ops: &[S]) -> DeclaredTrait {
    DeclaredTrait::new(ENSURE_DOES_NOT_HAVE_APP_OP).with_strs(VALUE, ops)
}

pub fn ensure_feature_flag_enabled(namespace: &str, key: &str) -> DeclaredTrait {
    DeclaredTrait::new(ENSURE_FEATURE_FLAG_ENABLED)
        .with_str(NAMESPACE, namespace)
        .with_str(KEY, key)
}

pub fn ensure_feature_flag_not_enabled(namespace: &str, key: &str) -> DeclaredTrait {
    DeclaredTrait::new(ENSURE_FEATURE_FLAG_NOT_ENABLED)
        .with_str(NAMESPACE, namespace)
        .with_str(KEY, key)
}

pub fn ensure_has_delegate<S: AsRef<str>>(scopes: &[S]) -> DeclaredTrait {
    DeclaredTrait::new(ENSURE_HAS_DELEGATE).with_strs(VALUE, scopes)
}

pub fn include_none() -> DeclaredTrait {
    DeclaredTrait::new(INCLUDE_NONE)
}

pub fn ignore(reason: &str) -> DeclaredTrait {
    DeclaredTrait::new(IGNORE).with_str(REASON, reason)
}

// ─── Registration ────────────────────────────────────────────────────

fn t(id: &str) -> DeclaredTrait {
    DeclaredTrait::new(id)
}

fn profile_owner(organization_owned: bool) -> DeclaredTrait {
    t(ENSURE_HAS_PROFILE_OWNER).with("organization_owned", AttrValue::Bool(organization_owned))
}

/// Every built-in trait type with its kind, weight and sub-traits.
pub fn framework_definitions() -> Vec<TraitDefinition> {
    let leaf = TraitDefinition::leaf;
    let meta = TraitDefinition::meta;
    let include = TraitDefinition::parameterized;

    vec![
        // users
        leaf(ENSURE_HAS_SECONDARY_USER).with_weight(EARLY),
        leaf(ENSURE_HAS_ADDITIONAL_USER).with_weight(EARLY),
        leaf(ENSURE_HAS_WORK_PROFILE).with_weight(EARLY),
        leaf(ENSURE_HAS_TV_PROFILE).with_weight(EARLY),
        leaf(ENSURE_HAS_CLONE_PROFILE).with_weight(EARLY),
        leaf(REQUIRE_RUN_ON_SYSTEM_USER).with_weight(MIDDLE),
        leaf(REQUIRE_RUN_ON_PRIMARY_USER).with_weight(MIDDLE),
        meta(REQUIRE_RUN_ON_SECONDARY_USER, vec![t(ENSURE_HAS_SECONDARY_USER)]).with_weight(MIDDLE),
        meta(REQUIRE_RUN_ON_WORK_PROFILE, vec![t(ENSURE_HAS_WORK_PROFILE)]).with_weight(MIDDLE),
        meta(REQUIRE_RUN_ON_TV_PROFILE, vec![t(ENSURE_HAS_TV_PROFILE)]).with_weight(MIDDLE),
        meta(REQUIRE_RUN_ON_CLONE_PROFILE, vec![t(ENSURE_HAS_CLONE_PROFILE)]).with_weight(MIDDLE),
        leaf(REQUIRE_RUN_ON_INITIAL_USER)
            .with_weight(MIDDLE)
            .with_special(SpecialExpansion::RunOnInitialUser),
        leaf(REQUIRE_RUN_ON_ADDITIONAL_USER)
            .with_weight(MIDDLE)
            .with_special(SpecialExpansion::RunOnAdditionalUser),
        leaf(OTHER_USER).with_weight(MIDDLE),
        leaf(REQUIRE_NOT_HEADLESS_SYSTEM_USER_MODE).with_weight(EARLY),
        leaf(USER_TEST),
        leaf(CROSS_USER_TEST),
        // permissions
        leaf(ENSURE_HAS_PERMISSION).with_weight(LATE),
        leaf(ENSURE_DOES_NOT_HAVE_PERMISSION).with_weight(LATE),
        leaf(ENSURE_HAS_APP_OP).with_weight(LATE),
        leaf(ENSURE_DOES_NOT_HAVE_APP_OP).with_weight(LATE),
        leaf(PERMISSION_TEST),
        // feature flags
        leaf(ENSURE_FEATURE_FLAG_ENABLED).with_weight(FIRST),
        leaf(ENSURE_FEATURE_FLAG_NOT_ENABLED).with_weight(FIRST),
        TraitDefinition::new(ENSURE_FEATURE_FLAGS_ENABLED, TraitKind::Repeating),
        leaf(RUN_WITH_FEATURE_FLAG_ENABLED_AND_DISABLED),
        // enterprise
        leaf(ENSURE_HAS_DEVICE_OWNER).with_weight(EARLY),
        leaf(ENSURE_HAS_NO_DEVICE_OWNER).with_weight(EARLY),
        leaf(ENSURE_HAS_PROFILE_OWNER).with_weight(EARLY),
        leaf(ENSURE_HAS_DELEGATE).with_weight(MIDDLE),
        leaf(ENSURE_TEST_APP_INSTALLED).with_weight(MIDDLE),
        leaf(ENSURE_TEST_APP_HAS_PERMISSION).with_weight(LATE),
        leaf(ENSURE_TEST_APP_HAS_APP_OP).with_weight(LATE),
        include(
            INCLUDE_RUN_ON_DEVICE_OWNER_USER,
            vec![t(ENSURE_HAS_DEVICE_OWNER), t(REQUIRE_RUN_ON_SYSTEM_USER)],
        ),
        include(
            INCLUDE_RUN_ON_BACKGROUND_DEVICE_OWNER_USER,
            vec![
                t(ENSURE_HAS_DEVICE_OWNER),
                require_run_on_initial_user(OptionalBool::True),
            ],
        ),
        include(
            INCLUDE_RUN_ON_AFFILIATED_DEVICE_OWNER_SECONDARY_USER,
            vec![
                t(ENSURE_HAS_DEVICE_OWNER),
                t(REQUIRE_RUN_ON_SECONDARY_USER),
                t(ENSURE_HAS_PROFILE_OWNER).with("affiliated", AttrValue::Bool(true)),
            ],
        ),
        include(
            INCLUDE_RUN_ON_UNAFFILIATED_DEVICE_OWNER_SECONDARY_USER,
            vec![t(ENSURE_HAS_DEVICE_OWNER), t(REQUIRE_RUN_ON_SECONDARY_USER)],
        )
        .with_shadows(vec![INCLUDE_RUN_ON_AFFILIATED_DEVICE_OWNER_SECONDARY_USER.into()]),
        include(
            INCLUDE_RUN_ON_PROFILE_OWNER_PRIMARY_USER,
            vec![
                t(ENSURE_HAS_NO_DEVICE_OWNER),
                require_run_on_primary_user(OptionalBool::Any),
                profile_owner(false),
            ],
        ),
        include(
            INCLUDE_RUN_ON_PROFILE_OWNER_PROFILE_WITH_NO_DEVICE_OWNER,
            vec![
                t(ENSURE_HAS_NO_DEVICE_OWNER),
                t(REQUIRE_RUN_ON_WORK_PROFILE),
                profile_owner(false),
            ],
        ),
        include(
            INCLUDE_RUN_ON_PARENT_OF_PROFILE_OWNER_WITH_NO_DEVICE_OWNER,
            vec![
                t(ENSURE_HAS_NO_DEVICE_OWNER),
                require_run_on_initial_user(OptionalBool::True),
                t(ENSURE_HAS_WORK_PROFILE),
            ],
        ),
        include(
            INCLUDE_RUN_ON_ORGANIZATION_OWNED_PROFILE_OWNER,
            vec![
                t(ENSURE_HAS_NO_DEVICE_OWNER),
                t(REQUIRE_RUN_ON_WORK_PROFILE),
                profile_owner(true),
            ],
        ),
        include(INCLUDE_NONE, vec![]).without_run(),
        leaf(POLICY_APPLIES_TEST),
        leaf(POLICY_DOES_NOT_APPLY_TEST),
        leaf(CAN_SET_POLICY_TEST),
        leaf(CANNOT_SET_POLICY_TEST),
        // markers
        TraitDefinition::new(STRING_TEST_PARAMETER, TraitKind::Axis(AxisKind::String)),
        TraitDefinition::new(INT_TEST_PARAMETER, TraitKind::Axis(AxisKind::Int)),
        TraitDefinition::new(ENUM_TEST_PARAMETER, TraitKind::Axis(AxisKind::Enum)),
        leaf(PARAMETERIZED_MARKER),
        leaf(REPEATING_MARKER),
        leaf(IGNORE),
    ]
}

impl RegistryBuilder {
    /// Builder preloaded with the built-in vocabulary and default namespaces.
    pub fn framework() -> Self {
        let mut builder = RegistryBuilder::new(Namespaces::default());
        builder.extend(framework_definitions());
        builder
    }
}

impl TraitRegistry {
    /// Registry containing only the built-in vocabulary.
    pub fn framework() -> Result<TraitRegistry, RegistryError> {
        RegistryBuilder::framework().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TraitTypeId;

    #[test]
    fn framework_vocabulary_validates() {
        let registry = TraitRegistry::framework().unwrap();
        assert_eq!(registry.len(), framework_definitions().len());
        assert!(registry.contains(&TraitTypeId::new(IGNORE)));
    }

    #[test]
    fn include_none_does_not_generate_a_run() {
        let registry = TraitRegistry::framework().unwrap();
        assert!(!registry.generates_run(&include_none().into()));
        assert!(registry.is_parameterized(&include_none().into()));
    }

    #[test]
    fn user_type_round_trips_through_its_name() {
        for name in ["SYSTEM_USER", "WORK_PROFILE", "INITIAL_USER", "ANY"] {
            let user: UserType = name.parse().unwrap();
            assert_eq!(user.to_string(), name);
        }
        assert!("NOBODY".parse::<UserType>().is_err());
    }

    #[test]
    fn current_user_has_no_placement_trait() {
        assert!(UserType::CurrentUser.run_on().is_none());
        assert!(UserType::CurrentUser.is_runnable());
        assert!(!UserType::InstrumentedUser.is_runnable());
    }

    #[test]
    fn optional_bool_rejects_lowercase() {
        assert_eq!("ANY".parse::<OptionalBool>(), Ok(OptionalBool::Any));
        assert!("true".parse::<OptionalBool>().is_err());
    }
}
