//! Enterprise policies — flag model, merging, and state generation.
//!
//! A policy lists one flag word per way it can be applied by a device policy
//! controller (DPC). Each word carries exactly one `APPLIED_BY_*` bit plus
//! `APPLIES_*` scope bits. The state generators turn a (merged) policy into
//! the parameterized traits that the enterprise pre-pass offers as run
//! alternatives.

use crate::model::{CompositeTrait, DeclaredTrait, TestTrait, TraitTypeId};
use crate::registry::TraitRegistry;
use crate::vocabulary::{self as v};
use indexmap::IndexSet;
use std::collections::BTreeMap;
use thiserror::Error;

// ─── Flags ───────────────────────────────────────────────────────────

pub const APPLIED_BY_DEVICE_OWNER: u32 = 1;
pub const APPLIED_BY_PROFILE_OWNER_USER_WITH_NO_DO: u32 = 1 << 1;
pub const APPLIED_BY_UNAFFILIATED_PROFILE_OWNER_PROFILE: u32 = 1 << 2;
pub const APPLIED_BY_ORGANIZATION_OWNED_PROFILE_OWNER_PROFILE: u32 = 1 << 3;
pub const APPLIED_BY_FLAGS: u32 = APPLIED_BY_DEVICE_OWNER
    | APPLIED_BY_PROFILE_OWNER_USER_WITH_NO_DO
    | APPLIED_BY_UNAFFILIATED_PROFILE_OWNER_PROFILE
    | APPLIED_BY_ORGANIZATION_OWNED_PROFILE_OWNER_PROFILE;

pub const APPLIES_TO_OWN_USER: u32 = 1 << 8;
pub const APPLIES_TO_AFFILIATED_OTHER_USERS: u32 = 1 << 9;
pub const APPLIES_TO_UNAFFILIATED_OTHER_USERS: u32 = 1 << 10;
pub const APPLIES_TO_PARENT: u32 = 1 << 11;
pub const APPLIES_IN_BACKGROUND: u32 = 1 << 12;
pub const CAN_BE_DELEGATED: u32 = 1 << 13;

const FLAG_NAMES: &[(&str, u32)] = &[
    ("APPLIED_BY_DEVICE_OWNER", APPLIED_BY_DEVICE_OWNER),
    ("APPLIED_BY_PROFILE_OWNER_USER_WITH_NO_DO", APPLIED_BY_PROFILE_OWNER_USER_WITH_NO_DO),
    ("APPLIED_BY_UNAFFILIATED_PROFILE_OWNER_PROFILE", APPLIED_BY_UNAFFILIATED_PROFILE_OWNER_PROFILE),
    (
        "APPLIED_BY_ORGANIZATION_OWNED_PROFILE_OWNER_PROFILE",
        APPLIED_BY_ORGANIZATION_OWNED_PROFILE_OWNER_PROFILE,
    ),
    ("APPLIES_TO_OWN_USER", APPLIES_TO_OWN_USER),
    ("APPLIES_TO_AFFILIATED_OTHER_USERS", APPLIES_TO_AFFILIATED_OTHER_USERS),
    ("APPLIES_TO_UNAFFILIATED_OTHER_USERS", APPLIES_TO_UNAFFILIATED_OTHER_USERS),
    ("APPLIES_TO_PARENT", APPLIES_TO_PARENT),
    ("APPLIES_IN_BACKGROUND", APPLIES_IN_BACKGROUND),
    ("CAN_BE_DELEGATED", CAN_BE_DELEGATED),
];

/// Every delegation scope a DPC can hand out.
pub const ALL_DELEGATE_SCOPES: &[&str] = &[
    "delegation-cert-install",
    "delegation-app-restrictions",
    "delegation-block-uninstall",
    "delegation-permission-grant",
    "delegation-package-access",
    "delegation-enable-system-app",
    "delegation-install-existing-package",
    "delegation-keep-uninstalled-packages",
    "delegation-network-logging",
    "delegation-cert-selection",
    "delegation-security-logging",
];

const PERMISSION_PREFIX: &str = "android.permission.";

fn has_flag(value: u32, flag: u32) -> bool {
    value & flag == flag
}

/// Parse a flag expression such as `APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER`.
pub fn parse_flags(expr: &str) -> Result<u32, PolicyError> {
    expr.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .try_fold(0u32, |acc, name| {
            FLAG_NAMES
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, bit)| acc | bit)
                .ok_or_else(|| PolicyError::UnknownFlag(name.to_string()))
        })
}

/// Inverse of `parse_flags`, in declaration order.
pub fn flag_names(value: u32) -> String {
    FLAG_NAMES
        .iter()
        .filter(|(_, bit)| has_flag(value, *bit))
        .map(|(n, _)| *n)
        .collect::<Vec<_>>()
        .join(" | ")
}

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("policy trait names no policies")]
    NoPolicies,
    #[error("unknown enterprise policy: {0}")]
    UnknownPolicy(String),
    #[error("enterprise policy registered twice: {0}")]
    DuplicatePolicy(String),
    #[error("unknown policy flag: {0}")]
    UnknownFlag(String),
    #[error("policy {policy}: every DPC entry must specify exactly one APPLIED_BY flag, got '{flags}'")]
    AppliedBy { policy: String, flags: String },
    #[error("policy {policy}: APPLIED_BY flag '{flags}' appears in more than one DPC entry")]
    DuplicateAppliedBy { policy: String, flags: String },
    #[error("Cannot merge policies {existing} and {incoming}: delegated scopes differ")]
    Unmergeable { existing: String, incoming: String },
}

// ─── Policy model ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnterprisePolicy {
    pub name: String,
    pub dpc: Vec<u32>,
    /// Permissions that grant the ability to set this policy without a DPC.
    pub permissions: Vec<String>,
    pub app_ops: Vec<String>,
    pub delegated_scopes: Vec<String>,
}

impl EnterprisePolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_dpc(mut self, flags: u32) -> Self {
        self.dpc.push(flags);
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub fn with_app_op(mut self, op: impl Into<String>) -> Self {
        self.app_ops.push(op.into());
        self
    }

    pub fn with_delegated_scopes<S: AsRef<str>>(mut self, scopes: &[S]) -> Self {
        self.delegated_scopes = scopes.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    fn all_flags(&self) -> u32 {
        self.dpc.iter().fold(0, |acc, f| acc | f)
    }

    fn any_dpc(&self, flag: u32) -> bool {
        self.dpc.iter().any(|v| has_flag(*v, flag))
    }
}

/// Each DPC entry has exactly one applied-by bit, distinct across entries.
pub fn validate_flags(policy: &EnterprisePolicy) -> Result<(), PolicyError> {
    let mut seen = 0u32;
    for value in &policy.dpc {
        let applied_by = value & APPLIED_BY_FLAGS;
        if applied_by.count_ones() != 1 {
            return Err(PolicyError::AppliedBy {
                policy: policy.name.clone(),
                flags: flag_names(*value),
            });
        }
        if seen & applied_by != 0 {
            return Err(PolicyError::DuplicateAppliedBy {
                policy: policy.name.clone(),
                flags: flag_names(applied_by),
            });
        }
        seen |= applied_by;
    }
    Ok(())
}

/// Merge several policies into one synthetic policy.
///
/// DPC entries, permissions and app ops are unioned. Delegated scopes must
/// agree: a non-empty incoming set has to be contained in a non-empty
/// existing set.
pub fn merge_policies(policies: &[&EnterprisePolicy]) -> Result<EnterprisePolicy, PolicyError> {
    let (first, rest) = policies.split_first().ok_or(PolicyError::NoPolicies)?;
    validate_flags(first)?;
    let mut merged = (*first).clone();
    for policy in rest {
        validate_flags(policy)?;
        merged.name = format!("{}+{}", merged.name, policy.name);
        merged.dpc.extend(policy.dpc.iter().copied());
        extend_unique(&mut merged.permissions, &policy.permissions);
        extend_unique(&mut merged.app_ops, &policy.app_ops);
        if !policy.delegated_scopes.is_empty() {
            if !merged.delegated_scopes.is_empty()
                && !policy
                    .delegated_scopes
                    .iter()
                    .all(|s| merged.delegated_scopes.contains(s))
            {
                return Err(PolicyError::Unmergeable {
                    existing: merged.name.clone(),
                    incoming: policy.name.clone(),
                });
            }
            merged.delegated_scopes = policy.delegated_scopes.clone();
        }
    }
    Ok(merged)
}

fn extend_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

// ─── Policy registry ─────────────────────────────────────────────────

/// Named policies available to the enterprise pre-pass.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<String, EnterprisePolicy>,
}

impl PolicyRegistry {
    pub fn insert(&mut self, policy: EnterprisePolicy) -> Result<(), PolicyError> {
        validate_flags(&policy)?;
        if self.policies.contains_key(&policy.name) {
            return Err(PolicyError::DuplicatePolicy(policy.name));
        }
        self.policies.insert(policy.name.clone(), policy);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EnterprisePolicy> {
        self.policies.get(name)
    }

    /// Look up every name, failing on the first unknown one.
    pub fn lookup<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&EnterprisePolicy>, PolicyError> {
        names
            .iter()
            .map(|n| {
                self.get(n.as_ref())
                    .ok_or_else(|| PolicyError::UnknownPolicy(n.as_ref().to_string()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

// ─── State generation ────────────────────────────────────────────────

/// One enterprise run state and the flag words that make it relevant.
struct StateRule {
    include: &'static str,
    flags: u32,
}

const STATE_RULES: &[StateRule] = &[
    StateRule {
        include: v::INCLUDE_RUN_ON_DEVICE_OWNER_USER,
        flags: APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER,
    },
    StateRule {
        include: v::INCLUDE_RUN_ON_BACKGROUND_DEVICE_OWNER_USER,
        flags: APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER | APPLIES_IN_BACKGROUND,
    },
    StateRule {
        include: v::INCLUDE_RUN_ON_AFFILIATED_DEVICE_OWNER_SECONDARY_USER,
        flags: APPLIED_BY_DEVICE_OWNER | APPLIES_TO_AFFILIATED_OTHER_USERS,
    },
    StateRule {
        include: v::INCLUDE_RUN_ON_UNAFFILIATED_DEVICE_OWNER_SECONDARY_USER,
        flags: APPLIED_BY_DEVICE_OWNER | APPLIES_TO_UNAFFILIATED_OTHER_USERS,
    },
    StateRule {
        include: v::INCLUDE_RUN_ON_PROFILE_OWNER_PRIMARY_USER,
        flags: APPLIED_BY_PROFILE_OWNER_USER_WITH_NO_DO | APPLIES_TO_OWN_USER,
    },
    StateRule {
        include: v::INCLUDE_RUN_ON_PROFILE_OWNER_PROFILE_WITH_NO_DEVICE_OWNER,
        flags: APPLIED_BY_UNAFFILIATED_PROFILE_OWNER_PROFILE | APPLIES_TO_OWN_USER,
    },
    StateRule {
        include: v::INCLUDE_RUN_ON_PARENT_OF_PROFILE_OWNER_WITH_NO_DEVICE_OWNER,
        flags: APPLIED_BY_UNAFFILIATED_PROFILE_OWNER_PROFILE | APPLIES_TO_PARENT,
    },
    StateRule {
        include: v::INCLUDE_RUN_ON_ORGANIZATION_OWNED_PROFILE_OWNER,
        flags: APPLIED_BY_ORGANIZATION_OWNED_PROFILE_OWNER_PROFILE | APPLIES_TO_OWN_USER,
    },
];

/// Default state used by the can-set / cannot-set generators per DPC kind.
const DPC_DEFAULTS: &[(u32, &str)] = &[
    (APPLIED_BY_DEVICE_OWNER, v::INCLUDE_RUN_ON_DEVICE_OWNER_USER),
    (
        APPLIED_BY_PROFILE_OWNER_USER_WITH_NO_DO,
        v::INCLUDE_RUN_ON_PROFILE_OWNER_PRIMARY_USER,
    ),
    (
        APPLIED_BY_UNAFFILIATED_PROFILE_OWNER_PROFILE,
        v::INCLUDE_RUN_ON_PROFILE_OWNER_PROFILE_WITH_NO_DEVICE_OWNER,
    ),
    (
        APPLIED_BY_ORGANIZATION_OWNED_PROFILE_OWNER_PROFILE,
        v::INCLUDE_RUN_ON_ORGANIZATION_OWNED_PROFILE_OWNER,
    ),
];

/// Generates enterprise run states for one policy.
pub struct PolicyStates<'a> {
    registry: &'a TraitRegistry,
    policy: &'a EnterprisePolicy,
    states: IndexSet<TestTrait>,
}

impl<'a> PolicyStates<'a> {
    pub fn new(registry: &'a TraitRegistry, policy: &'a EnterprisePolicy) -> Self {
        Self {
            registry,
            policy,
            states: IndexSet::new(),
        }
    }

    /// States in which setting the policy takes effect.
    pub fn applies(mut self) -> Vec<TestTrait> {
        for rule in STATE_RULES {
            if self.policy.any_dpc(rule.flags) {
                self.add_state(rule.include, rule.flags);
            }
        }
        self.add_permission_states();
        self.finish()
    }

    /// States in which a DPC can set the policy but it does not take effect.
    pub fn does_not_apply(mut self) -> Vec<TestTrait> {
        for rule in STATE_RULES {
            let applied_by = rule.flags & APPLIED_BY_FLAGS;
            let scope = rule.flags & !APPLIED_BY_FLAGS;
            let policy = self.policy;
            if policy
                .dpc
                .iter()
                .any(|v| has_flag(*v, applied_by) && !has_flag(*v, scope))
            {
                self.add_state(rule.include, applied_by);
            }
        }
        self.finish()
    }

    /// States in which the policy can be set.
    pub fn can_set(mut self, single_test_only: bool) -> Vec<TestTrait> {
        let all = self.policy.all_flags();
        for (applied_by, include) in DPC_DEFAULTS {
            if has_flag(all, *applied_by) {
                let include = if *applied_by == APPLIED_BY_DEVICE_OWNER
                    && self.policy.any_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_IN_BACKGROUND)
                {
                    v::INCLUDE_RUN_ON_BACKGROUND_DEVICE_OWNER_USER
                } else {
                    include
                };
                self.add_state(include, *applied_by);
            }
        }
        self.add_permission_states();
        if single_test_only {
            let first = self
                .states
                .iter()
                .min_by(|a, b| {
                    (a.is_composite(), a.parameter_name()).cmp(&(b.is_composite(), b.parameter_name()))
                })
                .cloned();
            self.states = first.into_iter().collect();
        }
        self.finish()
    }

    /// States in which the policy cannot be set.
    pub fn cannot_set(
        mut self,
        include_device_admin_states: bool,
        include_non_device_admin_states: bool,
    ) -> Vec<TestTrait> {
        let all = self.policy.all_flags();
        if include_device_admin_states {
            for (applied_by, include) in DPC_DEFAULTS {
                if all & applied_by == 0 {
                    self.states.insert(TestTrait::declared(*include));
                }
            }
        }
        if include_non_device_admin_states {
            let invalid: Vec<&str> = ALL_DELEGATE_SCOPES
                .iter()
                .copied()
                .filter(|s| !self.policy.delegated_scopes.iter().any(|d| d == *s))
                .collect();
            if !invalid.is_empty() {
                let mut payload = self.include_sub_traits(v::INCLUDE_RUN_ON_DEVICE_OWNER_USER);
                payload.push(v::ensure_has_delegate(&invalid));
                self.states
                    .insert(CompositeTrait::from_declared("DelegateWithoutValidScope", payload).into());
            }
        }
        self.finish()
    }

    fn add_state(&mut self, include: &str, applied_by_flags: u32) {
        self.states.insert(TestTrait::declared(include));
        let applied_by = applied_by_flags & APPLIED_BY_FLAGS;
        if !self.policy.any_dpc(applied_by | CAN_BE_DELEGATED) {
            return;
        }
        let simple = TraitTypeId::new(include).simple_name().to_string();
        for scope in &self.policy.delegated_scopes {
            let mut payload = self.include_sub_traits(include);
            payload.push(v::ensure_has_delegate(&[scope]));
            self.states.insert(
                CompositeTrait::from_declared(format!("{simple}Delegate_{scope}"), payload).into(),
            );
        }
    }

    fn add_permission_states(&mut self) {
        for op in &self.policy.app_ops {
            self.states.insert(
                CompositeTrait::from_declared(format!("AppOp_{op}"), vec![v::ensure_has_app_op(&[op])])
                    .into(),
            );
        }
        for permission in &self.policy.permissions {
            let short = permission.strip_prefix(PERMISSION_PREFIX).unwrap_or(permission);
            self.states.insert(
                CompositeTrait::from_declared(
                    format!("Permission_{short}"),
                    vec![
                        v::ensure_feature_flag_enabled(
                            v::DEVICE_POLICY_FLAG_NAMESPACE,
                            v::PERMISSION_ACCESS_FLAG,
                        ),
                        v::ensure_has_permission(&[permission]),
                    ],
                )
                .into(),
            );
        }
    }

    fn include_sub_traits(&self, include: &str) -> Vec<DeclaredTrait> {
        self.registry
            .get(&TraitTypeId::new(include))
            .map(|def| def.sub_traits.clone())
            .unwrap_or_default()
    }

    /// Drop shadowed states; an empty result becomes `IncludeNone`.
    fn finish(self) -> Vec<TestTrait> {
        let shadowed: Vec<TraitTypeId> = self
            .states
            .iter()
            .filter_map(TestTrait::type_id)
            .filter_map(|id| self.registry.get(id))
            .flat_map(|def| def.shadows.iter().cloned())
            .collect();
        let mut states: Vec<TestTrait> = self
            .states
            .into_iter()
            .filter(|t| t.type_id().map_or(true, |id| !shadowed.contains(id)))
            .collect();
        if states.is_empty() {
            states.push(v::include_none().into());
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TraitRegistry {
        TraitRegistry::framework().unwrap()
    }

    fn names(states: &[TestTrait]) -> Vec<&str> {
        states.iter().map(TestTrait::parameter_name).collect()
    }

    #[test]
    fn parse_flag_expression() {
        let bits = parse_flags("APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER").unwrap();
        assert_eq!(bits, APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER);
        assert_eq!(flag_names(bits), "APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER");
        assert_eq!(
            parse_flags("APPLIES_EVERYWHERE"),
            Err(PolicyError::UnknownFlag("APPLIES_EVERYWHERE".into()))
        );
    }

    #[test]
    fn validate_requires_single_applied_by() {
        let none = EnterprisePolicy::new("p").with_dpc(APPLIES_TO_OWN_USER);
        assert!(matches!(validate_flags(&none), Err(PolicyError::AppliedBy { .. })));

        let two = EnterprisePolicy::new("p")
            .with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIED_BY_PROFILE_OWNER_USER_WITH_NO_DO);
        assert!(matches!(validate_flags(&two), Err(PolicyError::AppliedBy { .. })));

        let dup = EnterprisePolicy::new("p")
            .with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER)
            .with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_PARENT);
        assert!(matches!(
            validate_flags(&dup),
            Err(PolicyError::DuplicateAppliedBy { .. })
        ));
    }

    #[test]
    fn merge_of_nothing_fails() {
        assert_eq!(merge_policies(&[]), Err(PolicyError::NoPolicies));
    }

    #[test]
    fn merge_rejects_conflicting_scopes() {
        let a = EnterprisePolicy::new("a")
            .with_dpc(APPLIED_BY_DEVICE_OWNER)
            .with_delegated_scopes(&["delegation-cert-install"]);
        let b = EnterprisePolicy::new("b")
            .with_dpc(APPLIED_BY_PROFILE_OWNER_USER_WITH_NO_DO)
            .with_delegated_scopes(&["delegation-network-logging"]);
        let err = merge_policies(&[&a, &b]).unwrap_err();
        assert!(err.to_string().starts_with("Cannot merge"));
    }

    #[test]
    fn merge_unions_dpc_entries() {
        let a = EnterprisePolicy::new("a").with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER);
        let b = EnterprisePolicy::new("b")
            .with_dpc(APPLIED_BY_ORGANIZATION_OWNED_PROFILE_OWNER_PROFILE | APPLIES_TO_OWN_USER)
            .with_permission("android.permission.MANAGE_DEVICE_POLICY_CAMERA");
        let merged = merge_policies(&[&a, &b]).unwrap();
        assert_eq!(merged.dpc.len(), 2);
        assert_eq!(merged.permissions.len(), 1);
    }

    #[test]
    fn applies_generates_states_in_rule_order() {
        let r = registry();
        let policy = EnterprisePolicy::new("camera")
            .with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER | APPLIES_IN_BACKGROUND)
            .with_permission("android.permission.MANAGE_DEVICE_POLICY_CAMERA");
        let states = PolicyStates::new(&r, &policy).applies();
        assert_eq!(
            names(&states),
            vec![
                "IncludeRunOnDeviceOwnerUser",
                "IncludeRunOnBackgroundDeviceOwnerUser",
                "Permission_MANAGE_DEVICE_POLICY_CAMERA",
            ]
        );
    }

    #[test]
    fn delegated_policy_adds_delegate_states() {
        let r = registry();
        let policy = EnterprisePolicy::new("certs")
            .with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER | CAN_BE_DELEGATED)
            .with_delegated_scopes(&["delegation-cert-install"]);
        let states = PolicyStates::new(&r, &policy).applies();
        assert_eq!(
            names(&states),
            vec![
                "IncludeRunOnDeviceOwnerUser",
                "IncludeRunOnDeviceOwnerUserDelegate_delegation-cert-install",
            ]
        );
        let TestTrait::Composite(delegate) = &states[1] else {
            panic!("expected composite");
        };
        assert_eq!(
            delegate.traits.last(),
            Some(&TestTrait::Declared(v::ensure_has_delegate(&["delegation-cert-install"])))
        );
    }

    #[test]
    fn does_not_apply_picks_missing_scopes() {
        let r = registry();
        let policy = EnterprisePolicy::new("p").with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER);
        let states = PolicyStates::new(&r, &policy).does_not_apply();
        assert!(names(&states).contains(&"IncludeRunOnUnaffiliatedDeviceOwnerSecondaryUser"));
        assert!(!names(&states).contains(&"IncludeRunOnDeviceOwnerUser"));
    }

    #[test]
    fn unaffiliated_state_shadows_affiliated() {
        let r = registry();
        let policy = EnterprisePolicy::new("p").with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER);
        let states = PolicyStates::new(&r, &policy).does_not_apply();
        assert!(!names(&states).contains(&"IncludeRunOnAffiliatedDeviceOwnerSecondaryUser"));
    }

    #[test]
    fn empty_generation_yields_include_none() {
        let r = registry();
        let policy = EnterprisePolicy::new("p");
        let states = PolicyStates::new(&r, &policy).applies();
        assert_eq!(states, vec![TestTrait::Declared(v::include_none())]);
    }

    #[test]
    fn can_set_single_test_only_keeps_one_declared_state() {
        let r = registry();
        let policy = EnterprisePolicy::new("p")
            .with_dpc(APPLIED_BY_ORGANIZATION_OWNED_PROFILE_OWNER_PROFILE | APPLIES_TO_OWN_USER)
            .with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER)
            .with_app_op("RUN_IN_BACKGROUND");
        let all = PolicyStates::new(&r, &policy).can_set(false);
        assert_eq!(all.len(), 3);
        let single = PolicyStates::new(&r, &policy).can_set(true);
        assert_eq!(names(&single), vec!["IncludeRunOnDeviceOwnerUser"]);
    }

    #[test]
    fn cannot_set_covers_other_dpc_kinds_and_bad_delegates() {
        let r = registry();
        let policy = EnterprisePolicy::new("p")
            .with_dpc(APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER)
            .with_delegated_scopes(&["delegation-cert-install"]);
        let states = PolicyStates::new(&r, &policy).cannot_set(true, true);
        let names = names(&states);
        assert!(!names.contains(&"IncludeRunOnDeviceOwnerUser"));
        assert!(names.contains(&"IncludeRunOnProfileOwnerPrimaryUser"));
        assert_eq!(names.last(), Some(&"DelegateWithoutValidScope"));
    }
}
