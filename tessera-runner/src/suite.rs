//! Suite files — declarative test classes plus the registry they run against.
//!
//! A suite is one TOML document:
//! ```toml
//! [device]
//! headless_system_user_mode = false
//!
//! [runner]
//! max_restarts = 5
//!
//! [[trait_type]]
//! id = "tessera.acme.RequireCamera"
//! kind = "meta"
//! weight = 20
//! traits = [{ type = "tessera.permissions.EnsureHasPermission", value = ["CAMERA"] }]
//!
//! [[policy]]
//! name = "CameraDisabled"
//! dpc = ["APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER"]
//!
//! [[class]]
//! name = "CameraTest"
//! traits = [{ type = "tessera.acme.RequireCamera" }]
//!
//! [[class.method]]
//! name = "takePicture"
//! traits = [{ type = "tessera.users.UserTest", value = ["PRIMARY_USER", "WORK_PROFILE"] }]
//!
//! [[class.method.param]]
//! name = "quality"
//! traits = [{ type = "tessera.meta.IntTestParameter", value = [50, 100] }]
//! ```
//! Suite trait types are registered on top of the built-in vocabulary.

use crate::config::RunnerConfig;
use serde::Deserialize;
use std::path::Path;
use tessera_core::model::{DeclaredTrait, TestTrait, TraitKind, TraitTypeId};
use tessera_core::policy::{parse_flags, EnterprisePolicy, PolicyError, PolicyRegistry};
use tessera_core::{
    MethodParam, RegistryBuilder, RegistryError, ResolutionContext, StaticDeviceState, TestClass,
    TestMethod, TraitDefinition, TraitRegistry,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("failed to read suite '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse suite: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid trait registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("policy '{name}': {source}")]
    Policy {
        name: String,
        #[source]
        source: PolicyError,
    },
    #[error("{location}: unknown trait type '{type_id}'")]
    UnknownTraitType { location: String, type_id: TraitTypeId },
}

// ─── File format ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFile {
    #[serde(default)]
    device: StaticDeviceState,
    #[serde(default)]
    runner: RunnerConfig,
    #[serde(default)]
    trait_type: Vec<TraitTypeEntry>,
    #[serde(default)]
    policy: Vec<PolicyEntry>,
    #[serde(default)]
    class: Vec<ClassEntry>,
}

/// Kinds a suite may register; axis markers are built in only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SuiteTraitKind {
    Leaf,
    Meta,
    Repeating,
    Parameterized,
}

impl From<SuiteTraitKind> for TraitKind {
    fn from(kind: SuiteTraitKind) -> Self {
        match kind {
            SuiteTraitKind::Leaf => TraitKind::Leaf,
            SuiteTraitKind::Meta => TraitKind::Meta,
            SuiteTraitKind::Repeating => TraitKind::Repeating,
            SuiteTraitKind::Parameterized => TraitKind::Parameterized,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TraitTypeEntry {
    id: String,
    kind: SuiteTraitKind,
    weight: Option<i32>,
    #[serde(default)]
    traits: Vec<DeclaredTrait>,
    #[serde(default)]
    shadows: Vec<String>,
    #[serde(default = "default_true")]
    generates_run: bool,
}

impl TraitTypeEntry {
    fn into_definition(self) -> TraitDefinition {
        let mut def = TraitDefinition::new(self.id.as_str(), self.kind.into())
            .with_sub_traits(self.traits)
            .with_shadows(self.shadows.into_iter().map(TraitTypeId::new).collect());
        if let Some(weight) = self.weight {
            def = def.with_weight(weight);
        }
        if !self.generates_run {
            def = def.without_run();
        }
        def
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyEntry {
    name: String,
    /// Flag expressions such as `"APPLIED_BY_DEVICE_OWNER | APPLIES_TO_OWN_USER"`.
    #[serde(default)]
    dpc: Vec<String>,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    app_ops: Vec<String>,
    #[serde(default)]
    delegated_scopes: Vec<String>,
}

impl PolicyEntry {
    fn into_policy(self) -> Result<EnterprisePolicy, PolicyError> {
        let mut policy = EnterprisePolicy::new(self.name);
        for expr in &self.dpc {
            policy = policy.with_dpc(parse_flags(expr)?);
        }
        policy.permissions = self.permissions;
        policy.app_ops = self.app_ops;
        policy.delegated_scopes = self.delegated_scopes;
        Ok(policy)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassEntry {
    name: String,
    #[serde(default)]
    traits: Vec<DeclaredTrait>,
    #[serde(default)]
    method: Vec<MethodEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodEntry {
    name: String,
    #[serde(default)]
    traits: Vec<DeclaredTrait>,
    #[serde(default)]
    param: Vec<ParamEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamEntry {
    name: String,
    #[serde(default)]
    traits: Vec<DeclaredTrait>,
}

fn to_traits(traits: Vec<DeclaredTrait>) -> Vec<TestTrait> {
    traits.into_iter().map(TestTrait::Declared).collect()
}

// ─── Loaded suite ────────────────────────────────────────────────────

/// A validated suite, ready to plan.
#[derive(Debug)]
pub struct LoadedSuite {
    pub context: ResolutionContext,
    pub classes: Vec<TestClass>,
    pub runner: RunnerConfig,
}

impl LoadedSuite {
    pub fn from_toml(content: &str) -> Result<Self, SuiteError> {
        let file: SuiteFile = toml::from_str(content)?;
        Self::from_file_format(file)
    }

    pub fn from_file(path: &Path) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path).map_err(|source| SuiteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Like `from_file`, with the device state taken from the caller.
    pub fn from_file_with_device(
        path: &Path,
        device: StaticDeviceState,
    ) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path).map_err(|source| SuiteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut file: SuiteFile = toml::from_str(&content)?;
        file.device = device;
        Self::from_file_format(file)
    }

    pub fn registry(&self) -> &TraitRegistry {
        self.context.registry()
    }

    fn from_file_format(file: SuiteFile) -> Result<Self, SuiteError> {
        let mut builder = RegistryBuilder::framework();
        builder.extend(file.trait_type.into_iter().map(TraitTypeEntry::into_definition));
        let registry = builder.build()?;

        let mut policies = PolicyRegistry::default();
        for entry in file.policy {
            let name = entry.name.clone();
            entry
                .into_policy()
                .and_then(|p| policies.insert(p))
                .map_err(|source| SuiteError::Policy { name, source })?;
        }

        let classes: Vec<TestClass> = file
            .class
            .into_iter()
            .map(|c| TestClass {
                name: c.name,
                traits: to_traits(c.traits),
                methods: c
                    .method
                    .into_iter()
                    .map(|m| TestMethod {
                        name: m.name,
                        traits: to_traits(m.traits),
                        params: m
                            .param
                            .into_iter()
                            .map(|p| MethodParam::new(p.name, to_traits(p.traits)))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        for class in &classes {
            check_known(&registry, &class.name, &class.traits)?;
            for method in &class.methods {
                let location = format!("{}#{}", class.name, method.name);
                check_known(&registry, &location, &method.traits)?;
                for param in &method.params {
                    check_known(&registry, &format!("{location}({})", param.name), &param.traits)?;
                }
            }
        }

        debug!(
            trait_types = registry.len(),
            policies = policies.len(),
            classes = classes.len(),
            "suite loaded"
        );

        Ok(Self {
            context: ResolutionContext::new(registry, file.device).with_policies(policies),
            classes,
            runner: file.runner,
        })
    }
}

/// Unregistered framework types fail resolution; foreign or ignored ones
/// pass through untouched, so only the former are reported.
fn check_known(
    registry: &TraitRegistry,
    location: &str,
    traits: &[TestTrait],
) -> Result<(), SuiteError> {
    let namespaces = registry.namespaces();
    for t in traits {
        if let Some(type_id) = registry
            .unknown_types(t)
            .into_iter()
            .find(|id| namespaces.is_framework(id) && !namespaces.is_ignored(id))
        {
            return Err(SuiteError::UnknownTraitType {
                location: location.to_string(),
                type_id,
            });
        }
    }
    Ok(())
}
