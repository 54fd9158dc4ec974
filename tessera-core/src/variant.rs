//! Variants — one concrete run of a test method.
//!
//! A variant pairs a method with at most one parameterized selection and a
//! value for every method parameter, and carries the resolved trait list the
//! run executes under. Identity is (method, selection, parameter values); the
//! trait list is derived from those.

use crate::model::{DeclaredTrait, ParamValue, TestTrait};
use crate::vocabulary;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fully qualified test method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId {
    pub class: String,
    pub method: String,
}

impl MethodId {
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class, self.method)
    }
}

/// A value bound to one named method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BoundParam {
    pub name: String,
    pub value: ParamValue,
}

/// Deterministic content hash of a variant (BLAKE3, hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantFingerprint(pub String);

impl fmt::Display for VariantFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Variant {
    method: MethodId,
    selection: Option<TestTrait>,
    params: Vec<BoundParam>,
    traits: Vec<TestTrait>,
    /// Type id → index into `traits`; the later trait wins on duplicates.
    lookup: HashMap<String, usize>,
}

impl Variant {
    pub fn new(method: MethodId, selection: Option<TestTrait>, traits: Vec<TestTrait>) -> Self {
        let lookup = traits
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.type_id().map(|id| (id.as_str().to_string(), i)))
            .collect();
        Self {
            method,
            selection,
            params: Vec::new(),
            traits,
            lookup,
        }
    }

    /// Copy of this variant with one more parameter bound.
    pub fn with_param(&self, name: impl Into<String>, value: ParamValue) -> Self {
        let mut next = self.clone();
        next.params.push(BoundParam {
            name: name.into(),
            value,
        });
        next
    }

    pub fn method(&self) -> &MethodId {
        &self.method
    }

    pub fn selection(&self) -> Option<&TestTrait> {
        self.selection.as_ref()
    }

    pub fn params(&self) -> &[BoundParam] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// Resolved, precedence-sorted traits this run executes under.
    pub fn traits(&self) -> &[TestTrait] {
        &self.traits
    }

    /// Method name without selection or parameter suffixes.
    pub fn base_name(&self) -> &str {
        &self.method.method
    }

    /// `method[selection][param1]...`, suffixes present only when bound.
    pub fn name(&self) -> String {
        let mut name = self.base_name().to_string();
        if let Some(selection) = &self.selection {
            name.push('[');
            name.push_str(selection.parameter_name());
            name.push(']');
        }
        for p in &self.params {
            name.push_str(&format!("[{}]", p.value));
        }
        name
    }

    /// `Class#name`.
    pub fn qualified_name(&self) -> String {
        format!("{}#{}", self.method.class, self.name())
    }

    /// Trait of the given type, if the run carries one.
    pub fn get(&self, type_id: &str) -> Option<&DeclaredTrait> {
        self.lookup
            .get(type_id)
            .and_then(|i| self.traits[*i].as_declared())
    }

    pub fn has(&self, type_id: &str) -> bool {
        self.lookup.contains_key(type_id)
    }

    /// Reason from an ignore marker, if the run is ignored.
    pub fn ignore_reason(&self) -> Option<String> {
        self.get(vocabulary::IGNORE).map(|t| {
            t.str_attr(vocabulary::REASON)
                .map(str::to_string)
                .unwrap_or_default()
        })
    }

    pub fn is_ignored(&self) -> bool {
        self.has(vocabulary::IGNORE)
    }

    /// Stable hash of the qualified name and resolved trait list.
    pub fn fingerprint(&self) -> VariantFingerprint {
        use serde_json::json;

        let traits: Vec<String> = self.traits.iter().map(ToString::to_string).collect();
        let canonical = json!({
            "class": &self.method.class,
            "name": self.name(),
            "traits": traits,
        });
        let hash = blake3::hash(canonical.to_string().as_bytes());
        VariantFingerprint(hash.to_hex().to_string())
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.selection == other.selection
            && self.params == other.params
    }
}

impl Eq for Variant {}

impl Hash for Variant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.method.hash(state);
        self.selection.hash(state);
        self.params.hash(state);
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}
