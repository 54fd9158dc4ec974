//! Trait model — typed trait instances, attribute values, classification.
//!
//! - `TraitTypeId`: qualified `namespace.SimpleName` identity of a trait type.
//! - `AttrValue`: closed set of attribute value shapes.
//! - `DeclaredTrait`: a trait instance written in source (type + attributes).
//! - `CompositeTrait`: resolution-time bundle of a name and a trait payload.
//! - `TestTrait`: either of the two, the unit the resolver operates on.
//! - `TraitKind` / `AxisKind`: static classification of a trait type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ─── Identity ────────────────────────────────────────────────────────

/// Qualified trait type name, e.g. `tessera.users.RequireRunOnInitialUser`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitTypeId(pub String);

impl TraitTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text after the last `.`; used as the parameter name of a selected trait.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Text before the last `.`, empty for unqualified ids.
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once('.').map(|(ns, _)| ns).unwrap_or("")
    }

    /// True if the namespace equals `prefix` or is nested below it.
    pub fn in_namespace(&self, prefix: &str) -> bool {
        let ns = self.namespace();
        ns == prefix
            || (ns.len() > prefix.len()
                && ns.starts_with(prefix)
                && ns.as_bytes()[prefix.len()] == b'.')
    }
}

impl fmt::Display for TraitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TraitTypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ─── Attributes ──────────────────────────────────────────────────────

/// Value of a single trait attribute.
///
/// Untagged so that suite files can write attributes inline
/// (`value = ["a", "b"]`). Variant order matters for untagged decoding:
/// an empty array decodes as `Traits(vec![])`, which every list accessor
/// treats as an empty list of its own shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Traits(Vec<DeclaredTrait>),
    IntList(Vec<i64>),
    StrList(Vec<String>),
}

impl AttrValue {
    fn is_empty_list(&self) -> bool {
        match self {
            AttrValue::Traits(v) => v.is_empty(),
            AttrValue::IntList(v) => v.is_empty(),
            AttrValue::StrList(v) => v.is_empty(),
            _ => false,
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Str(_) => "string",
            AttrValue::Traits(_) => "trait list",
            AttrValue::IntList(_) => "int list",
            AttrValue::StrList(_) => "string list",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Str(s) => write!(f, "{s:?}"),
            AttrValue::IntList(v) => write!(f, "{v:?}"),
            AttrValue::StrList(v) => write!(f, "{v:?}"),
            AttrValue::Traits(v) => {
                write!(f, "[")?;
                for (i, t) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Attribute lookup failure on a trait instance.
///
/// This is the single error type for "trait is missing an expected attribute
/// or carries it in the wrong shape"; callers wrap it with their own context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttrError {
    #[error("trait {trait_type} has no attribute '{attr}'")]
    Missing { trait_type: TraitTypeId, attr: String },
    #[error("attribute '{attr}' on trait {trait_type} is a {found}, expected {expected}")]
    WrongShape {
        trait_type: TraitTypeId,
        attr: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("attribute '{attr}' on trait {trait_type} has invalid value '{value}'")]
    InvalidValue {
        trait_type: TraitTypeId,
        attr: String,
        value: String,
    },
}

// ─── Declared trait ──────────────────────────────────────────────────

/// A trait instance as written on a class, method, parameter or trait type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclaredTrait {
    #[serde(rename = "type")]
    pub type_id: TraitTypeId,
    #[serde(flatten)]
    pub attrs: BTreeMap<String, AttrValue>,
}

impl DeclaredTrait {
    pub fn new(type_id: impl Into<TraitTypeId>) -> Self {
        Self {
            type_id: type_id.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, name: &str, value: AttrValue) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    pub fn with_str(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, AttrValue::Str(value.into()))
    }

    pub fn with_strs<S: AsRef<str>>(self, name: &str, values: &[S]) -> Self {
        let list = values.iter().map(|s| s.as_ref().to_string()).collect();
        self.with(name, AttrValue::StrList(list))
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    fn require(&self, name: &str) -> Result<&AttrValue, AttrError> {
        self.attrs.get(name).ok_or_else(|| AttrError::Missing {
            trait_type: self.type_id.clone(),
            attr: name.to_string(),
        })
    }

    fn wrong_shape(&self, name: &str, expected: &'static str, found: &AttrValue) -> AttrError {
        AttrError::WrongShape {
            trait_type: self.type_id.clone(),
            attr: name.to_string(),
            expected,
            found: found.shape(),
        }
    }

    pub fn str_attr(&self, name: &str) -> Result<&str, AttrError> {
        match self.require(name)? {
            AttrValue::Str(s) => Ok(s),
            other => Err(self.wrong_shape(name, "string", other)),
        }
    }

    /// String attribute, or `default` when absent.
    pub fn str_attr_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, AttrError> {
        match self.attrs.get(name) {
            None => Ok(default),
            Some(AttrValue::Str(s)) => Ok(s),
            Some(other) => Err(self.wrong_shape(name, "string", other)),
        }
    }

    pub fn bool_attr_or(&self, name: &str, default: bool) -> Result<bool, AttrError> {
        match self.attrs.get(name) {
            None => Ok(default),
            Some(AttrValue::Bool(b)) => Ok(*b),
            Some(other) => Err(self.wrong_shape(name, "bool", other)),
        }
    }

    /// String list attribute; a single string is accepted as a one-element list.
    pub fn str_list(&self, name: &str) -> Result<Vec<String>, AttrError> {
        match self.require(name)? {
            AttrValue::StrList(v) => Ok(v.clone()),
            AttrValue::Str(s) => Ok(vec![s.clone()]),
            v if v.is_empty_list() => Ok(Vec::new()),
            other => Err(self.wrong_shape(name, "string list", other)),
        }
    }

    /// String list attribute, empty when absent.
    pub fn str_list_or_empty(&self, name: &str) -> Result<Vec<String>, AttrError> {
        if self.attrs.contains_key(name) {
            self.str_list(name)
        } else {
            Ok(Vec::new())
        }
    }

    pub fn int_list(&self, name: &str) -> Result<Vec<i64>, AttrError> {
        match self.require(name)? {
            AttrValue::IntList(v) => Ok(v.clone()),
            AttrValue::Int(i) => Ok(vec![*i]),
            v if v.is_empty_list() => Ok(Vec::new()),
            other => Err(self.wrong_shape(name, "int list", other)),
        }
    }

    /// Nested trait payload (repeating traits carry theirs under `value`).
    pub fn traits_attr(&self, name: &str) -> Result<&[DeclaredTrait], AttrError> {
        match self.require(name)? {
            AttrValue::Traits(v) => Ok(v),
            v if v.is_empty_list() => Ok(&[]),
            other => Err(self.wrong_shape(name, "trait list", other)),
        }
    }

    /// Every trait nested anywhere in this trait's attributes, depth first.
    pub fn nested_traits(&self) -> Vec<&DeclaredTrait> {
        let mut out = Vec::new();
        for value in self.attrs.values() {
            if let AttrValue::Traits(list) = value {
                for t in list {
                    out.push(t);
                    out.extend(t.nested_traits());
                }
            }
        }
        out
    }
}

impl fmt::Display for DeclaredTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.type_id.simple_name())?;
        if !self.attrs.is_empty() {
            write!(f, "(")?;
            for (i, (k, v)) in self.attrs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

// ─── Composite trait ─────────────────────────────────────────────────

/// Synthetic composite: one branch of a parameterized expansion.
///
/// Never declared in source and never present in a resolved trait list; its
/// name becomes the variant's disambiguating suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CompositeTrait {
    pub name: String,
    pub traits: Vec<TestTrait>,
}

impl CompositeTrait {
    pub fn new(name: impl Into<String>, traits: Vec<TestTrait>) -> Self {
        Self {
            name: name.into(),
            traits,
        }
    }

    pub fn from_declared(name: impl Into<String>, traits: Vec<DeclaredTrait>) -> Self {
        Self::new(name, traits.into_iter().map(TestTrait::Declared).collect())
    }
}

// ─── TestTrait ───────────────────────────────────────────────────────

/// The unit the resolver, sorter and expander operate on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TestTrait {
    Declared(DeclaredTrait),
    Composite(CompositeTrait),
}

impl TestTrait {
    pub fn declared(type_id: impl Into<TraitTypeId>) -> Self {
        TestTrait::Declared(DeclaredTrait::new(type_id))
    }

    pub fn type_id(&self) -> Option<&TraitTypeId> {
        match self {
            TestTrait::Declared(d) => Some(&d.type_id),
            TestTrait::Composite(_) => None,
        }
    }

    pub fn as_declared(&self) -> Option<&DeclaredTrait> {
        match self {
            TestTrait::Declared(d) => Some(d),
            TestTrait::Composite(_) => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, TestTrait::Composite(_))
    }

    /// Name used as a variant suffix when this trait is the selection.
    pub fn parameter_name(&self) -> &str {
        match self {
            TestTrait::Declared(d) => d.type_id.simple_name(),
            TestTrait::Composite(c) => &c.name,
        }
    }
}

impl From<DeclaredTrait> for TestTrait {
    fn from(value: DeclaredTrait) -> Self {
        TestTrait::Declared(value)
    }
}

impl From<CompositeTrait> for TestTrait {
    fn from(value: CompositeTrait) -> Self {
        TestTrait::Composite(value)
    }
}

impl fmt::Display for TestTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestTrait::Declared(d) => write!(f, "{d}"),
            TestTrait::Composite(c) => {
                write!(f, "<{}>{{", c.name)?;
                for (i, t) in c.traits.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

// ─── Classification ──────────────────────────────────────────────────

/// Value shape of a parameter-level axis marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    String,
    Int,
    Enum,
}

/// Static classification of a trait type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    /// Direct precondition or configuration directive, no sub-traits.
    Leaf,
    /// Expands into its declared sub-traits and stays observable after them.
    Meta,
    /// Wraps a sequence of traits under its `value` attribute.
    Repeating,
    /// Combinatorial branch point; expands only when selected.
    Parameterized,
    /// Parameter-level axis marker carrying a value sequence.
    Axis(AxisKind),
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraitKind::Leaf => write!(f, "leaf"),
            TraitKind::Meta => write!(f, "meta"),
            TraitKind::Repeating => write!(f, "repeating"),
            TraitKind::Parameterized => write!(f, "parameterized"),
            TraitKind::Axis(AxisKind::String) => write!(f, "axis(string)"),
            TraitKind::Axis(AxisKind::Int) => write!(f, "axis(int)"),
            TraitKind::Axis(AxisKind::Enum) => write!(f, "axis(enum)"),
        }
    }
}

// ─── Parameter values ────────────────────────────────────────────────

/// A single value bound to a method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Enum { enum_type: String, constant: String },
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{s}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Enum { constant, .. } => write!(f, "{constant}"),
        }
    }
}
