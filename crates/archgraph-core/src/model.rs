//! Language-independent model of modules, types and members.
//!
//! Everything in this module is a read-only projection produced once per
//! analysis run by a [`ModuleIntrospector`](crate::ModuleIntrospector).
//! The reference graph and all validators work exclusively on these types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Property name whose presence marks a record-shaped type.
pub const EQUALITY_CONTRACT: &str = "EqualityContract";

// ────────────────────────────────────────────
// Names
// ────────────────────────────────────────────

/// A namespace-qualified type name.
///
/// Serialized as its dotted full name (`App.Tuna.Tuna`). The namespace is
/// everything before the last `.`; a name without a dot lives in the global
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeName {
    namespace: Option<String>,
    name: String,
}

impl TypeName {
    /// Creates a name from an optional namespace and a simple name.
    ///
    /// An empty namespace is normalised to the global namespace.
    #[must_use]
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(String::from),
            name: name.into(),
        }
    }

    /// Parses a dotted full name.
    #[must_use]
    pub fn parse(full_name: &str) -> Self {
        match full_name.rsplit_once('.') {
            Some((ns, name)) => Self::new(Some(ns), name),
            None => Self::new(None, full_name),
        }
    }

    /// Returns the namespace, or `None` for the global namespace.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the dotted full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Whether this type lives in `namespace` or one of its children.
    #[must_use]
    pub fn is_in_namespace(&self, namespace: &str) -> bool {
        namespace_contains(namespace, self.namespace())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.full_name()
    }
}

/// Prefix-based namespace containment.
///
/// `outer` contains `inner` iff they are equal or `inner` starts with
/// `outer + "."`. The global namespace (`None`) is contained by nothing.
#[must_use]
pub fn namespace_contains(outer: &str, inner: Option<&str>) -> bool {
    let Some(inner) = inner else {
        return false;
    };
    inner == outer
        || inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Identity of a node in the reference graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    /// Type name.
    pub name: TypeName,
    /// Owning module.
    pub module: String,
}

impl TypeKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(module: impl Into<String>, name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ────────────────────────────────────────────
// Type references
// ────────────────────────────────────────────

/// A reference to a (possibly constructed) named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedType {
    /// Name of the type definition.
    #[serde(rename = "type")]
    pub name: TypeName,
    /// Module that owns the definition. Empty means "the referencing module".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    /// Generic arguments, empty for non-generic references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,
}

impl NamedType {
    /// Graph identity of the referenced definition.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        TypeKey {
            name: self.name.clone(),
            module: self.module.clone(),
        }
    }
}

/// A type as it appears in a signature, base list or interface list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    /// A generic placeholder such as `T`.
    Generic {
        /// Placeholder name.
        generic: String,
    },
    /// A named type, possibly with generic arguments.
    Named(NamedType),
}

impl TypeRef {
    /// Creates a non-generic named reference.
    #[must_use]
    pub fn named(module: impl Into<String>, name: impl Into<TypeName>) -> Self {
        Self::Named(NamedType {
            name: name.into(),
            module: module.into(),
            args: Vec::new(),
        })
    }

    /// Creates a generic placeholder reference.
    #[must_use]
    pub fn generic(name: impl Into<String>) -> Self {
        Self::Generic {
            generic: name.into(),
        }
    }

    /// Replaces the generic arguments of a named reference.
    #[must_use]
    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        if let Self::Named(named) = &mut self {
            named.args = args;
        }
        self
    }

    /// Returns the named part, or `None` for a placeholder.
    #[must_use]
    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            Self::Named(named) => Some(named),
            Self::Generic { .. } => None,
        }
    }

    /// Returns the definition name, or `None` for a placeholder.
    #[must_use]
    pub fn definition(&self) -> Option<&TypeName> {
        self.as_named().map(|n| &n.name)
    }

    /// Whether this is a generic placeholder.
    #[must_use]
    pub fn is_generic_parameter(&self) -> bool {
        matches!(self, Self::Generic { .. })
    }

    /// Collects the definition keys of this reference and all of its
    /// generic arguments, skipping placeholders.
    pub fn collect_keys(&self, out: &mut Vec<TypeKey>) {
        if let Self::Named(named) = self {
            out.push(named.key());
            for arg in &named.args {
                arg.collect_keys(out);
            }
        }
    }

    /// Fills empty module names with `module`, recursively.
    pub(crate) fn fill_module(&mut self, module: &str) {
        if let Self::Named(named) = self {
            if named.module.is_empty() {
                named.module = module.to_string();
            }
            for arg in &mut named.args {
                arg.fill_module(module);
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { generic } => f.write_str(generic),
            Self::Named(named) => {
                write!(f, "{}", named.name)?;
                if !named.args.is_empty() {
                    let args: Vec<String> = named.args.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

// ────────────────────────────────────────────
// Attributes and members
// ────────────────────────────────────────────

/// A metadata marker attached to a type or member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Marker type name.
    pub name: TypeName,
    /// Marker arguments as key/value pairs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, String>,
}

impl Attribute {
    /// Creates a marker without arguments.
    #[must_use]
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            arguments: BTreeMap::new(),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Whether this marker is `name`.
    ///
    /// A query without namespace matches on the simple name only.
    #[must_use]
    pub fn is(&self, name: &TypeName) -> bool {
        if name.namespace().is_none() {
            return self.name.name() == name.name();
        }
        self.name == *name
    }
}

/// Kind of a type member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// Stored field.
    Field,
    /// Property (value-typed accessor).
    Property,
    /// Constructor.
    Constructor,
    /// Method.
    Method,
}

/// A member declared directly on a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Member name.
    pub name: String,
    /// Member kind.
    pub kind: MemberKind,
    /// Parameter types, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TypeRef>,
    /// Field/property type or method return type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
    /// Attached markers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Interface instantiation this method explicitly implements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<NamedType>,
}

impl Member {
    fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parameters: Vec::new(),
            value_type: None,
            attributes: Vec::new(),
            interface: None,
        }
    }

    /// Creates a field.
    #[must_use]
    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        let mut member = Self::new(name, MemberKind::Field);
        member.value_type = Some(ty);
        member
    }

    /// Creates a property.
    #[must_use]
    pub fn property(name: impl Into<String>, ty: TypeRef) -> Self {
        let mut member = Self::new(name, MemberKind::Property);
        member.value_type = Some(ty);
        member
    }

    /// Creates a constructor.
    #[must_use]
    pub fn constructor(parameters: Vec<TypeRef>) -> Self {
        let mut member = Self::new(".ctor", MemberKind::Constructor);
        member.parameters = parameters;
        member
    }

    /// Creates a method.
    #[must_use]
    pub fn method(
        name: impl Into<String>,
        parameters: Vec<TypeRef>,
        return_type: Option<TypeRef>,
    ) -> Self {
        let mut member = Self::new(name, MemberKind::Method);
        member.parameters = parameters;
        member.value_type = return_type;
        member
    }

    /// Adds a marker.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Records the interface instantiation this method implements.
    #[must_use]
    pub fn implementing(mut self, interface: NamedType) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Whether this member is a method.
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    /// All types in this member's signature: parameters, then value type.
    pub fn signature(&self) -> impl Iterator<Item = &TypeRef> {
        self.parameters.iter().chain(self.value_type.iter())
    }

    /// Whether this member carries the marker `name`.
    #[must_use]
    pub fn has_attribute(&self, name: &TypeName) -> bool {
        self.attributes.iter().any(|a| a.is(name))
    }
}

// ────────────────────────────────────────────
// Types
// ────────────────────────────────────────────

/// Structural kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Reference type.
    Class,
    /// Interface (trait).
    Interface,
    /// Record-shaped type with structural equality.
    Record,
    /// Value type.
    Struct,
}

/// Declared accessibility of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    /// Visible everywhere.
    Public,
    /// Visible inside the owning module.
    Internal,
    /// Visible to the enclosing scope and its children.
    Protected,
    /// Visible to the enclosing scope only.
    Private,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Public => "Public",
            Self::Internal => "Internal",
            Self::Protected => "Protected",
            Self::Private => "Private",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            "protected" => Ok(Self::Protected),
            "private" => Ok(Self::Private),
            _ => Err(format!(
                "unknown access level `{s}`, expected: public, internal, protected, private"
            )),
        }
    }
}

/// Structural description of one type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Namespace-qualified name.
    pub name: TypeName,
    /// Owning module. Filled from the enclosing module when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    /// Structural kind.
    pub kind: TypeKind,
    /// Declared accessibility.
    pub access: AccessLevel,
    /// Base type, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeRef>,
    /// Directly implemented interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    /// Members declared directly on this type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    /// Type-level markers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Enclosing type for nested types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeName>,
    /// Generic parameter names; non-empty for open generic definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<String>,
}

impl TypeDescriptor {
    /// Creates a public, member-less type.
    #[must_use]
    pub fn new(module: impl Into<String>, name: impl Into<TypeName>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            kind,
            access: AccessLevel::Public,
            base_type: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            attributes: Vec::new(),
            declaring_type: None,
            generic_parameters: Vec::new(),
        }
    }

    /// Sets the access level.
    #[must_use]
    pub fn with_access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    /// Sets the base type.
    #[must_use]
    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base_type = Some(base);
        self
    }

    /// Adds an implemented interface.
    #[must_use]
    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Adds a member.
    #[must_use]
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Adds a type-level marker.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Marks this type as nested inside `declaring`.
    #[must_use]
    pub fn nested_in(mut self, declaring: impl Into<TypeName>) -> Self {
        self.declaring_type = Some(declaring.into());
        self
    }

    /// Declares generic parameters, making this an open generic definition.
    #[must_use]
    pub fn with_generic_parameters<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_parameters = params.into_iter().map(Into::into).collect();
        self
    }

    /// Graph identity of this type.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        TypeKey {
            name: self.name.clone(),
            module: self.module.clone(),
        }
    }

    /// Namespace of this type.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace()
    }

    /// Whether this type is an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Whether this type is record-shaped.
    ///
    /// Either declared as a record or carrying an equality-contract property.
    #[must_use]
    pub fn is_record(&self) -> bool {
        self.kind == TypeKind::Record
            || self
                .members
                .iter()
                .any(|m| m.kind == MemberKind::Property && m.name == EQUALITY_CONTRACT)
    }

    /// Whether this type is declared inside another type.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.declaring_type.is_some()
    }

    /// Whether this type is an open generic definition.
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    /// Access level as observable from outside.
    ///
    /// Top-level types can only be public or internal; anything else
    /// collapses to internal.
    #[must_use]
    pub fn effective_access(&self) -> AccessLevel {
        if self.is_nested() {
            return self.access;
        }
        match self.access {
            AccessLevel::Public => AccessLevel::Public,
            _ => AccessLevel::Internal,
        }
    }

    /// Methods declared on this type.
    pub fn methods(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_method())
    }

    /// Whether this type carries the marker `name`.
    #[must_use]
    pub fn has_attribute(&self, name: &TypeName) -> bool {
        self.attributes.iter().any(|a| a.is(name))
    }

    fn fill_module(&mut self, module: &str) {
        if self.module.is_empty() {
            self.module = module.to_string();
        }
        let refs = self
            .base_type
            .iter_mut()
            .chain(self.interfaces.iter_mut())
            .chain(self.members.iter_mut().flat_map(|m| {
                m.parameters.iter_mut().chain(m.value_type.iter_mut())
            }));
        for r in refs {
            r.fill_module(module);
        }
        for member in &mut self.members {
            if let Some(interface) = &mut member.interface {
                if interface.module.is_empty() {
                    interface.module = module.to_string();
                }
            }
        }
    }
}

// ────────────────────────────────────────────
// Modules
// ────────────────────────────────────────────

/// A module-level dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleReference {
    /// Referenced module name.
    pub name: String,
    /// Referenced version, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ModuleReference {
    /// Creates an unversioned reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Returns `name@version`, or just the name when unversioned.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{v}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A named, versioned unit of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name.
    pub name: String,
    /// Module version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Declared module-level dependencies.
    #[serde(default)]
    pub references: Vec<ModuleReference>,
    /// Types defined in this module, in enumeration order.
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

impl ModuleDescriptor {
    /// Creates an empty module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            references: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Adds a module-level reference.
    #[must_use]
    pub fn with_reference(mut self, reference: ModuleReference) -> Self {
        self.references.push(reference);
        self
    }

    /// Adds a type, taking ownership of it for this module.
    #[must_use]
    pub fn with_type(mut self, mut ty: TypeDescriptor) -> Self {
        if ty.module.is_empty() {
            ty.module.clone_from(&self.name);
        }
        self.types.push(ty);
        self
    }

    /// Fills omitted module names on types and references with this
    /// module's name.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let name = self.name.clone();
        for ty in &mut self.types {
            ty.fill_module(&name);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_last_dot() {
        let name = TypeName::parse("App.Tuna.Tuna");
        assert_eq!(name.namespace(), Some("App.Tuna"));
        assert_eq!(name.name(), "Tuna");
        assert_eq!(name.full_name(), "App.Tuna.Tuna");

        let global = TypeName::parse("Tuna");
        assert_eq!(global.namespace(), None);
        assert_eq!(global.to_string(), "Tuna");
    }

    #[test]
    fn namespace_containment_is_prefix_on_segments() {
        assert!(namespace_contains("App.Tuna", Some("App.Tuna")));
        assert!(namespace_contains("App.Tuna", Some("App.Tuna.Atlantic")));
        assert!(!namespace_contains("App.Tuna", Some("App.TunaCan")));
        assert!(!namespace_contains("App.Tuna", Some("App")));
        assert!(!namespace_contains("App.Tuna", None));
    }

    #[test]
    fn record_detection() {
        let record = TypeDescriptor::new("App", "App.ARecord", TypeKind::Record);
        let contract = TypeDescriptor::new("App", "App.Legacy", TypeKind::Class).with_member(
            Member::property(EQUALITY_CONTRACT, TypeRef::named("System", "System.Type")),
        );
        let class = TypeDescriptor::new("App", "App.AClass", TypeKind::Class);
        assert!(record.is_record());
        assert!(contract.is_record());
        assert!(!class.is_record());
    }

    #[test]
    fn effective_access_of_top_level_types() {
        let private = TypeDescriptor::new("App", "App.A", TypeKind::Class)
            .with_access(AccessLevel::Private);
        assert_eq!(private.effective_access(), AccessLevel::Internal);

        let nested = private.clone().nested_in("App.Outer");
        assert_eq!(nested.effective_access(), AccessLevel::Private);
    }

    #[test]
    fn attribute_matching_by_simple_or_full_name() {
        let attr = Attribute::new("App.Markers.TransactionalAttribute");
        assert!(attr.is(&TypeName::parse("App.Markers.TransactionalAttribute")));
        assert!(attr.is(&TypeName::parse("TransactionalAttribute")));
        assert!(!attr.is(&TypeName::parse("Other.TransactionalAttribute")));
    }

    #[test]
    fn normalized_fills_module_names() {
        let module = ModuleDescriptor::new("App")
            .with_type(
                TypeDescriptor::new("", "App.Tuna", TypeKind::Class)
                    .with_member(Member::field("salmon", TypeRef::named("", "App.Salmon"))),
            )
            .normalized();

        let ty = &module.types[0];
        assert_eq!(ty.module, "App");
        let field_ty = ty.members[0].value_type.as_ref().and_then(TypeRef::as_named);
        assert_eq!(field_ty.map(|n| n.module.as_str()), Some("App"));
    }

    #[test]
    fn type_ref_collects_generic_argument_keys() {
        let list = TypeRef::named("System", "System.Collections.Generic.List")
            .with_args(vec![TypeRef::named("App", "App.Salmon"), TypeRef::generic("T")]);
        let mut keys = Vec::new();
        list.collect_keys(&mut keys);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1], TypeKey::new("App", "App.Salmon"));
        assert_eq!(list.to_string(), "System.Collections.Generic.List<App.Salmon, T>");
    }

    #[test]
    fn snapshot_json_shape() {
        let json = r#"{
            "name": "App.Tuna.Tuna",
            "kind": "class",
            "access": "Public",
            "members": [
                { "name": ".ctor", "kind": "constructor",
                  "parameters": [ { "type": "App.Salmon.Salmon" } ] },
                { "name": "Handle", "kind": "method",
                  "parameters": [ { "generic": "T" } ] }
            ]
        }"#;
        let ty: TypeDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(ty.name.full_name(), "App.Tuna.Tuna");
        assert!(ty.members[1].parameters[0].is_generic_parameter());
        assert_eq!(
            ty.members[0].parameters[0].definition(),
            Some(&TypeName::parse("App.Salmon.Salmon"))
        );
    }
}
