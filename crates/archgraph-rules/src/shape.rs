//! Type and method shape rules.
//!
//! Both rules apply to every non-interface type under test that is
//! assignable to the target, so a rule on an interface covers all of its
//! implementers.
//!
//! - `AG030` checks record-ness, access level, name and namespace.
//! - `AG031` requires markers on a selected method. For an interface target
//!   the method is mapped to each implementer's member through the
//!   interface, open generic definitions included. An implementer without a
//!   matching member is skipped.
//!
//! Every predicate is evaluated on its own; one type can fail several.

use archgraph_core::{
    find_implementing_method, signature_matches, AccessLevel, ConfigurationError, Member,
    RuleKind, Subject, TypeDescriptor, TypeIndex, TypeName, TypeRef, ValidationContext, Validator,
    Violation,
};
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

/// Rule code for type-shape.
pub const TYPE_CODE: &str = "AG030";

/// Rule name for type-shape.
pub const TYPE_NAME: &str = "type-shape";

/// Rule code for method-attribute.
pub const METHOD_CODE: &str = "AG031";

/// Rule name for method-attribute.
pub const METHOD_NAME: &str = "method-attribute";

/// Structural constraints on the types assignable to a target.
#[derive(Debug, Clone)]
pub struct TypeShape {
    target: TypeName,
    record: Option<bool>,
    access: Vec<AccessLevel>,
    name_pattern: Option<Regex>,
    name_suffix: Option<String>,
    namespace_pattern: Option<Regex>,
}

impl TypeShape {
    /// Creates an empty shape for `target`.
    #[must_use]
    pub fn new(target: impl Into<TypeName>) -> Self {
        Self {
            target: target.into(),
            record: None,
            access: Vec::new(),
            name_pattern: None,
            name_suffix: None,
            namespace_pattern: None,
        }
    }

    /// Requires (`true`) or forbids (`false`) record-shaped types.
    #[must_use]
    pub fn record(mut self, record: bool) -> Self {
        self.record = Some(record);
        self
    }

    /// Adds an accepted access level.
    #[must_use]
    pub fn access(mut self, level: AccessLevel) -> Self {
        if !self.access.contains(&level) {
            self.access.push(level);
        }
        self
    }

    /// Requires the simple name to match `pattern`.
    #[must_use]
    pub fn name_pattern(mut self, pattern: Regex) -> Self {
        self.name_pattern = Some(pattern);
        self
    }

    /// Requires the simple name to end with `suffix`.
    #[must_use]
    pub fn name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.name_suffix = Some(suffix.into());
        self
    }

    /// Requires the namespace to match `pattern`. The global namespace is
    /// matched as the empty string.
    #[must_use]
    pub fn namespace_pattern(mut self, pattern: Regex) -> Self {
        self.namespace_pattern = Some(pattern);
        self
    }

    /// The target type.
    #[must_use]
    pub fn target(&self) -> &TypeName {
        &self.target
    }

    /// Whether no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record.is_none()
            && self.access.is_empty()
            && self.name_pattern.is_none()
            && self.name_suffix.is_none()
            && self.namespace_pattern.is_none()
    }

    fn check(&self, ty: &TypeDescriptor, out: &mut Vec<Violation>) {
        let violation = |message: String| {
            Violation::new(
                TYPE_CODE,
                TYPE_NAME,
                RuleKind::Shape,
                ty.name.full_name(),
                Subject::None,
                message,
            )
        };

        if let Some(expected) = self.record {
            if ty.is_record() != expected {
                let message = if expected {
                    format!("Type '{}' is not a record, expected a record", ty.name)
                } else {
                    format!("Type '{}' is a record, expected a non-record type", ty.name)
                };
                out.push(violation(message));
            }
        }

        if !self.access.is_empty() {
            let actual = ty.effective_access();
            if !self.access.contains(&actual) {
                let expected = self
                    .access
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push(violation(format!(
                    "Type '{}' has access level '{actual}', expected one of [{expected}]",
                    ty.name
                )));
            }
        }

        if let Some(pattern) = &self.name_pattern {
            if !pattern.is_match(ty.name.name()) {
                out.push(violation(format!(
                    "Type '{}' name '{}' does not match pattern '{pattern}'",
                    ty.name,
                    ty.name.name()
                )));
            }
        }

        if let Some(suffix) = &self.name_suffix {
            if !ty.name.name().ends_with(suffix.as_str()) {
                out.push(violation(format!(
                    "Type '{}' name does not end with '{suffix}'",
                    ty.name
                )));
            }
        }

        if let Some(pattern) = &self.namespace_pattern {
            let namespace = ty.namespace().unwrap_or_default();
            if !pattern.is_match(namespace) {
                out.push(violation(format!(
                    "Type '{}' namespace '{namespace}' does not match pattern '{pattern}'",
                    ty.name
                )));
            }
        }
    }
}

/// Validator for every registered [`TypeShape`].
#[derive(Debug, Clone, Default)]
pub struct TypeShapes {
    shapes: Vec<TypeShape>,
}

impl TypeShapes {
    /// Creates a validator with no shapes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape.
    #[must_use]
    pub fn shape(mut self, shape: TypeShape) -> Self {
        self.push(shape);
        self
    }

    /// Adds a shape in place. Empty shapes are dropped.
    pub fn push(&mut self, shape: TypeShape) {
        if !shape.is_empty() {
            self.shapes.push(shape);
        }
    }

    /// Whether no shape is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Validator for TypeShapes {
    fn name(&self) -> &'static str {
        TYPE_NAME
    }

    fn code(&self) -> &'static str {
        TYPE_CODE
    }

    fn description(&self) -> &'static str {
        "Types assignable to a target must have the configured record-ness, access, name and namespace"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Shape
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for shape in &self.shapes {
            for ty in applicable(ctx, &shape.target) {
                shape.check(ty, &mut violations);
            }
        }
        violations
    }
}

/// Selects a method on a target type by name and, optionally, parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSelector {
    /// Method name.
    pub name: String,
    /// Parameter types; `None` selects the first method with the name.
    pub parameters: Option<Vec<TypeRef>>,
}

impl MethodSelector {
    /// Selects by name only.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: None,
        }
    }

    /// Narrows the selection to an exact parameter list.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<TypeRef>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    fn matches(&self, member: &Member) -> bool {
        if !member.is_method() || member.name != self.name {
            return false;
        }
        match &self.parameters {
            None => true,
            Some(params) => {
                signature_matches(&Member::method(&self.name, params.clone(), None), member)
            }
        }
    }

    fn locate<'a>(&self, ty: &'a TypeDescriptor) -> Option<&'a Member> {
        ty.methods().find(|m| self.matches(m))
    }
}

impl From<&str> for MethodSelector {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

/// Required markers on one method of a target type.
#[derive(Debug, Clone)]
pub struct MethodAttribute {
    target: TypeName,
    target_is_interface: bool,
    method: Member,
    required: Vec<TypeName>,
}

impl MethodAttribute {
    /// Resolves `selector` on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownTarget`] if the target type is
    /// not loaded or declares no matching method.
    pub fn new(
        index: &TypeIndex,
        target: &TypeName,
        selector: &MethodSelector,
    ) -> Result<Self, ConfigurationError> {
        let ty = index.find(target).ok_or_else(|| ConfigurationError::UnknownTarget {
            target: target.full_name(),
        })?;
        let method = selector
            .locate(ty)
            .ok_or_else(|| ConfigurationError::UnknownTarget {
                target: format!("{target}.{}", selector.name),
            })?;
        Ok(Self {
            target: target.clone(),
            target_is_interface: ty.is_interface(),
            method: method.clone(),
            required: Vec::new(),
        })
    }

    /// Requires the marker `attribute`. A name without a namespace matches
    /// markers by simple name.
    #[must_use]
    pub fn require(mut self, attribute: impl Into<TypeName>) -> Self {
        let attribute = attribute.into();
        if !self.required.contains(&attribute) {
            self.required.push(attribute);
        }
        self
    }

    /// Whether no marker is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    fn resolve<'a>(&self, ty: &'a TypeDescriptor, index: &'a TypeIndex) -> Option<&'a Member> {
        if self.target_is_interface {
            return find_implementing_method(ty, &self.target, &self.method, index);
        }

        // Concrete targets: the method is declared on the type or inherited
        // from its base chain.
        let mut visited = BTreeSet::new();
        let mut current = Some(ty);
        while let Some(owner) = current {
            if !visited.insert(owner.key()) {
                break;
            }
            if let Some(found) = owner
                .methods()
                .find(|m| signature_matches(&self.method, m))
            {
                return Some(found);
            }
            current = owner
                .base_type
                .as_ref()
                .and_then(TypeRef::as_named)
                .and_then(|b| index.resolve(b));
        }
        None
    }

    fn check(&self, ctx: &ValidationContext<'_>, ty: &TypeDescriptor, out: &mut Vec<Violation>) {
        let Some(member) = self.resolve(ty, ctx.index) else {
            debug!(
                ty = %ty.name,
                method = %self.method.name,
                "no implementing method, skipped"
            );
            return;
        };

        for attribute in self.required.iter().filter(|a| !member.has_attribute(a)) {
            out.push(
                Violation::new(
                    METHOD_CODE,
                    METHOD_NAME,
                    RuleKind::Shape,
                    ty.name.full_name(),
                    Subject::Method(member.name.clone()),
                    format!(
                        "Method '{}' in type '{}' expected to have attribute '{attribute}'",
                        member.name, ty.name
                    ),
                )
                .with_help(format!(
                    "annotate '{}.{}' with '{}'",
                    ty.name,
                    member.name,
                    attribute.name()
                )),
            );
        }
    }
}

/// Validator for every registered [`MethodAttribute`].
#[derive(Debug, Clone, Default)]
pub struct MethodAttributes {
    rules: Vec<MethodAttribute>,
}

impl MethodAttributes {
    /// Creates a validator with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, rule: MethodAttribute) -> Self {
        self.push(rule);
        self
    }

    /// Adds a rule in place. Rules requiring nothing are dropped.
    pub fn push(&mut self, rule: MethodAttribute) {
        if !rule.is_empty() {
            self.rules.push(rule);
        }
    }

    /// Whether no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Validator for MethodAttributes {
    fn name(&self) -> &'static str {
        METHOD_NAME
    }

    fn code(&self) -> &'static str {
        METHOD_CODE
    }

    fn description(&self) -> &'static str {
        "Selected methods must carry the required markers"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Shape
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            for ty in applicable(ctx, &rule.target) {
                rule.check(ctx, ty, &mut violations);
            }
        }
        violations
    }
}

fn applicable<'a>(
    ctx: &'a ValidationContext<'a>,
    target: &'a TypeName,
) -> impl Iterator<Item = &'a TypeDescriptor> + 'a {
    ctx.types_under_test()
        .filter(move |t| !t.is_interface() && ctx.index.is_assignable_to(t, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::run;
    use archgraph_core::{
        compile_pattern, Attribute, MemberKind, ModuleDescriptor, NamedType, TypeKind,
    };

    fn messages(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.message.as_str()).collect()
    }

    fn commands() -> ModuleDescriptor {
        ModuleDescriptor::new("App")
            .with_type(TypeDescriptor::new("App", "App.Commands.ICommand", TypeKind::Interface))
            .with_type(
                TypeDescriptor::new("App", "App.Commands.CreateOrderCommand", TypeKind::Record)
                    .with_interface(TypeRef::named("App", "App.Commands.ICommand")),
            )
            .with_type(
                TypeDescriptor::new("App", "App.Orders.CancelOrder", TypeKind::Class)
                    .with_access(AccessLevel::Private)
                    .with_interface(TypeRef::named("App", "App.Commands.ICommand")),
            )
            .with_type(TypeDescriptor::new("App", "App.Orders.Order", TypeKind::Class))
    }

    #[test]
    fn shape_applies_to_implementers_only() {
        let rule = TypeShapes::new().shape(
            TypeShape::new("App.Commands.ICommand")
                .record(true)
                .name_suffix("Command")
                .namespace_pattern(compile_pattern(r"\.Commands$").unwrap()),
        );
        let violations = run(rule, vec![commands()]);

        assert_eq!(
            messages(&violations),
            vec![
                "Type 'App.Orders.CancelOrder' is not a record, expected a record",
                "Type 'App.Orders.CancelOrder' name does not end with 'Command'",
                "Type 'App.Orders.CancelOrder' namespace 'App.Orders' does not match pattern '\\.Commands$'",
            ]
        );
        assert!(violations.iter().all(|v| v.code == TYPE_CODE));
    }

    #[test]
    fn record_can_be_forbidden() {
        let rule = TypeShapes::new().shape(TypeShape::new("App.Commands.ICommand").record(false));
        let violations = run(rule, vec![commands()]);
        assert_eq!(
            messages(&violations),
            vec!["Type 'App.Commands.CreateOrderCommand' is a record, expected a non-record type"]
        );
    }

    #[test]
    fn equality_contract_marks_a_record() {
        let module = ModuleDescriptor::new("App").with_type(
            TypeDescriptor::new("App", "App.Money", TypeKind::Class).with_member(Member::property(
                "EqualityContract",
                TypeRef::named("System.Runtime", "System.Type"),
            )),
        );
        let rule = TypeShapes::new().shape(TypeShape::new("App.Money").record(true));
        assert!(run(rule, vec![module]).is_empty());
    }

    #[test]
    fn top_level_access_is_normalised() {
        let rule = TypeShapes::new()
            .shape(TypeShape::new("App.Commands.ICommand").access(AccessLevel::Internal));
        let violations = run(rule, vec![commands()]);

        // A private top-level type is effectively internal.
        assert_eq!(
            messages(&violations),
            vec!["Type 'App.Commands.CreateOrderCommand' has access level 'Public', expected one of [Internal]"]
        );
    }

    #[test]
    fn nested_access_is_kept() {
        let module = ModuleDescriptor::new("App")
            .with_type(TypeDescriptor::new("App", "App.Outer", TypeKind::Class))
            .with_type(
                TypeDescriptor::new("App", "App.Outer+Inner", TypeKind::Class)
                    .with_access(AccessLevel::Protected)
                    .nested_in("App.Outer"),
            );
        let rule = TypeShapes::new().shape(
            TypeShape::new("App.Outer+Inner")
                .access(AccessLevel::Private)
                .access(AccessLevel::Public),
        );
        let violations = run(rule, vec![module]);
        assert_eq!(
            messages(&violations),
            vec!["Type 'App.Outer+Inner' has access level 'Protected', expected one of [Private, Public]"]
        );
    }

    #[test]
    fn name_pattern_uses_the_simple_name() {
        let rule = TypeShapes::new().shape(
            TypeShape::new("App.Orders.Order").name_pattern(compile_pattern("^Order$").unwrap()),
        );
        assert!(run(rule, vec![commands()]).is_empty());
    }

    #[test]
    fn empty_shapes_are_dropped() {
        assert!(TypeShapes::new().shape(TypeShape::new("App.Orders.Order")).is_empty());
    }

    fn marked(name: &str) -> Attribute {
        Attribute::new(name)
    }

    fn handlers() -> ModuleDescriptor {
        let t = TypeRef::generic("T");
        let handler_of = |arg: &str| {
            TypeRef::named("App", "App.IHandler").with_args(vec![TypeRef::named("App", arg)])
        };
        ModuleDescriptor::new("App")
            .with_type(
                TypeDescriptor::new("App", "App.IHandler", TypeKind::Interface)
                    .with_generic_parameters(["T"])
                    .with_member(Member::method("Handle", vec![t], None)),
            )
            .with_type(TypeDescriptor::new("App", "App.Ping", TypeKind::Record))
            .with_type(TypeDescriptor::new("App", "App.Pong", TypeKind::Record))
            .with_type(
                TypeDescriptor::new("App", "App.PingHandler", TypeKind::Class)
                    .with_interface(handler_of("App.Ping"))
                    .with_member(
                        Member::method("Handle", vec![TypeRef::named("App", "App.Ping")], None)
                            .with_attribute(marked("App.TransactionalAttribute")),
                    ),
            )
            .with_type(
                TypeDescriptor::new("App", "App.PongHandler", TypeKind::Class)
                    .with_interface(handler_of("App.Pong"))
                    .with_member(Member::method(
                        "Handle",
                        vec![TypeRef::named("App", "App.Pong")],
                        None,
                    )),
            )
            .with_type(
                TypeDescriptor::new("App", "App.BrokenHandler", TypeKind::Class)
                    .with_interface(handler_of("App.Pong")),
            )
    }

    fn method_rule(modules: &[ModuleDescriptor], target: &str, method: &str) -> MethodAttribute {
        let index = TypeIndex::new(modules.to_vec());
        MethodAttribute::new(&index, &TypeName::parse(target), &MethodSelector::named(method))
            .unwrap()
    }

    #[test]
    fn open_generic_interface_method_is_mapped_to_implementers() {
        let modules = vec![handlers()];
        let rule = MethodAttributes::new().rule(
            method_rule(&modules, "App.IHandler", "Handle").require("App.TransactionalAttribute"),
        );
        let violations = run(rule, modules);

        // BrokenHandler has no matching member and is skipped.
        assert_eq!(
            messages(&violations),
            vec!["Method 'Handle' in type 'App.PongHandler' expected to have attribute 'App.TransactionalAttribute'"]
        );
        assert_eq!(violations[0].referenced, Subject::Method("Handle".into()));
        assert_eq!(violations[0].code, METHOD_CODE);
    }

    #[test]
    fn simple_attribute_names_match_any_namespace() {
        let modules = vec![handlers()];
        let rule = MethodAttributes::new()
            .rule(method_rule(&modules, "App.IHandler", "Handle").require("TransactionalAttribute"));
        assert_eq!(run(rule, modules).len(), 1);
    }

    #[test]
    fn explicit_implementation_wins() {
        let explicit = Member::method("Handle", vec![TypeRef::named("App", "App.Ping")], None)
            .implementing(NamedType {
                name: "App.IHandler".into(),
                module: "App".into(),
                args: vec![TypeRef::named("App", "App.Ping")],
            })
            .with_attribute(marked("Transactional"));
        let module = ModuleDescriptor::new("App")
            .with_type(
                TypeDescriptor::new("App", "App.IHandler", TypeKind::Interface)
                    .with_generic_parameters(["T"])
                    .with_member(Member::method("Handle", vec![TypeRef::generic("T")], None)),
            )
            .with_type(
                TypeDescriptor::new("App", "App.Both", TypeKind::Class)
                    .with_interface(
                        TypeRef::named("App", "App.IHandler")
                            .with_args(vec![TypeRef::named("App", "App.Ping")]),
                    )
                    .with_member(Member::method(
                        "Handle",
                        vec![TypeRef::named("App", "App.Ping")],
                        None,
                    ))
                    .with_member(explicit),
            );
        let modules = vec![module];
        let rule = MethodAttributes::new()
            .rule(method_rule(&modules, "App.IHandler", "Handle").require("Transactional"));
        assert!(run(rule, modules).is_empty());
    }

    #[test]
    fn concrete_target_checks_its_own_method() {
        let module = ModuleDescriptor::new("App").with_type(
            TypeDescriptor::new("App", "App.TypeWithAttribute", TypeKind::Class)
                .with_member(
                    Member::method("MethodWithAttribute", vec![], None)
                        .with_attribute(marked("App.TestForMethodAttribute")),
                )
                .with_member(Member::method("MethodWithoutAttribute", vec![], None)),
        );
        let modules = vec![module];

        let ok = method_rule(&modules, "App.TypeWithAttribute", "MethodWithAttribute")
            .require("App.TestForMethodAttribute");
        assert!(run(MethodAttributes::new().rule(ok), modules.clone()).is_empty());

        let bad = method_rule(&modules, "App.TypeWithAttribute", "MethodWithoutAttribute")
            .require("App.TestForMethodAttribute");
        let violations = run(MethodAttributes::new().rule(bad), modules);
        assert_eq!(
            messages(&violations),
            vec!["Method 'MethodWithoutAttribute' in type 'App.TypeWithAttribute' expected to have attribute 'App.TestForMethodAttribute'"]
        );
    }

    #[test]
    fn selector_with_parameters_disambiguates_overloads() {
        let module = ModuleDescriptor::new("App").with_type(
            TypeDescriptor::new("App", "App.Api", TypeKind::Class)
                .with_member(Member::method("Get", vec![], None))
                .with_member(
                    Member::method("Get", vec![TypeRef::named("std", "std.String")], None)
                        .with_attribute(marked("Cached")),
                ),
        );
        let index = TypeIndex::new(vec![module.clone()]);
        let selector =
            MethodSelector::named("Get").with_parameters(vec![TypeRef::named("std", "std.String")]);
        let rule = MethodAttribute::new(&index, &TypeName::parse("App.Api"), &selector)
            .unwrap()
            .require("Cached");
        assert!(run(MethodAttributes::new().rule(rule), vec![module]).is_empty());
    }

    #[test]
    fn unknown_targets_are_configuration_errors() {
        let index = TypeIndex::new(vec![handlers()]);
        let err = MethodAttribute::new(&index, &"App.Missing".into(), &"Handle".into()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownTarget {
                target: "App.Missing".into()
            }
        );

        let err = MethodAttribute::new(&index, &"App.IHandler".into(), &"Run".into()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownTarget {
                target: "App.IHandler.Run".into()
            }
        );
    }

    #[test]
    fn fields_are_never_selected() {
        let module = ModuleDescriptor::new("App").with_type(
            TypeDescriptor::new("App", "App.Config", TypeKind::Class)
                .with_member(Member::field("Load", TypeRef::named("std", "std.String"))),
        );
        let index = TypeIndex::new(vec![module]);
        assert!(index.find(&"App.Config".into()).unwrap().members[0].kind == MemberKind::Field);
        assert!(MethodAttribute::new(&index, &"App.Config".into(), &"Load".into()).is_err());
    }
}
