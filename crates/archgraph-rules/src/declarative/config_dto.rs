//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use serde::Deserialize;

/// Raw TOML representation of declarative rules.
///
/// Lives next to `[analysis]` and `[[modules]]` in `archgraph.toml`; those
/// sections are ignored here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Namespace isolation rules.
    #[serde(rename = "isolate-namespace", default)]
    pub isolate_namespace: Vec<IsolateNamespaceDto>,

    /// Forbidden module reference patterns.
    #[serde(rename = "forbid-module-dependency", default)]
    pub forbid_module_dependency: Vec<ForbidModuleDependencyDto>,

    /// "Used only by" allow-lists.
    #[serde(rename = "used-only-by", default)]
    pub used_only_by: Vec<UsedOnlyByDto>,

    /// Type and method shape rules.
    #[serde(rename = "type-shape", default)]
    pub type_shape: Vec<TypeShapeDto>,

    /// Solution module policies.
    #[serde(rename = "solution-module", default)]
    pub solution_module: Vec<SolutionModuleDto>,
}

/// TOML representation of a namespace isolation rule.
#[derive(Debug, Clone, Deserialize)]
pub struct IsolateNamespaceDto {
    /// Isolated namespace (e.g., "app.domain").
    pub namespace: String,
    /// Forbid references into the namespace (default: true).
    #[serde(default = "default_true")]
    pub inbound: bool,
    /// Forbid references out of the namespace (default: true).
    #[serde(default = "default_true")]
    pub outbound: bool,
    /// Namespaces exempted from the boundary.
    #[serde(default)]
    pub except: Vec<String>,
}

/// TOML representation of a forbidden module dependency.
#[derive(Debug, Clone, Deserialize)]
pub struct ForbidModuleDependencyDto {
    /// Regex over `name@version` of module references.
    pub pattern: String,
}

/// TOML representation of a "used only by" rule.
#[derive(Debug, Clone, Deserialize)]
pub struct UsedOnlyByDto {
    /// Restricted type.
    pub target: String,
    /// Types allowed to reference the target.
    #[serde(default)]
    pub allowed: Vec<String>,
    /// Skip compiler-generated dependants (default: true).
    #[serde(rename = "exclude-compiler-generated", default = "default_true")]
    pub exclude_compiler_generated: bool,
}

/// TOML representation of a type shape rule.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeShapeDto {
    /// Type (or interface) whose assignable types are constrained.
    pub target: String,
    /// Require (`true`) or forbid (`false`) records.
    #[serde(default)]
    pub record: Option<bool>,
    /// Accepted access levels.
    #[serde(default)]
    pub access: Vec<String>,
    /// Regex over the simple name.
    #[serde(default)]
    pub name: Option<String>,
    /// Required simple-name suffix.
    #[serde(rename = "name-ends-with", default)]
    pub name_ends_with: Option<String>,
    /// Regex over the namespace.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Method constraints.
    #[serde(default)]
    pub methods: Vec<MethodShapeDto>,
}

/// TOML representation of a method constraint.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodShapeDto {
    /// Method name on the target.
    pub method: String,
    /// Required markers.
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// TOML representation of a solution module policy.
#[derive(Debug, Clone, Deserialize)]
pub struct SolutionModuleDto {
    /// Module the policy applies to.
    pub module: String,
    /// Allowed solution modules (mutually exclusive with `forbid`).
    #[serde(default)]
    pub allow: Option<Vec<String>>,
    /// Forbidden solution modules (mutually exclusive with `allow`).
    #[serde(default)]
    pub forbid: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}
