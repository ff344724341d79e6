//! DTO → Domain model conversion with validation.

use super::config_dto::{
    DeclarativeConfigDto, IsolateNamespaceDto, MethodShapeDto, SolutionModuleDto, TypeShapeDto,
    UsedOnlyByDto,
};
use super::model::{
    non_empty, valid_pattern, DeclarativeRules, MethodShapeRule, ModelError, NamespaceIsolation,
    SolutionModuleRule, TypeShapeRule, UsedOnlyBy,
};
use archgraph_core::AccessLevel;
use std::collections::BTreeSet;

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "type-shape[0].target").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// The `allow` and `forbid` fields are both set or both missing.
    #[error("{context}: exactly one of `allow` or `forbid` must be set")]
    AmbiguousPolicy {
        /// The entry that has the conflict.
        context: String,
    },

    /// Unknown access level string.
    #[error("{context}: {message}")]
    UnknownAccessLevel {
        /// Where the error occurred.
        context: String,
        /// Parser message.
        message: String,
    },
}

fn at(context: impl Into<String>) -> impl FnOnce(ModelError) -> LoadError {
    let context = context.into();
    move |source| LoadError::Validation { context, source }
}

/// Converts a `DeclarativeConfigDto` to validated [`DeclarativeRules`].
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: DeclarativeConfigDto) -> Result<DeclarativeRules, LoadError> {
    let isolations = dto
        .isolate_namespace
        .into_iter()
        .enumerate()
        .map(|(i, d)| convert_isolation(d, i))
        .collect::<Result<Vec<_>, _>>()?;

    let forbidden = dto
        .forbid_module_dependency
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            valid_pattern(&d.pattern).map_err(at(format!("forbid-module-dependency[{i}].pattern")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let used_only = dto
        .used_only_by
        .into_iter()
        .enumerate()
        .map(|(i, d)| convert_used_only(d, i))
        .collect::<Result<Vec<_>, _>>()?;

    let shapes = dto
        .type_shape
        .into_iter()
        .enumerate()
        .map(|(i, d)| convert_type_shape(d, i))
        .collect::<Result<Vec<_>, _>>()?;

    let solution = dto
        .solution_module
        .into_iter()
        .enumerate()
        .map(|(i, d)| convert_solution_module(d, i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DeclarativeRules::new(
        isolations, forbidden, used_only, shapes, solution,
    ))
}

fn convert_isolation(dto: IsolateNamespaceDto, index: usize) -> Result<NamespaceIsolation, LoadError> {
    let ctx = format!("isolate-namespace[{index}]");
    let namespace = non_empty(&dto.namespace).map_err(at(format!("{ctx}.namespace")))?;
    if !dto.inbound && !dto.outbound {
        return Err(LoadError::Validation {
            context: ctx,
            source: ModelError::NoDirection,
        });
    }
    let except = dto
        .except
        .iter()
        .enumerate()
        .map(|(j, e)| non_empty(e).map_err(at(format!("{ctx}.except[{j}]"))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NamespaceIsolation {
        namespace,
        inbound: dto.inbound,
        outbound: dto.outbound,
        except,
    })
}

fn convert_used_only(dto: UsedOnlyByDto, index: usize) -> Result<UsedOnlyBy, LoadError> {
    let ctx = format!("used-only-by[{index}]");
    let target = non_empty(&dto.target).map_err(at(format!("{ctx}.target")))?;
    let allowed = dto
        .allowed
        .iter()
        .enumerate()
        .map(|(j, a)| non_empty(a).map_err(at(format!("{ctx}.allowed[{j}]"))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(UsedOnlyBy {
        target,
        allowed,
        exclude_compiler_generated: dto.exclude_compiler_generated,
    })
}

fn convert_type_shape(dto: TypeShapeDto, index: usize) -> Result<TypeShapeRule, LoadError> {
    let ctx = format!("type-shape[{index}]");
    let target = non_empty(&dto.target).map_err(at(format!("{ctx}.target")))?;

    let access = dto
        .access
        .iter()
        .enumerate()
        .map(|(j, a)| {
            a.parse::<AccessLevel>()
                .map_err(|message| LoadError::UnknownAccessLevel {
                    context: format!("{ctx}.access[{j}]"),
                    message,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let name = dto
        .name
        .as_deref()
        .map(valid_pattern)
        .transpose()
        .map_err(at(format!("{ctx}.name")))?;
    let namespace = dto
        .namespace
        .as_deref()
        .map(valid_pattern)
        .transpose()
        .map_err(at(format!("{ctx}.namespace")))?;
    let name_ends_with = dto
        .name_ends_with
        .as_deref()
        .map(non_empty)
        .transpose()
        .map_err(at(format!("{ctx}.name-ends-with")))?;

    let methods = dto
        .methods
        .into_iter()
        .enumerate()
        .map(|(j, m)| convert_method(m, &format!("{ctx}.methods[{j}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let rule = TypeShapeRule {
        target,
        record: dto.record,
        access,
        name,
        name_ends_with,
        namespace,
        methods,
    };
    if rule.is_empty() {
        return Err(LoadError::Validation {
            context: ctx,
            source: ModelError::EmptyShape(rule.target),
        });
    }
    Ok(rule)
}

fn convert_method(dto: MethodShapeDto, ctx: &str) -> Result<MethodShapeRule, LoadError> {
    let method = non_empty(&dto.method).map_err(at(format!("{ctx}.method")))?;
    if dto.attributes.is_empty() {
        return Err(LoadError::Validation {
            context: ctx.to_string(),
            source: ModelError::NoAttributes(method),
        });
    }
    let attributes = dto
        .attributes
        .iter()
        .enumerate()
        .map(|(k, a)| non_empty(a).map_err(at(format!("{ctx}.attributes[{k}]"))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MethodShapeRule { method, attributes })
}

fn convert_solution_module(
    dto: SolutionModuleDto,
    index: usize,
) -> Result<SolutionModuleRule, LoadError> {
    let ctx = format!("solution-module[{index}]");
    let module = non_empty(&dto.module).map_err(at(format!("{ctx}.module")))?;
    let names = |list: Vec<String>, field: &str| {
        list.iter()
            .enumerate()
            .map(|(j, n)| non_empty(n).map_err(at(format!("{ctx}.{field}[{j}]"))))
            .collect::<Result<BTreeSet<String>, LoadError>>()
    };

    match (dto.allow, dto.forbid) {
        (Some(allow), None) => Ok(SolutionModuleRule::Allow {
            module,
            modules: names(allow, "allow")?,
        }),
        (None, Some(forbid)) => Ok(SolutionModuleRule::Forbid {
            module,
            modules: names(forbid, "forbid")?,
        }),
        _ => Err(LoadError::AmbiguousPolicy { context: ctx }),
    }
}
