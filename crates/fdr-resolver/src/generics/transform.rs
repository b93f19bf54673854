//! Usage-driven transformation of foreign type expressions.
//!
//! | Foreign | Usage | Native |
//! |---------|-------|--------|
//! | `void` | any | `Unit` |
//! | `int[]` | any | `IntArray` |
//! | `String[]` | parameter | `Array<out String>?` |
//! | `java.util.List<T>` | parameter | `List<T>?` |
//! | `java.util.List<T>` | return | `MutableList<T>?` |
//! | `Comparable` (raw) | supertype | `Comparable<Any?>` |
//! | `? extends Number` | argument | `out Number` |

use super::type_params::mentions_param;
use super::{TypeFlags, TypeUsage, TypeVariableResolver};
use crate::context::ForeignResolver;
use crate::policy::SearchPolicy;
use fdr_common::limits::MAX_TYPE_TRANSFORM_DEPTH;
use fdr_common::names::translate_foreign_name;
use fdr_source::{PrimitiveKind, RawType, RawTypeArg};
use fdr_types::{
    ClassDescId, PrimitiveType, TypeArgs, TypeId, TypeParamId, TypeProjection, Variance,
    platform_class,
};
use tracing::trace;

pub(crate) fn primitive_type(kind: PrimitiveKind) -> Option<PrimitiveType> {
    Some(match kind {
        PrimitiveKind::Boolean => PrimitiveType::Boolean,
        PrimitiveKind::Byte => PrimitiveType::Byte,
        PrimitiveKind::Char => PrimitiveType::Char,
        PrimitiveKind::Short => PrimitiveType::Short,
        PrimitiveKind::Int => PrimitiveType::Int,
        PrimitiveKind::Long => PrimitiveType::Long,
        PrimitiveKind::Float => PrimitiveType::Float,
        PrimitiveKind::Double => PrimitiveType::Double,
        PrimitiveKind::Void => return None,
    })
}

impl ForeignResolver<'_> {
    pub(crate) fn transform_type(
        &mut self,
        raw: &RawType,
        usage: TypeUsage,
        flags: TypeFlags,
        scope: &TypeVariableResolver,
    ) -> TypeId {
        self.transform_at(raw, usage, flags, scope, 0)
    }

    fn transform_at(
        &mut self,
        raw: &RawType,
        usage: TypeUsage,
        flags: TypeFlags,
        scope: &TypeVariableResolver,
        depth: u32,
    ) -> TypeId {
        if depth > MAX_TYPE_TRANSFORM_DEPTH {
            trace!(?raw, "type transform depth exceeded");
            return TypeId::ERROR;
        }
        let nullable = flags.nullable_in(usage);
        match raw {
            RawType::Primitive(kind) => match primitive_type(*kind) {
                Some(primitive) => self.builtins.primitive_type(&mut self.types, primitive),
                None => self.builtins.unit_type,
            },
            RawType::TypeVariable(name) => match scope.resolve(&self.store, name) {
                Some(param) => self.types.parameter(param, nullable),
                None => {
                    let atom = self.store.intern(name);
                    self.types.error(atom, nullable)
                }
            },
            RawType::Array(element) => {
                if let RawType::Primitive(kind) = element.as_ref()
                    && let Some(primitive) = primitive_type(*kind)
                {
                    let class = self.builtins.primitive_array(primitive);
                    return self.types.simple(class, nullable);
                }
                let element_type = self.transform_at(
                    element,
                    usage.argument_usage(),
                    TypeFlags::empty(),
                    scope,
                    depth + 1,
                );
                let projection = if usage == TypeUsage::MemberSignatureContravariant
                    && !flags.contains(TypeFlags::VARARG)
                {
                    TypeProjection::out(element_type)
                } else {
                    TypeProjection::invariant(element_type)
                };
                self.types
                    .class_type(self.builtins.array, [projection], nullable)
            }
            RawType::Class {
                name, arguments, ..
            } => self.transform_class(name, arguments, usage, nullable, scope, depth),
        }
    }

    fn transform_class(
        &mut self,
        binary_name: &str,
        arguments: &[RawTypeArg],
        usage: TypeUsage,
        nullable: bool,
        scope: &TypeVariableResolver,
        depth: u32,
    ) -> TypeId {
        let native = translate_foreign_name(binary_name);
        let class = match platform_class(native.as_str()) {
            Some(mapped) => {
                let read_only = usage == TypeUsage::MemberSignatureContravariant;
                Some(self.builtins.platform_mapped(mapped, read_only))
            }
            None => self.resolve_class_inner(&native, SearchPolicy::PreferNative),
        };
        let Some(class) = class else {
            let atom = self.store.intern(native.as_str());
            return self.types.error(atom, nullable);
        };

        let params = self.store.class(class).type_params.clone();
        let args: TypeArgs = if params.is_empty() {
            TypeArgs::new()
        } else if arguments.is_empty() {
            params
                .iter()
                .map(|&param| self.raw_argument(class, param, usage))
                .collect()
        } else if arguments.len() != params.len() {
            trace!(class = %native, expected = params.len(), found = arguments.len(), "argument count mismatch");
            let atom = self.store.intern(native.as_str());
            let error = self.types.error(atom, false);
            params
                .iter()
                .map(|_| TypeProjection::invariant(error))
                .collect()
        } else {
            let mut args = TypeArgs::new();
            for (&param, argument) in params.iter().zip(arguments) {
                let projection =
                    self.transform_argument(class, param, argument, usage, scope, depth);
                args.push(projection);
            }
            args
        };
        self.types.class_type(class, args, nullable)
    }

    /// Argument synthesized for a raw (argument-less) use of a generic class.
    fn raw_argument(&mut self, class: ClassDescId, param: TypeParamId, usage: TypeUsage) -> TypeProjection {
        let first_bound = self
            .store
            .type_param(param)
            .bounds()
            .and_then(|bounds| bounds.first().copied());
        let fallback = self.builtins.nullable_any_type;
        // A bound mentioning the parameter itself (or not yet known, when
        // the class is still being materialized) cannot be expanded.
        let expandable = first_bound.filter(|&bound| !mentions_param(&self.types, bound, param));
        if usage.is_supertype() {
            let bound = expandable
                .filter(|&bound| !self.mentions_any_param_of(bound, class))
                .unwrap_or(fallback);
            return TypeProjection::invariant(bound);
        }
        match expandable {
            Some(_) => TypeProjection::Star,
            None => TypeProjection::out(fallback),
        }
    }

    fn mentions_any_param_of(&self, ty: TypeId, class: ClassDescId) -> bool {
        self.store
            .class(class)
            .type_params
            .iter()
            .any(|&p| mentions_param(&self.types, ty, p))
    }

    fn transform_argument(
        &mut self,
        class: ClassDescId,
        param: TypeParamId,
        argument: &RawTypeArg,
        usage: TypeUsage,
        scope: &TypeVariableResolver,
        depth: u32,
    ) -> TypeProjection {
        let argument_usage = usage.argument_usage();
        let (kind, raw) = match argument {
            RawTypeArg::Star => {
                if usage.is_supertype() {
                    return self.raw_argument(class, param, usage);
                }
                return TypeProjection::Star;
            }
            RawTypeArg::Invariant(raw) => (Variance::Invariant, raw),
            RawTypeArg::Extends(raw) => (Variance::Out, raw),
            RawTypeArg::Super(raw) => (Variance::In, raw),
        };
        let ty = self.transform_at(raw, argument_usage, TypeFlags::empty(), scope, depth + 1);
        // Supertypes cannot be projected.
        if usage.is_supertype() || kind == Variance::Invariant {
            return TypeProjection::invariant(ty);
        }
        let declared = self.store.type_param(param).variance;
        if declared == kind {
            TypeProjection::invariant(ty)
        } else if declared != Variance::Invariant {
            TypeProjection::Star
        } else {
            TypeProjection::Type { variance: kind, ty }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/transform_tests.rs"]
mod tests;
