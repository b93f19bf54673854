//! Annotations and compile-time constants.
//!
//! An annotation descriptor is created immediately with its arguments; its
//! type and any enum-entry arguments are bound by postponed tasks, because
//! the annotation class (or the enum) may be the very class whose
//! resolution produced the annotation.

use crate::context::ForeignResolver;
use crate::postponed::PendingAction;
use fdr_common::interner::Atom;
use fdr_common::limits::MAX_TYPE_TRANSFORM_DEPTH;
use fdr_common::names::translate_foreign_name;
use fdr_source::{PrimitiveKind, RawAnnotation, RawConstant, RawType};
use fdr_types::{AnnotationDescriptor, AnnotationId, ConstantValue};
use tracing::trace;

/// Where a constant being resolved will live inside an annotation. Enum
/// entries are bound through this position later.
#[derive(Copy, Clone, Debug)]
struct ArgumentSlot {
    annotation: AnnotationId,
    argument: Atom,
    element: Option<usize>,
}

impl ForeignResolver<'_> {
    /// Resolve a list of raw annotations. Every returned annotation has its
    /// type set by the time this returns.
    pub fn resolve_annotations(&mut self, raw: &[RawAnnotation]) -> Vec<AnnotationId> {
        self.with_postponed(|this| this.resolve_annotations_inner(raw))
    }

    pub fn resolve_annotation(&mut self, raw: &RawAnnotation) -> Option<AnnotationId> {
        self.with_postponed(|this| {
            let name = raw.native_name();
            if this.options.is_internal_annotation(&name) {
                return None;
            }
            Some(this.resolve_annotation_at(raw, 0))
        })
    }

    pub(crate) fn resolve_annotations_inner(&mut self, raw: &[RawAnnotation]) -> Vec<AnnotationId> {
        let mut resolved = Vec::with_capacity(raw.len());
        for annotation in raw {
            if self.options.is_internal_annotation(&annotation.native_name()) {
                continue;
            }
            resolved.push(self.resolve_annotation_at(annotation, 0));
        }
        resolved
    }

    fn resolve_annotation_at(&mut self, raw: &RawAnnotation, depth: u32) -> AnnotationId {
        let class = raw.native_name();
        let id = self.store.alloc_annotation(AnnotationDescriptor::default());
        self.postponed.push(PendingAction::SetAnnotationType {
            annotation: id,
            class: class.clone(),
        });

        let annotation_class = self.find_raw_class(&class);
        for (name, value) in &raw.arguments {
            let expected = annotation_class
                .as_ref()
                .and_then(|c| c.find_method(name))
                .and_then(|m| m.erased_signature().ok())
                .map(|s| s.return_type);
            let argument = self.store.intern(name);
            let slot = ArgumentSlot {
                annotation: id,
                argument,
                element: None,
            };
            if let Some(constant) = self.resolve_constant_at(value, expected.as_ref(), Some(slot), depth)
            {
                self.store.push_annotation_argument(id, argument, constant);
            }
        }
        trace!(annotation = %class, arguments = raw.arguments.len(), "annotation created");
        id
    }

    /// Resolve a constant outside any annotation (field initializers).
    pub(crate) fn resolve_constant(
        &mut self,
        value: &RawConstant,
        expected: Option<&RawType>,
    ) -> Option<ConstantValue> {
        self.resolve_constant_at(value, expected, None, 0)
    }

    fn resolve_constant_at(
        &mut self,
        value: &RawConstant,
        expected: Option<&RawType>,
        slot: Option<ArgumentSlot>,
        depth: u32,
    ) -> Option<ConstantValue> {
        if depth > MAX_TYPE_TRANSFORM_DEPTH {
            return None;
        }
        Some(match value {
            RawConstant::Integer(v) => narrow_integer(*v, expected),
            RawConstant::Long(v) => ConstantValue::Long(*v),
            RawConstant::Float(v) => ConstantValue::Float(*v as f32),
            RawConstant::Double(v) => ConstantValue::Double(*v),
            RawConstant::Char(c) => ConstantValue::Char(*c),
            RawConstant::Bool(b) => ConstantValue::Bool(*b),
            RawConstant::String(s) => ConstantValue::String(s.clone()),
            RawConstant::Null => ConstantValue::Null,
            RawConstant::Enum { class, entry } => {
                let class = translate_foreign_name(class);
                let name = self.store.intern(entry);
                if let Some(slot) = slot {
                    self.postponed.push(PendingAction::BindEnumEntry {
                        annotation: slot.annotation,
                        argument: slot.argument,
                        element: slot.element,
                    });
                }
                ConstantValue::EnumEntry {
                    class,
                    name,
                    entry: None,
                }
            }
            RawConstant::Annotation(nested) => {
                ConstantValue::Annotation(self.resolve_annotation_at(nested, depth + 1))
            }
            RawConstant::Array(items) => {
                let element_type = match expected {
                    Some(RawType::Array(element)) => Some(element.as_ref()),
                    _ => None,
                };
                let mut values = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    // Only elements of a top-level array argument are bindable.
                    let item_slot = match slot {
                        Some(s) if s.element.is_none() => Some(ArgumentSlot {
                            element: Some(index),
                            ..s
                        }),
                        _ => None,
                    };
                    let value = self
                        .resolve_constant_at(item, element_type, item_slot, depth + 1)
                        .unwrap_or(ConstantValue::Null);
                    values.push(value);
                }
                ConstantValue::Array(values)
            }
        })
    }
}

/// Narrow an integer literal to the expected primitive, falling back to
/// `Int` (or `Long` when it does not fit).
fn narrow_integer(value: i64, expected: Option<&RawType>) -> ConstantValue {
    let expected = match expected {
        Some(RawType::Primitive(kind)) => Some(*kind),
        _ => None,
    };
    match expected {
        Some(PrimitiveKind::Byte) => {
            if let Ok(v) = i8::try_from(value) {
                return ConstantValue::Byte(v);
            }
        }
        Some(PrimitiveKind::Short) => {
            if let Ok(v) = i16::try_from(value) {
                return ConstantValue::Short(v);
            }
        }
        Some(PrimitiveKind::Char) => {
            if let Some(c) = u32::try_from(value).ok().and_then(char::from_u32) {
                return ConstantValue::Char(c);
            }
        }
        Some(PrimitiveKind::Long) => return ConstantValue::Long(value),
        Some(PrimitiveKind::Float) => return ConstantValue::Float(value as f32),
        Some(PrimitiveKind::Double) => return ConstantValue::Double(value as f64),
        _ => {}
    }
    match i32::try_from(value) {
        Ok(v) => ConstantValue::Int(v),
        Err(_) => ConstantValue::Long(value),
    }
}

#[cfg(test)]
#[path = "../tests/annotations_tests.rs"]
mod tests;
