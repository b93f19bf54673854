//! Descriptor arena.
//!
//! One `DescriptorStore` per resolution session owns every descriptor the
//! session creates. Ids are dense indices handed out by the `alloc_*`
//! methods; a descriptor is never freed or moved, so ids stay valid for the
//! lifetime of the store.

use crate::descriptors::{
    AnnotationDescriptor, ClassDescriptor, ConstantValue, FunctionDescriptor,
    NamespaceDescriptor, PropertyDescriptor, TypeParameterDescriptor,
};
use crate::ids::{
    AnnotationId, ClassDescId, FunctionId, NamespaceId, PropertyId, TypeParamId, TypeParamOwner,
};
use crate::invariant::{InvariantViolation, fatal};
use crate::types::{TypeId, Variance};
use fdr_common::interner::{Atom, Interner};
use tracing::trace;

pub struct DescriptorStore {
    /// Member, parameter and class short names.
    pub names: Interner,
    classes: Vec<ClassDescriptor>,
    namespaces: Vec<NamespaceDescriptor>,
    functions: Vec<FunctionDescriptor>,
    properties: Vec<PropertyDescriptor>,
    type_params: Vec<TypeParameterDescriptor>,
    annotations: Vec<AnnotationDescriptor>,
}

impl Default for DescriptorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorStore {
    pub fn new() -> Self {
        let mut names = Interner::new();
        names.intern_common();
        Self {
            names,
            classes: Vec::new(),
            namespaces: Vec::new(),
            functions: Vec::new(),
            properties: Vec::new(),
            type_params: Vec::new(),
            annotations: Vec::new(),
        }
    }

    #[inline]
    pub fn intern(&mut self, name: &str) -> Atom {
        self.names.intern(name)
    }

    #[inline]
    pub fn name(&self, atom: Atom) -> &str {
        self.names.resolve(atom)
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub fn alloc_class(&mut self, class: ClassDescriptor) -> ClassDescId {
        let id = ClassDescId::from_index(self.classes.len());
        trace!(class = %class.fq_name, id = id.0, "allocated class descriptor");
        self.classes.push(class);
        id
    }

    #[inline]
    pub fn class(&self, id: ClassDescId) -> &ClassDescriptor {
        &self.classes[id.index()]
    }

    #[inline]
    pub fn class_mut(&mut self, id: ClassDescId) -> &mut ClassDescriptor {
        &mut self.classes[id.index()]
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassDescId> + use<> {
        (0..self.classes.len()).map(ClassDescId::from_index)
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    pub fn alloc_namespace(&mut self, namespace: NamespaceDescriptor) -> NamespaceId {
        let id = NamespaceId::from_index(self.namespaces.len());
        trace!(namespace = %namespace.fq_name, id = id.0, "allocated namespace descriptor");
        self.namespaces.push(namespace);
        id
    }

    #[inline]
    pub fn namespace(&self, id: NamespaceId) -> &NamespaceDescriptor {
        &self.namespaces[id.index()]
    }

    #[inline]
    pub fn namespace_mut(&mut self, id: NamespaceId) -> &mut NamespaceDescriptor {
        &mut self.namespaces[id.index()]
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub fn alloc_function(&mut self, function: FunctionDescriptor) -> FunctionId {
        let id = FunctionId::from_index(self.functions.len());
        self.functions.push(function);
        id
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &FunctionDescriptor {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionDescriptor {
        &mut self.functions[id.index()]
    }

    pub fn alloc_property(&mut self, property: PropertyDescriptor) -> PropertyId {
        let id = PropertyId::from_index(self.properties.len());
        self.properties.push(property);
        id
    }

    #[inline]
    pub fn property(&self, id: PropertyId) -> &PropertyDescriptor {
        &self.properties[id.index()]
    }

    #[inline]
    pub fn property_mut(&mut self, id: PropertyId) -> &mut PropertyDescriptor {
        &mut self.properties[id.index()]
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    /// Allocate a type parameter placeholder whose bounds are not yet known.
    pub fn alloc_type_param(
        &mut self,
        name: Atom,
        index: u32,
        variance: Variance,
        owner: TypeParamOwner,
    ) -> TypeParamId {
        let id = TypeParamId::from_index(self.type_params.len());
        self.type_params.push(TypeParameterDescriptor {
            name,
            index,
            variance,
            owner,
            upper_bounds: None,
        });
        id
    }

    #[inline]
    pub fn type_param(&self, id: TypeParamId) -> &TypeParameterDescriptor {
        &self.type_params[id.index()]
    }

    pub fn set_type_param_owner(&mut self, id: TypeParamId, owner: TypeParamOwner) {
        self.type_params[id.index()].owner = owner;
    }

    /// Complete the second phase of type parameter resolution.
    pub fn set_upper_bounds(&mut self, id: TypeParamId, bounds: Vec<TypeId>) {
        let param = &mut self.type_params[id.index()];
        if param.upper_bounds.is_some() {
            let name = self.names.resolve(param.name).to_string();
            fatal(InvariantViolation::BoundsInitializedTwice { param: name });
        }
        param.upper_bounds = Some(bounds);
    }

    /// Replace the bounds of an initialized parameter (signature propagation).
    pub fn replace_upper_bounds(&mut self, id: TypeParamId, bounds: Vec<TypeId>) {
        let param = &mut self.type_params[id.index()];
        if param.upper_bounds.is_none() {
            let name = self.names.resolve(param.name).to_string();
            fatal(InvariantViolation::UninitializedBounds { param: name });
        }
        param.upper_bounds = Some(bounds);
    }

    /// Upper bounds of an initialized type parameter.
    pub fn upper_bounds(&self, id: TypeParamId) -> &[TypeId] {
        let param = &self.type_params[id.index()];
        match &param.upper_bounds {
            Some(bounds) => bounds,
            None => fatal(InvariantViolation::UninitializedBounds {
                param: self.names.resolve(param.name).to_string(),
            }),
        }
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    pub fn alloc_annotation(&mut self, annotation: AnnotationDescriptor) -> AnnotationId {
        let id = AnnotationId::from_index(self.annotations.len());
        self.annotations.push(annotation);
        id
    }

    #[inline]
    pub fn annotation(&self, id: AnnotationId) -> &AnnotationDescriptor {
        &self.annotations[id.index()]
    }

    pub fn set_annotation_type(&mut self, id: AnnotationId, ty: TypeId) {
        self.annotations[id.index()].annotation_type = Some(ty);
    }

    pub fn push_annotation_argument(&mut self, id: AnnotationId, name: Atom, value: ConstantValue) {
        self.annotations[id.index()].arguments.push((name, value));
    }

    /// Bind an enum-entry argument (or one element of an array argument).
    ///
    /// When `entry` is `None` the reference failed: an array element is
    /// replaced by the null marker and a top-level argument is dropped.
    pub fn bind_enum_entry(
        &mut self,
        id: AnnotationId,
        argument: Atom,
        element: Option<usize>,
        entry: Option<PropertyId>,
    ) {
        let annotation = &mut self.annotations[id.index()];
        match (element, entry) {
            (None, None) => annotation.arguments.retain(|(n, _)| *n != argument),
            (element, entry) => {
                let Some(value) = annotation.argument_mut(argument) else {
                    return;
                };
                let slot = match (element, value) {
                    (Some(i), ConstantValue::Array(items)) => items.get_mut(i),
                    (None, value) => Some(value),
                    _ => None,
                };
                if let Some(slot) = slot {
                    match entry {
                        Some(property) => {
                            if let ConstantValue::EnumEntry { entry, .. } = slot {
                                *entry = Some(property);
                            }
                        }
                        None => *slot = ConstantValue::Null,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/store_tests.rs"]
mod tests;
