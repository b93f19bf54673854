//! Descriptor records stored in the arena.
//!
//! Descriptors are allocated empty and filled in place: a class is visible
//! through its id while its supertypes are still being resolved, which is
//! what lets a class mention itself in its own hierarchy.

use crate::ids::{
    AnnotationId, ClassDescId, ClassParent, FunctionId, MemberOwner, NamespaceId, PropertyId,
    TypeParamId, TypeParamOwner,
};
use crate::types::{TypeId, Variance};
use fdr_common::interner::Atom;
use fdr_common::names::{FqName, FqNameUnsafe};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared enums
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    /// Foreign default (package-level) access.
    PackagePrivate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Final,
    Open,
    Abstract,
}

/// Where a descriptor came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DescriptorOrigin {
    /// Built from a raw foreign declaration.
    Foreign,
    /// Rebuilt from an embedded serialized blob.
    Deserialized,
    /// Registered by the embedder as a native declaration.
    Native,
    /// Part of the builtin `core` package.
    Builtin,
    /// Created by the resolver with no declaration behind it (holders,
    /// SAM constructors and adapters, enum helpers).
    Synthesized,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    AnnotationClass,
    /// Synthesized holder of an enum's entries.
    ClassObject,
}

// =============================================================================
// Classes
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct ClassDescriptor {
    pub fq_name: FqNameUnsafe,
    pub name: Atom,
    pub kind: ClassKind,
    pub modality: Modality,
    pub visibility: Visibility,
    pub origin: DescriptorOrigin,
    pub parent: ClassParent,
    /// Non-static nested class capturing the outer instance.
    pub is_inner: bool,
    pub type_params: Vec<TypeParamId>,
    pub supertypes: Vec<TypeId>,
    pub class_object: Option<ClassDescId>,
    pub annotations: Vec<AnnotationId>,
    /// Some supertype could not be resolved and was replaced by an error type.
    pub incomplete: bool,
    /// Members built eagerly (builtins, deserialized classes, holders).
    /// Foreign classes leave these empty and resolve members on request.
    pub functions: Vec<FunctionId>,
    pub constructors: Vec<FunctionId>,
    pub properties: Vec<PropertyId>,
}

impl ClassDescriptor {
    pub fn new(
        fq_name: FqNameUnsafe,
        name: Atom,
        kind: ClassKind,
        parent: ClassParent,
        origin: DescriptorOrigin,
    ) -> Self {
        Self {
            fq_name,
            name,
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            origin,
            parent,
            is_inner: false,
            type_params: Vec::new(),
            supertypes: Vec::new(),
            class_object: None,
            annotations: Vec::new(),
            incomplete: false,
            functions: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::AnnotationClass)
    }

    /// Whether members are resolved lazily from a raw declaration.
    pub fn has_lazy_members(&self) -> bool {
        self.origin == DescriptorOrigin::Foreign
    }
}

// =============================================================================
// Namespaces
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NamespaceKind {
    Root,
    /// A foreign package.
    Package,
    /// The static members of a foreign class, reachable under the class's name.
    ClassStatics(ClassDescId),
    /// A package rebuilt from an embedded blob.
    Deserialized,
    /// A native package registered by the embedder.
    Native,
}

#[derive(Clone, Debug, Serialize)]
pub struct NamespaceDescriptor {
    pub fq_name: FqName,
    pub kind: NamespaceKind,
    pub parent: Option<NamespaceId>,
    pub functions: Vec<FunctionId>,
    pub properties: Vec<PropertyId>,
}

impl NamespaceDescriptor {
    pub fn new(fq_name: FqName, kind: NamespaceKind, parent: Option<NamespaceId>) -> Self {
        Self {
            fq_name,
            kind,
            parent,
            functions: Vec::new(),
            properties: Vec::new(),
        }
    }
}

// =============================================================================
// Type parameters
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct TypeParameterDescriptor {
    pub name: Atom,
    pub index: u32,
    pub variance: Variance,
    pub owner: TypeParamOwner,
    /// `None` until the second resolution phase.
    pub(crate) upper_bounds: Option<Vec<TypeId>>,
}

impl TypeParameterDescriptor {
    pub fn is_initialized(&self) -> bool {
        self.upper_bounds.is_some()
    }

    /// Bounds if the second phase has run. Prefer
    /// [`DescriptorStore::upper_bounds`](crate::store::DescriptorStore::upper_bounds),
    /// which treats an early read as a fatal error.
    pub fn bounds(&self) -> Option<&[TypeId]> {
        self.upper_bounds.as_deref()
    }
}

// =============================================================================
// Members
// =============================================================================

/// How the effective signature of a member was obtained.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SignatureSource {
    /// Straight from the raw foreign signature.
    Declared,
    /// Narrowed by overridden super members.
    Propagated,
    /// Replaced by an attached external signature.
    External,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FunctionKind {
    Declared,
    Constructor,
    /// Inherited member not overridden in the owner.
    FakeOverride,
    /// Overload taking function types in place of SAM interfaces.
    SamAdapter,
    /// Namespace function building a SAM interface from a function value.
    SamConstructor,
    /// Enum helpers `values()` and `valueOf(String)`.
    EnumHelper,
}

/// Relationship of a member to a same-named super member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum OverrideKind {
    Override,
    /// Overrides after substitution, but the erased shapes differ so the
    /// foreign side needs a bridge.
    Bridge,
    Overload,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValueParameter {
    pub name: Atom,
    pub index: u32,
    pub ty: TypeId,
    /// Element type when this is a vararg parameter.
    pub vararg_element: Option<TypeId>,
    pub has_default: bool,
    pub annotations: Vec<AnnotationId>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FunctionDescriptor {
    pub name: Atom,
    pub owner: MemberOwner,
    pub kind: FunctionKind,
    pub origin: DescriptorOrigin,
    pub type_params: Vec<TypeParamId>,
    pub receiver_type: Option<TypeId>,
    pub value_params: Vec<ValueParameter>,
    pub return_type: TypeId,
    pub modality: Modality,
    pub visibility: Visibility,
    pub is_static: bool,
    /// Overridden super members with the relationship found.
    pub overridden: Vec<(FunctionId, OverrideKind)>,
    /// Declaration a fake override or SAM adapter was derived from.
    pub original: Option<FunctionId>,
    pub annotations: Vec<AnnotationId>,
    pub signature_source: SignatureSource,
    pub signature_errors: Vec<String>,
}

impl FunctionDescriptor {
    pub fn new(name: Atom, owner: MemberOwner, kind: FunctionKind, origin: DescriptorOrigin) -> Self {
        Self {
            name,
            owner,
            kind,
            origin,
            type_params: Vec::new(),
            receiver_type: None,
            value_params: Vec::new(),
            return_type: TypeId::ERROR,
            modality: Modality::Final,
            visibility: Visibility::Public,
            is_static: false,
            overridden: Vec::new(),
            original: None,
            annotations: Vec::new(),
            signature_source: SignatureSource::Declared,
            signature_errors: Vec::new(),
        }
    }

    pub fn has_vararg(&self) -> bool {
        self.value_params.iter().any(|p| p.vararg_element.is_some())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyKind {
    Declared,
    FakeOverride,
    EnumEntry,
}

#[derive(Clone, Debug, Serialize)]
pub struct PropertyDescriptor {
    pub name: Atom,
    pub owner: MemberOwner,
    pub kind: PropertyKind,
    pub origin: DescriptorOrigin,
    pub ty: TypeId,
    pub is_var: bool,
    pub modality: Modality,
    pub visibility: Visibility,
    pub is_static: bool,
    pub compile_time_constant: Option<ConstantValue>,
    pub overridden: Vec<PropertyId>,
    pub original: Option<PropertyId>,
    pub annotations: Vec<AnnotationId>,
    pub signature_source: SignatureSource,
    pub signature_errors: Vec<String>,
}

impl PropertyDescriptor {
    pub fn new(name: Atom, owner: MemberOwner, kind: PropertyKind, origin: DescriptorOrigin) -> Self {
        Self {
            name,
            owner,
            kind,
            origin,
            ty: TypeId::ERROR,
            is_var: false,
            modality: Modality::Final,
            visibility: Visibility::Public,
            is_static: false,
            compile_time_constant: None,
            overridden: Vec::new(),
            original: None,
            annotations: Vec::new(),
            signature_source: SignatureSource::Declared,
            signature_errors: Vec::new(),
        }
    }
}

// =============================================================================
// Annotations and constants
// =============================================================================

/// A compile-time constant: an annotation argument or a field initializer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ConstantValue {
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    /// Null literal, also the marker for an array element that failed.
    Null,
    /// Reference to an enum entry. `entry` is bound by a postponed task.
    EnumEntry {
        class: FqNameUnsafe,
        name: Atom,
        entry: Option<PropertyId>,
    },
    Annotation(AnnotationId),
    Array(Vec<ConstantValue>),
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AnnotationDescriptor {
    /// Set by a postponed task; never `None` once the creating query returns.
    pub annotation_type: Option<TypeId>,
    pub arguments: Vec<(Atom, ConstantValue)>,
}

impl AnnotationDescriptor {
    pub fn argument(&self, name: Atom) -> Option<&ConstantValue> {
        self.arguments
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub(crate) fn argument_mut(&mut self, name: Atom) -> Option<&mut ConstantValue> {
        self.arguments
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}
