//! Raw declaration shapes reported by a declaration source.
//!
//! These are plain data: no resolution has happened. Names are foreign
//! binary names (`a.b.Outer$Inner`); signatures are unparsed text.

use crate::error::SignatureError;
use crate::signature::{
    ClassSignature, MethodSignature, RawType, parse_class_signature, parse_field_signature,
    parse_method_signature,
};
use bitflags::bitflags;
use fdr_common::names::{FqName, FqNameUnsafe, translate_foreign_name};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Declared modifiers of a foreign class or member.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const SYNTHETIC = 1 << 6;
        const VARARGS = 1 << 7;
        /// Field is an enum constant.
        const ENUM = 1 << 8;
        /// Compiler-generated bridge method.
        const BRIDGE = 1 << 9;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

// =============================================================================
// Constants and annotations
// =============================================================================

/// A constant as written in the foreign declaration: an annotation argument
/// or a field initializer. Integer literals carry no width; the resolver
/// narrows them against the expected type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawConstant {
    Integer(i64),
    Long(i64),
    Float(f64),
    Double(f64),
    Char(char),
    Bool(bool),
    String(String),
    Null,
    Enum { class: String, entry: String },
    Annotation(RawAnnotation),
    Array(Vec<RawConstant>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    /// Binary name of the annotation class.
    pub name: String,
    #[serde(default)]
    pub arguments: IndexMap<String, RawConstant>,
}

impl RawAnnotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: IndexMap::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: RawConstant) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn native_name(&self) -> FqNameUnsafe {
        translate_foreign_name(&self.name)
    }
}

// =============================================================================
// Members
// =============================================================================

/// A method or constructor. Constructors are named `<init>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawMethod {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Erased descriptor, e.g. `(ILjava/lang/String;)V`.
    pub descriptor: String,
    /// Generic signature, when the method mentions type variables or arguments.
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub parameter_names: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
    #[serde(default)]
    pub parameter_annotations: Vec<Vec<RawAnnotation>>,
    /// Signature written in native syntax that overrides the derived one.
    #[serde(default)]
    pub external_signature: Option<String>,
    /// Default value of an annotation class member.
    #[serde(default)]
    pub default_value: Option<RawConstant>,
}

impl RawMethod {
    pub const CONSTRUCTOR_NAME: &'static str = "<init>";

    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::PUBLIC,
            descriptor: descriptor.into(),
            signature: None,
            parameter_names: Vec::new(),
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            external_signature: None,
            default_value: None,
        }
    }

    pub fn constructor(descriptor: impl Into<String>) -> Self {
        Self::new(Self::CONSTRUCTOR_NAME, descriptor)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_parameter_names(mut self, names: &[&str]) -> Self {
        self.parameter_names = names.iter().map(|n| (*n).to_string()).collect();
        self
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_parameter_annotation(mut self, index: usize, annotation: RawAnnotation) -> Self {
        if self.parameter_annotations.len() <= index {
            self.parameter_annotations.resize(index + 1, Vec::new());
        }
        self.parameter_annotations[index].push(annotation);
        self
    }

    pub fn with_external_signature(mut self, signature: impl Into<String>) -> Self {
        self.external_signature = Some(signature.into());
        self
    }

    pub fn with_default_value(mut self, value: RawConstant) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.name == Self::CONSTRUCTOR_NAME
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Parse the generic signature, falling back to the erased descriptor.
    pub fn method_signature(&self) -> Result<MethodSignature, SignatureError> {
        parse_method_signature(self.signature.as_deref().unwrap_or(&self.descriptor))
    }

    /// Parse only the erased descriptor.
    pub fn erased_signature(&self) -> Result<MethodSignature, SignatureError> {
        parse_method_signature(&self.descriptor)
    }

    pub fn parameter_name(&self, index: usize) -> String {
        self.parameter_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("p{index}"))
    }

    pub fn annotations_of_parameter(&self, index: usize) -> &[RawAnnotation] {
        self.parameter_annotations
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Erased descriptor, e.g. `Ljava/lang/String;` or `I`.
    pub descriptor: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
    /// Constant initializer of a static final field.
    #[serde(default)]
    pub constant: Option<RawConstant>,
    #[serde(default)]
    pub external_signature: Option<String>,
}

impl RawField {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::PUBLIC,
            descriptor: descriptor.into(),
            signature: None,
            annotations: Vec::new(),
            constant: None,
            external_signature: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_constant(mut self, constant: RawConstant) -> Self {
        self.constant = Some(constant);
        self
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_external_signature(mut self, signature: impl Into<String>) -> Self {
        self.external_signature = Some(signature.into());
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_enum_entry(&self) -> bool {
        self.modifiers.contains(Modifiers::ENUM)
    }

    pub fn field_type(&self) -> Result<RawType, SignatureError> {
        parse_field_signature(self.signature.as_deref().unwrap_or(&self.descriptor))
    }
}

// =============================================================================
// Classes and packages
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawClass {
    /// Binary name, e.g. `a.b.Outer$Inner`.
    pub name: String,
    #[serde(default)]
    pub kind: RawClassKind,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Generic class signature, e.g. `<T:Ljava/lang/Object;>Ljava/lang/Object;`.
    #[serde(default)]
    pub signature: Option<String>,
    /// Erased superclass binary name, used when `signature` is absent.
    #[serde(default)]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Binary name of the enclosing class, for nested classes.
    #[serde(default)]
    pub outer: Option<String>,
    /// Simple names of directly nested classes.
    #[serde(default)]
    pub inner_classes: Vec<String>,
    #[serde(default)]
    pub methods: Vec<RawMethod>,
    #[serde(default)]
    pub constructors: Vec<RawMethod>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

impl RawClass {
    pub fn new(name: impl Into<String>, kind: RawClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Modifiers::PUBLIC,
            signature: None,
            super_class: None,
            interfaces: Vec::new(),
            outer: None,
            inner_classes: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, RawClassKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, RawClassKind::Interface).with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, RawClassKind::Enum).with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
    }

    pub fn annotation(name: impl Into<String>) -> Self {
        Self::new(name, RawClassKind::Annotation)
            .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn extends(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn nested_in(mut self, outer: impl Into<String>) -> Self {
        self.outer = Some(outer.into());
        self
    }

    pub fn with_inner_class(mut self, simple_name: impl Into<String>) -> Self {
        self.inner_classes.push(simple_name.into());
        self
    }

    pub fn with_method(mut self, method: RawMethod) -> Self {
        if method.is_constructor() {
            self.constructors.push(method);
        } else {
            self.methods.push(method);
        }
        self
    }

    pub fn with_field(mut self, field: RawField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Canonical native name of this class.
    pub fn native_name(&self) -> FqNameUnsafe {
        translate_foreign_name(&self.name)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, RawClassKind::Interface | RawClassKind::Annotation)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Whether this is a non-static nested class holding a reference to its
    /// outer instance.
    pub fn is_inner(&self) -> bool {
        self.outer.is_some() && !self.is_static() && !self.is_interface()
            && self.kind != RawClassKind::Enum
    }

    /// Parse the generic class signature, falling back to the erased
    /// superclass and interface names.
    pub fn class_signature(&self) -> Result<ClassSignature, SignatureError> {
        if let Some(signature) = &self.signature {
            return parse_class_signature(signature);
        }
        Ok(self.erased_class_signature())
    }

    /// The erased superclass and interfaces, without type parameters.
    pub fn erased_class_signature(&self) -> ClassSignature {
        ClassSignature {
            type_parameters: Vec::new(),
            super_class: self.super_class.as_deref().map(RawType::class),
            interfaces: self.interfaces.iter().map(|i| RawType::class(i)).collect(),
        }
    }

    pub fn find_method(&self, name: &str) -> Option<&RawMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn has_static_members(&self) -> bool {
        self.methods.iter().any(RawMethod::is_static)
            || self
                .fields
                .iter()
                .any(|f| f.is_static() && !f.is_enum_entry())
            || !self.inner_classes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPackage {
    pub name: FqName,
}

#[cfg(test)]
#[path = "../tests/raw_tests.rs"]
mod tests;
