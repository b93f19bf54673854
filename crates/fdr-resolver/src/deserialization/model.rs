//! Serialized descriptor format carried by embedded blobs (JSON).
//!
//! Names in a blob are native names (`a.b.Outer.Inner`). Type parameters
//! are referenced by name and resolve innermost-first.

use fdr_source::AbiVersion;
use fdr_types::{ClassKind, Modality, Variance, Visibility};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("incompatible ABI version {found}, expected {expected}")]
    IncompatibleVersion {
        found: AbiVersion,
        expected: AbiVersion,
    },
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
}

fn invariant() -> Variance {
    Variance::Invariant
}

fn public() -> Visibility {
    Visibility::Public
}

fn final_modality() -> Modality {
    Modality::Final
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SerializedType {
    Class {
        name: String,
        #[serde(default)]
        arguments: Vec<SerializedProjection>,
        #[serde(default)]
        nullable: bool,
    },
    Parameter {
        name: String,
        #[serde(default)]
        nullable: bool,
    },
}

impl SerializedType {
    pub fn class(name: &str) -> Self {
        Self::Class {
            name: name.to_string(),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn parameter(name: &str) -> Self {
        Self::Parameter {
            name: name.to_string(),
            nullable: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializedProjection {
    Star,
    Invariant(SerializedType),
    In(SerializedType),
    Out(SerializedType),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTypeParameter {
    pub name: String,
    #[serde(default = "invariant")]
    pub variance: Variance,
    #[serde(default)]
    pub upper_bounds: Vec<SerializedType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedValueParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SerializedType,
    #[serde(default)]
    pub vararg_element: Option<SerializedType>,
    #[serde(default)]
    pub has_default: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedFunction {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<SerializedTypeParameter>,
    #[serde(default)]
    pub receiver: Option<SerializedType>,
    #[serde(default)]
    pub value_parameters: Vec<SerializedValueParameter>,
    pub return_type: SerializedType,
    #[serde(default = "public")]
    pub visibility: Visibility,
    #[serde(default = "final_modality")]
    pub modality: Modality,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedConstructor {
    #[serde(default)]
    pub value_parameters: Vec<SerializedValueParameter>,
    #[serde(default = "public")]
    pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SerializedType,
    #[serde(default)]
    pub is_var: bool,
    #[serde(default = "public")]
    pub visibility: Visibility,
    #[serde(default = "final_modality")]
    pub modality: Modality,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedClass {
    pub kind: ClassKind,
    #[serde(default = "final_modality")]
    pub modality: Modality,
    #[serde(default = "public")]
    pub visibility: Visibility,
    /// Native name of the enclosing class, for nested classes.
    #[serde(default)]
    pub outer: Option<String>,
    #[serde(default)]
    pub is_inner: bool,
    #[serde(default)]
    pub type_parameters: Vec<SerializedTypeParameter>,
    #[serde(default)]
    pub supertypes: Vec<SerializedType>,
    #[serde(default)]
    pub functions: Vec<SerializedFunction>,
    #[serde(default)]
    pub constructors: Vec<SerializedConstructor>,
    #[serde(default)]
    pub properties: Vec<SerializedProperty>,
    /// Short names of nested classes, each carried by its own blob.
    #[serde(default)]
    pub nested_classes: Vec<String>,
    #[serde(default)]
    pub enum_entries: Vec<String>,
}

impl SerializedClass {
    pub fn new(kind: ClassKind) -> Self {
        Self {
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            outer: None,
            is_inner: false,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            functions: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
            nested_classes: Vec::new(),
            enum_entries: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedPackage {
    #[serde(default)]
    pub functions: Vec<SerializedFunction>,
    #[serde(default)]
    pub properties: Vec<SerializedProperty>,
}
