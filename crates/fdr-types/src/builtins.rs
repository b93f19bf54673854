//! Builtin classes of the native `core` package.
//!
//! The foreign world maps onto these through the platform class map
//! (`java.lang.Object` becomes `Any`, boxes become primitives, collection
//! interfaces split into read-only and mutable variants). Only the members
//! that override and SAM checks look at are materialized.
//!
//! Function classes (`Function0` .. `Function22`) are created lazily the
//! first time a function type of that arity is needed.

use crate::descriptors::{
    ClassDescriptor, ClassKind, DescriptorOrigin, FunctionDescriptor, FunctionKind, Modality,
    NamespaceDescriptor, NamespaceKind, PropertyDescriptor, PropertyKind, ValueParameter,
};
use crate::ids::{
    ClassDescId, ClassParent, FunctionId, MemberOwner, NamespaceId, TypeParamId, TypeParamOwner,
};
use crate::store::DescriptorStore;
use crate::types::{TypeId, TypeInterner, TypeProjection, Variance};
use fdr_common::limits::MAX_FUNCTION_ARITY;
use fdr_common::names::FqName;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Name of the builtin package.
pub const CORE_PACKAGE: &str = "core";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        Self::Boolean,
        Self::Char,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Char => "Char",
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Boolean | Self::Char)
    }
}

/// A read-only collection interface and its mutable counterpart.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CollectionPair {
    pub read_only: ClassDescId,
    pub mutable: ClassDescId,
}

pub struct Builtins {
    pub core: NamespaceId,
    pub any: ClassDescId,
    pub nothing: ClassDescId,
    pub unit: ClassDescId,
    pub string: ClassDescId,
    pub char_sequence: ClassDescId,
    pub number: ClassDescId,
    pub throwable: ClassDescId,
    pub comparable: ClassDescId,
    pub enum_class: ClassDescId,
    pub annotation: ClassDescId,
    pub array: ClassDescId,
    primitives: FxHashMap<PrimitiveType, ClassDescId>,
    primitive_arrays: FxHashMap<PrimitiveType, ClassDescId>,

    pub iterable: CollectionPair,
    pub iterator: CollectionPair,
    pub collection: CollectionPair,
    pub list: CollectionPair,
    pub set: CollectionPair,
    pub map: CollectionPair,
    pub map_entry: CollectionPair,
    pub list_iterator: CollectionPair,

    function_classes: FxHashMap<usize, ClassDescId>,
    /// Every eagerly created builtin class, for native registration.
    classes: Vec<ClassDescId>,

    pub any_type: TypeId,
    pub nullable_any_type: TypeId,
    pub nothing_type: TypeId,
    pub nullable_nothing_type: TypeId,
    pub unit_type: TypeId,
    pub string_type: TypeId,
    pub int_type: TypeId,
    pub boolean_type: TypeId,
}

impl Builtins {
    /// Create the `core` package under `root` with all eager builtins.
    pub fn new(store: &mut DescriptorStore, types: &mut TypeInterner, root: NamespaceId) -> Self {
        let core_name = FqName::new(CORE_PACKAGE).unwrap_or_else(FqName::root);
        let core = store.alloc_namespace(NamespaceDescriptor::new(
            core_name,
            NamespaceKind::Native,
            Some(root),
        ));
        let mut b = BuiltinsBuilder {
            store,
            types,
            core,
            classes: Vec::new(),
            any_type: TypeId::ERROR,
            nullable_any_type: TypeId::ERROR,
        };

        // Any must exist before any type parameter gets its default bound.
        let any = b.class("Any", ClassKind::Class, Modality::Open);
        let any_type = b.types.simple(any, false);
        let nullable_any_type = b.types.simple(any, true);
        b.any_type = any_type;
        b.nullable_any_type = nullable_any_type;
        let nothing = b.class("Nothing", ClassKind::Class, Modality::Final);
        let unit = b.class("Unit", ClassKind::Class, Modality::Final);
        let unit_type = b.types.simple(unit, false);
        for class in [nothing, unit] {
            b.store.class_mut(class).supertypes.push(any_type);
        }

        let comparable = b.class("Comparable", ClassKind::Interface, Modality::Abstract);
        let comparable_t = b.type_param(comparable, "T", Variance::In, nullable_any_type);

        let char_sequence = b.class("CharSequence", ClassKind::Interface, Modality::Abstract);
        let number = b.class("Number", ClassKind::Class, Modality::Abstract);
        let throwable = b.class("Throwable", ClassKind::Class, Modality::Open);
        let annotation = b.class("Annotation", ClassKind::Interface, Modality::Abstract);
        for class in [char_sequence, number, throwable, annotation] {
            b.store.class_mut(class).supertypes.push(any_type);
        }

        let string = b.class("String", ClassKind::Class, Modality::Final);
        let string_type = b.types.simple(string, false);
        let comparable_string = b.types.class_type(
            comparable,
            [TypeProjection::invariant(string_type)],
            false,
        );
        let char_sequence_type = b.types.simple(char_sequence, false);
        b.store
            .class_mut(string)
            .supertypes
            .extend([comparable_string, char_sequence_type]);

        let mut primitives = FxHashMap::default();
        let number_type = b.types.simple(number, false);
        for primitive in PrimitiveType::ALL {
            let class = b.class(primitive.type_name(), ClassKind::Class, Modality::Final);
            let own = b.types.simple(class, false);
            let comparable_own =
                b.types
                    .class_type(comparable, [TypeProjection::invariant(own)], false);
            let first = if primitive.is_numeric() { number_type } else { any_type };
            b.store
                .class_mut(class)
                .supertypes
                .extend([first, comparable_own]);
            primitives.insert(primitive, class);
        }
        let int_type = b.types.simple(primitives[&PrimitiveType::Int], false);
        let boolean_type = b.types.simple(primitives[&PrimitiveType::Boolean], false);

        // Any members
        let equals = b.function(any, "equals", &[("other", nullable_any_type)], boolean_type);
        let hash_code = b.function(any, "hashCode", &[], int_type);
        let to_string = b.function(any, "toString", &[], string_type);
        for f in [equals, hash_code, to_string] {
            b.store.function_mut(f).modality = Modality::Open;
        }

        let comparable_t_type = b.types.parameter(comparable_t, false);
        b.abstract_function(comparable, "compareTo", &[("other", comparable_t_type)], int_type);

        // Array<T> and primitive arrays
        let array = b.class("Array", ClassKind::Class, Modality::Final);
        let array_t = b.type_param(array, "T", Variance::Invariant, nullable_any_type);
        let array_t_type = b.types.parameter(array_t, false);
        b.store.class_mut(array).supertypes.push(any_type);
        b.property(array, "size", int_type, false);
        b.function(array, "get", &[("index", int_type)], array_t_type);
        b.function(
            array,
            "set",
            &[("index", int_type), ("value", array_t_type)],
            unit_type,
        );
        let mut primitive_arrays = FxHashMap::default();
        for primitive in PrimitiveType::ALL {
            let name = format!("{}Array", primitive.type_name());
            let class = b.class(&name, ClassKind::Class, Modality::Final);
            b.store.class_mut(class).supertypes.push(any_type);
            b.property(class, "size", int_type, false);
            primitive_arrays.insert(primitive, class);
        }

        // Enum<E : Enum<E>>
        let enum_class = b.class("Enum", ClassKind::Class, Modality::Abstract);
        let e_name = b.store.intern("E");
        let enum_e = b.store.alloc_type_param(
            e_name,
            0,
            Variance::Invariant,
            TypeParamOwner::Class(enum_class),
        );
        b.store.class_mut(enum_class).type_params.push(enum_e);
        let enum_e_type = b.types.parameter(enum_e, false);
        let enum_of_e = b
            .types
            .class_type(enum_class, [TypeProjection::invariant(enum_e_type)], false);
        b.store.set_upper_bounds(enum_e, vec![enum_of_e]);
        let comparable_e = b
            .types
            .class_type(comparable, [TypeProjection::invariant(enum_e_type)], false);
        b.store
            .class_mut(enum_class)
            .supertypes
            .extend([any_type, comparable_e]);
        b.property(enum_class, "name", string_type, false);
        b.property(enum_class, "ordinal", int_type, false);

        b.store.class_mut(comparable).supertypes.push(any_type);

        // Collections
        let iterator = b.collection_pair("Iterator", &[Variance::Out], &[]);
        let iterable = b.collection_pair("Iterable", &[Variance::Out], &[]);
        let collection = b.collection_pair("Collection", &[Variance::Out], &[iterable]);
        let list = b.collection_pair("List", &[Variance::Out], &[collection]);
        let set = b.collection_pair("Set", &[Variance::Out], &[collection]);
        let list_iterator = b.collection_pair("ListIterator", &[Variance::Out], &[iterator]);
        let map = b.collection_pair("Map", &[Variance::Invariant, Variance::Out], &[]);
        let map_entry = b.collection_pair("Map.Entry", &[Variance::Invariant, Variance::Out], &[]);

        for (owner, result) in [
            (iterable.read_only, iterator.read_only),
            (iterable.mutable, iterator.mutable),
        ] {
            let t = b.param_type(owner, 0);
            let ret = b
                .types
                .class_type(result, [TypeProjection::invariant(t)], false);
            b.abstract_function(owner, "iterator", &[], ret);
        }
        for owner in [collection.read_only, collection.mutable] {
            b.abstract_property(owner, "size", int_type);
        }
        for owner in [list.read_only, list.mutable] {
            let e = b.param_type(owner, 0);
            b.abstract_function(owner, "get", &[("index", int_type)], e);
        }
        for owner in [collection.mutable, list.mutable, set.mutable] {
            let e = b.param_type(owner, 0);
            b.abstract_function(owner, "add", &[("element", e)], boolean_type);
        }
        for owner in [iterator.read_only, iterator.mutable] {
            let e = b.param_type(owner, 0);
            b.abstract_function(owner, "next", &[], e);
            b.abstract_function(owner, "hasNext", &[], boolean_type);
        }
        for owner in [map.read_only, map.mutable] {
            let k = b.param_type(owner, 0);
            let v = b.param_type(owner, 1);
            let nullable_v = b.types.with_nullability(v, true);
            b.abstract_function(owner, "get", &[("key", k)], nullable_v);
            b.abstract_property(owner, "size", int_type);
        }
        {
            let owner = map.mutable;
            let k = b.param_type(owner, 0);
            let v = b.param_type(owner, 1);
            let nullable_v = b.types.with_nullability(v, true);
            b.abstract_function(owner, "put", &[("key", k), ("value", v)], nullable_v);
        }
        for owner in [map_entry.read_only, map_entry.mutable] {
            let k = b.param_type(owner, 0);
            let v = b.param_type(owner, 1);
            b.abstract_property(owner, "key", k);
            b.abstract_property(owner, "value", v);
        }

        let classes = b.classes;
        let nothing_type = types.simple(nothing, false);
        let nullable_nothing_type = types.simple(nothing, true);
        debug!(count = classes.len(), "builtins created");

        Self {
            core,
            any,
            nothing,
            unit,
            string,
            char_sequence,
            number,
            throwable,
            comparable,
            enum_class,
            annotation,
            array,
            primitives,
            primitive_arrays,
            iterable,
            iterator,
            collection,
            list,
            set,
            map,
            map_entry,
            list_iterator,
            function_classes: FxHashMap::default(),
            classes,
            any_type,
            nullable_any_type,
            nothing_type,
            nullable_nothing_type,
            unit_type,
            string_type,
            int_type,
            boolean_type,
        }
    }

    pub fn classes(&self) -> &[ClassDescId] {
        &self.classes
    }

    pub fn primitive(&self, primitive: PrimitiveType) -> ClassDescId {
        self.primitives[&primitive]
    }

    pub fn primitive_array(&self, primitive: PrimitiveType) -> ClassDescId {
        self.primitive_arrays[&primitive]
    }

    pub fn primitive_type(&self, types: &mut TypeInterner, primitive: PrimitiveType) -> TypeId {
        types.simple(self.primitive(primitive), false)
    }

    /// The primitive a builtin class stands for, if any.
    pub fn as_primitive(&self, class: ClassDescId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|p| self.primitives[p] == class)
    }

    fn collection_pairs(&self) -> [CollectionPair; 8] {
        [
            self.iterable,
            self.iterator,
            self.collection,
            self.list,
            self.set,
            self.map,
            self.map_entry,
            self.list_iterator,
        ]
    }

    pub fn is_read_only_collection(&self, class: ClassDescId) -> bool {
        self.collection_pairs().iter().any(|p| p.read_only == class)
    }

    pub fn is_mutable_collection(&self, class: ClassDescId) -> bool {
        self.collection_pairs().iter().any(|p| p.mutable == class)
    }

    pub fn mutable_to_read_only(&self, class: ClassDescId) -> Option<ClassDescId> {
        self.collection_pairs()
            .iter()
            .find(|p| p.mutable == class)
            .map(|p| p.read_only)
    }

    pub fn read_only_to_mutable(&self, class: ClassDescId) -> Option<ClassDescId> {
        self.collection_pairs()
            .iter()
            .find(|p| p.read_only == class)
            .map(|p| p.mutable)
    }

    pub fn is_array(&self, class: ClassDescId) -> bool {
        class == self.array || self.primitive_arrays.values().any(|&a| a == class)
    }

    pub fn function_class_if_created(&self, arity: usize) -> Option<ClassDescId> {
        self.function_classes.get(&arity).copied()
    }

    pub fn is_function_class(&self, class: ClassDescId) -> bool {
        self.function_classes.values().any(|&c| c == class)
    }

    /// `FunctionN<in P1, .., in PN, out R>`, created on first use.
    /// Returns `None` past the supported arity.
    pub fn function_class(
        &mut self,
        store: &mut DescriptorStore,
        types: &mut TypeInterner,
        arity: usize,
    ) -> Option<ClassDescId> {
        if arity > MAX_FUNCTION_ARITY {
            return None;
        }
        if let Some(&class) = self.function_classes.get(&arity) {
            return Some(class);
        }
        let mut b = BuiltinsBuilder {
            store,
            types,
            core: self.core,
            classes: Vec::new(),
            any_type: self.any_type,
            nullable_any_type: self.nullable_any_type,
        };
        let class = b.class(&format!("Function{arity}"), ClassKind::Interface, Modality::Abstract);
        let mut params = Vec::with_capacity(arity);
        for i in 1..=arity {
            let p = b.type_param(class, &format!("P{i}"), Variance::In, self.nullable_any_type);
            let ty = b.types.parameter(p, false);
            params.push((format!("p{i}"), ty));
        }
        let r = b.type_param(class, "R", Variance::Out, self.nullable_any_type);
        let r_type = b.types.parameter(r, false);
        let param_refs: Vec<(&str, TypeId)> =
            params.iter().map(|(n, t)| (n.as_str(), *t)).collect();
        b.abstract_function(class, "invoke", &param_refs, r_type);
        b.store.class_mut(class).supertypes.push(self.any_type);
        debug!(arity, "function class created");
        self.function_classes.insert(arity, class);
        Some(class)
    }
}

// =============================================================================
// Construction helpers
// =============================================================================

struct BuiltinsBuilder<'a> {
    store: &'a mut DescriptorStore,
    types: &'a mut TypeInterner,
    core: NamespaceId,
    classes: Vec<ClassDescId>,
    any_type: TypeId,
    nullable_any_type: TypeId,
}

impl BuiltinsBuilder<'_> {
    fn class(&mut self, name: &str, kind: ClassKind, modality: Modality) -> ClassDescId {
        let core = self.store.namespace(self.core).fq_name.to_unsafe();
        let (parent, fq_name) = match name.split_once('.') {
            // `Map.Entry` nests in the already created `Map`
            Some((outer, _)) => {
                let outer_fq = core.child(outer);
                let outer_id = self
                    .classes
                    .iter()
                    .copied()
                    .find(|&c| self.store.class(c).fq_name == outer_fq);
                match outer_id {
                    Some(id) => (ClassParent::Class(id), core.child(name)),
                    None => (ClassParent::Namespace(self.core), core.child(name)),
                }
            }
            None => (ClassParent::Namespace(self.core), core.child(name)),
        };
        let short = self.store.intern(fq_name.short_name());
        let mut descriptor =
            ClassDescriptor::new(fq_name, short, kind, parent, DescriptorOrigin::Builtin);
        descriptor.modality = modality;
        let id = self.store.alloc_class(descriptor);
        self.classes.push(id);
        id
    }

    fn type_param(
        &mut self,
        class: ClassDescId,
        name: &str,
        variance: Variance,
        bound: TypeId,
    ) -> TypeParamId {
        let index = self.store.class(class).type_params.len() as u32;
        let atom = self.store.intern(name);
        let param =
            self.store
                .alloc_type_param(atom, index, variance, TypeParamOwner::Class(class));
        self.store.set_upper_bounds(param, vec![bound]);
        self.store.class_mut(class).type_params.push(param);
        param
    }

    fn param_type(&mut self, class: ClassDescId, index: usize) -> TypeId {
        let param = self.store.class(class).type_params[index];
        self.types.parameter(param, false)
    }

    fn function(
        &mut self,
        owner: ClassDescId,
        name: &str,
        params: &[(&str, TypeId)],
        return_type: TypeId,
    ) -> FunctionId {
        let atom = self.store.intern(name);
        let mut function = FunctionDescriptor::new(
            atom,
            MemberOwner::Class(owner),
            FunctionKind::Declared,
            DescriptorOrigin::Builtin,
        );
        for (index, (param_name, ty)) in params.iter().enumerate() {
            function.value_params.push(ValueParameter {
                name: self.store.intern(param_name),
                index: index as u32,
                ty: *ty,
                vararg_element: None,
                has_default: false,
                annotations: Vec::new(),
            });
        }
        function.return_type = return_type;
        let id = self.store.alloc_function(function);
        self.store.class_mut(owner).functions.push(id);
        id
    }

    fn abstract_function(
        &mut self,
        owner: ClassDescId,
        name: &str,
        params: &[(&str, TypeId)],
        return_type: TypeId,
    ) {
        let id = self.function(owner, name, params, return_type);
        self.store.function_mut(id).modality = Modality::Abstract;
    }

    fn property(&mut self, owner: ClassDescId, name: &str, ty: TypeId, is_var: bool) {
        let atom = self.store.intern(name);
        let mut property = PropertyDescriptor::new(
            atom,
            MemberOwner::Class(owner),
            PropertyKind::Declared,
            DescriptorOrigin::Builtin,
        );
        property.ty = ty;
        property.is_var = is_var;
        let id = self.store.alloc_property(property);
        self.store.class_mut(owner).properties.push(id);
    }

    fn abstract_property(&mut self, owner: ClassDescId, name: &str, ty: TypeId) {
        self.property(owner, name, ty, false);
        if let Some(&id) = self.store.class(owner).properties.last() {
            self.store.property_mut(id).modality = Modality::Abstract;
        }
    }

    /// Create `Name` and `MutableName` with the given parameter variances.
    /// Each read-only class extends the read-only variants of `supers`; each
    /// mutable class extends its read-only twin and the mutable `supers`.
    fn collection_pair(
        &mut self,
        name: &str,
        variances: &[Variance],
        supers: &[CollectionPair],
    ) -> CollectionPair {
        let (outer, simple) = match name.split_once('.') {
            Some((outer, simple)) => (Some(outer), simple),
            None => (None, name),
        };
        let mutable_name = match outer {
            Some(outer) => format!("Mutable{outer}.Mutable{simple}"),
            None => format!("Mutable{simple}"),
        };
        let nullable_any = self.nullable_any_type;
        let any_type = self.any_type;
        let param_names = ["E", "V"];
        let read_only = self.class(name, ClassKind::Interface, Modality::Abstract);
        let mutable = self.class(&mutable_name, ClassKind::Interface, Modality::Abstract);
        for (i, variance) in variances.iter().enumerate() {
            let param_name = if variances.len() == 2 && i == 0 { "K" } else { param_names[i] };
            self.type_param(read_only, param_name, *variance, nullable_any);
            // Mutable collections are invariant in every parameter.
            self.type_param(mutable, param_name, Variance::Invariant, nullable_any);
        }

        let args_of = |this: &mut Self, class: ClassDescId| -> Vec<TypeProjection> {
            (0..variances.len())
                .map(|i| TypeProjection::invariant(this.param_type(class, i)))
                .collect()
        };

        let read_only_args = args_of(self, read_only);
        let mut read_only_supers = Vec::new();
        for pair in supers {
            read_only_supers.push(self.types.class_type(
                pair.read_only,
                read_only_args.iter().copied(),
                false,
            ));
        }
        if read_only_supers.is_empty() {
            read_only_supers.push(any_type);
        }
        self.store.class_mut(read_only).supertypes = read_only_supers;

        let mutable_args = args_of(self, mutable);
        let mut mutable_supers = vec![self.types.class_type(
            read_only,
            mutable_args.iter().copied(),
            false,
        )];
        for pair in supers {
            mutable_supers.push(self.types.class_type(
                pair.mutable,
                mutable_args.iter().copied(),
                false,
            ));
        }
        self.store.class_mut(mutable).supertypes = mutable_supers;

        CollectionPair { read_only, mutable }
    }
}

#[cfg(test)]
#[path = "../tests/builtins_tests.rs"]
mod tests;
