//! Human-readable rendering of types and member signatures.
//!
//! Used in diagnostics and by tests to assert on resolved shapes:
//!
//! ```text
//! MutableList<out String>?
//! fun <T : Comparable<T>> max(a: T, vararg rest: T): T
//! [ERROR : a.Missing]
//! ```

use crate::descriptors::{FunctionDescriptor, PropertyDescriptor};
use crate::ids::{FunctionId, PropertyId, TypeParamId};
use crate::store::DescriptorStore;
use crate::types::{TypeData, TypeId, TypeInterner, TypeProjection};
use std::fmt::Write;

pub struct TypeFormatter<'a> {
    store: &'a DescriptorStore,
    types: &'a TypeInterner,
    /// Render classes by fully-qualified name instead of short name.
    qualified: bool,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(store: &'a DescriptorStore, types: &'a TypeInterner) -> Self {
        Self {
            store,
            types,
            qualified: false,
        }
    }

    pub fn qualified(mut self) -> Self {
        self.qualified = true;
        self
    }

    pub fn format(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty, 0);
        out
    }

    fn write_type(&self, out: &mut String, ty: TypeId, depth: u32) {
        if depth > 32 {
            out.push_str("...");
            return;
        }
        match self.types.lookup(ty) {
            TypeData::Class {
                class,
                args,
                nullable,
            } => {
                let descriptor = self.store.class(*class);
                if self.qualified {
                    out.push_str(descriptor.fq_name.as_str());
                } else {
                    out.push_str(self.store.name(descriptor.name));
                }
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_projection(out, *arg, depth + 1);
                    }
                    out.push('>');
                }
                if *nullable {
                    out.push('?');
                }
            }
            TypeData::Parameter { param, nullable } => {
                out.push_str(self.store.name(self.store.type_param(*param).name));
                if *nullable {
                    out.push('?');
                }
            }
            TypeData::Error { name, nullable } => {
                let _ = write!(out, "[ERROR : {}]", self.store.name(*name));
                if *nullable {
                    out.push('?');
                }
            }
        }
    }

    fn write_projection(&self, out: &mut String, projection: TypeProjection, depth: u32) {
        match projection {
            TypeProjection::Star => out.push('*'),
            TypeProjection::Type { variance, ty } => {
                let keyword = variance.keyword();
                if !keyword.is_empty() {
                    out.push_str(keyword);
                    out.push(' ');
                }
                self.write_type(out, ty, depth);
            }
        }
    }

    fn write_type_params(&self, out: &mut String, params: &[TypeParamId]) {
        if params.is_empty() {
            return;
        }
        out.push('<');
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let descriptor = self.store.type_param(param);
            out.push_str(self.store.name(descriptor.name));
            let bounds = descriptor.bounds().unwrap_or(&[]);
            let shown: Vec<_> = bounds
                .iter()
                .filter(|&&b| !self.is_default_bound(b))
                .collect();
            for (j, bound) in shown.iter().enumerate() {
                out.push_str(if j == 0 { " : " } else { " & " });
                self.write_type(out, **bound, 0);
            }
        }
        out.push_str("> ");
    }

    fn is_default_bound(&self, ty: TypeId) -> bool {
        match self.types.lookup(ty) {
            TypeData::Class {
                class,
                args,
                nullable: true,
            } => args.is_empty() && self.store.name(self.store.class(*class).name) == "Any",
            _ => false,
        }
    }

    pub fn format_function(&self, id: FunctionId) -> String {
        self.format_function_descriptor(self.store.function(id))
    }

    pub fn format_function_descriptor(&self, function: &FunctionDescriptor) -> String {
        let mut out = String::from("fun ");
        self.write_type_params(&mut out, &function.type_params);
        if let Some(receiver) = function.receiver_type {
            self.write_type(&mut out, receiver, 0);
            out.push('.');
        }
        out.push_str(self.store.name(function.name));
        out.push('(');
        for (i, param) in function.value_params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if param.vararg_element.is_some() {
                out.push_str("vararg ");
            }
            out.push_str(self.store.name(param.name));
            out.push_str(": ");
            let shown = param.vararg_element.unwrap_or(param.ty);
            self.write_type(&mut out, shown, 0);
        }
        out.push_str("): ");
        self.write_type(&mut out, function.return_type, 0);
        out
    }

    pub fn format_property(&self, id: PropertyId) -> String {
        self.format_property_descriptor(self.store.property(id))
    }

    pub fn format_property_descriptor(&self, property: &PropertyDescriptor) -> String {
        let mut out = String::from(if property.is_var { "var " } else { "val " });
        out.push_str(self.store.name(property.name));
        out.push_str(": ");
        self.write_type(&mut out, property.ty, 0);
        out
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
