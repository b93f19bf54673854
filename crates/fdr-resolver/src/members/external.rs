//! External signatures: declarations written in the target notation and
//! attached to foreign members to override their raw signatures.
//!
//! ```text
//! fun <T : Comparable<T>> max(vararg items: T): T?
//! val name: core.String
//! ```

use super::SignatureData;
use crate::context::ForeignResolver;
use crate::generics::TypeVariableResolver;
use crate::policy::SearchPolicy;
use fdr_common::diagnostics::diagnostic_messages;
use fdr_common::names::FqNameUnsafe;
use fdr_types::{
    ErasedType, FunctionId, MemberOwner, PropertyId, SignatureSource, TypeData, TypeId,
    TypeParamId, TypeProjection, ValueParameter, Variance,
};
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;
use tracing::debug;

// =============================================================================
// Syntax
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalType {
    /// Short builtin name, type parameter name or qualified class name.
    pub name: String,
    pub arguments: Vec<ExternalTypeArgument>,
    pub nullable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExternalTypeArgument {
    Star,
    Type(Variance, ExternalType),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalTypeParameter {
    pub name: String,
    pub bounds: Vec<ExternalType>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalParameter {
    pub name: String,
    pub vararg: bool,
    pub ty: ExternalType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExternalSignature {
    Function {
        name: String,
        type_parameters: Vec<ExternalTypeParameter>,
        parameters: Vec<ExternalParameter>,
        /// `None` when the return type is omitted (Unit).
        return_type: Option<ExternalType>,
    },
    Property {
        name: String,
        is_var: bool,
        ty: ExternalType,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalSignatureError {
    #[error("unexpected end of external signature, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    Unexpected {
        found: String,
        offset: usize,
        expected: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    Punct(char),
}

impl Token {
    fn text(&self) -> String {
        match self {
            Token::Ident(ident) => ident.clone(),
            Token::Punct(c) => c.to_string(),
        }
    }
}

const CONSTRUCTOR_NAME: &str = "<init>";

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, ExternalSignatureError> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices<'_>> = text.char_indices().peekable();
    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if text[offset..].starts_with(CONSTRUCTOR_NAME) {
            tokens.push((offset, Token::Ident(CONSTRUCTOR_NAME.to_string())));
            chars.nth(CONSTRUCTOR_NAME.len() - 1);
        } else if is_name_char(c) {
            let mut ident = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !is_name_char(c) && c != '.' {
                    break;
                }
                ident.push(c);
                chars.next();
            }
            tokens.push((offset, Token::Ident(ident)));
        } else if "<>(),:?*".contains(c) {
            tokens.push((offset, Token::Punct(c)));
            chars.next();
        } else {
            return Err(ExternalSignatureError::Unexpected {
                found: c.to_string(),
                offset,
                expected: "a name or punctuation",
            });
        }
    }
    Ok(tokens)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self, expected: &'static str) -> Result<(usize, Token), ExternalSignatureError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExternalSignatureError::UnexpectedEnd { expected })?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(offset: usize, token: &Token, expected: &'static str) -> ExternalSignatureError {
        ExternalSignatureError::Unexpected {
            found: token.text(),
            offset,
            expected,
        }
    }

    fn ident(&mut self, expected: &'static str) -> Result<String, ExternalSignatureError> {
        match self.next(expected)? {
            (_, Token::Ident(ident)) => Ok(ident),
            (offset, token) => Err(Self::unexpected(offset, &token, expected)),
        }
    }

    fn punct(&mut self, c: char, expected: &'static str) -> Result<(), ExternalSignatureError> {
        match self.next(expected)? {
            (_, Token::Punct(p)) if p == c => Ok(()),
            (offset, token) => Err(Self::unexpected(offset, &token, expected)),
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(ident)) if ident == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn finish(&self) -> Result<(), ExternalSignatureError> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some((offset, token)) => Err(Self::unexpected(*offset, token, "end of signature")),
        }
    }

    fn signature(&mut self) -> Result<ExternalSignature, ExternalSignatureError> {
        match self.next("'fun', 'val' or 'var'")? {
            (_, Token::Ident(keyword)) if keyword == "fun" => self.function(),
            (_, Token::Ident(keyword)) if keyword == "val" || keyword == "var" => {
                let name = self.ident("a property name")?;
                self.punct(':', "':'")?;
                let ty = self.ty()?;
                Ok(ExternalSignature::Property {
                    name,
                    is_var: keyword == "var",
                    ty,
                })
            }
            (offset, token) => Err(Self::unexpected(offset, &token, "'fun', 'val' or 'var'")),
        }
    }

    fn function(&mut self) -> Result<ExternalSignature, ExternalSignatureError> {
        let mut type_parameters = Vec::new();
        if self.eat_punct('<') {
            loop {
                let name = self.ident("a type parameter name")?;
                let mut bounds = Vec::new();
                if self.eat_punct(':') {
                    bounds.push(self.ty()?);
                }
                type_parameters.push(ExternalTypeParameter { name, bounds });
                if !self.eat_punct(',') {
                    break;
                }
            }
            self.punct('>', "'>'")?;
        }
        let name = self.ident("a function name")?;
        self.punct('(', "'('")?;
        let mut parameters = Vec::new();
        if !self.eat_punct(')') {
            loop {
                let vararg = self.eat_keyword("vararg");
                let name = self.ident("a parameter name")?;
                self.punct(':', "':'")?;
                let ty = self.ty()?;
                parameters.push(ExternalParameter { name, vararg, ty });
                if !self.eat_punct(',') {
                    break;
                }
            }
            self.punct(')', "')'")?;
        }
        let return_type = if self.eat_punct(':') {
            Some(self.ty()?)
        } else {
            None
        };
        Ok(ExternalSignature::Function {
            name,
            type_parameters,
            parameters,
            return_type,
        })
    }

    fn ty(&mut self) -> Result<ExternalType, ExternalSignatureError> {
        let name = self.ident("a type name")?;
        let mut arguments = Vec::new();
        if self.eat_punct('<') {
            loop {
                arguments.push(self.argument()?);
                if !self.eat_punct(',') {
                    break;
                }
            }
            self.punct('>', "'>'")?;
        }
        let nullable = self.eat_punct('?');
        Ok(ExternalType {
            name,
            arguments,
            nullable,
        })
    }

    fn argument(&mut self) -> Result<ExternalTypeArgument, ExternalSignatureError> {
        if self.eat_punct('*') {
            return Ok(ExternalTypeArgument::Star);
        }
        // `in` and `out` are keywords only when a type follows.
        let variance = match self.peek() {
            Some(Token::Ident(ident))
                if (ident == "in" || ident == "out")
                    && matches!(self.tokens.get(self.pos + 1), Some((_, Token::Ident(_)))) =>
            {
                let variance = if ident == "in" { Variance::In } else { Variance::Out };
                self.pos += 1;
                variance
            }
            _ => Variance::Invariant,
        };
        Ok(ExternalTypeArgument::Type(variance, self.ty()?))
    }
}

pub fn parse_external_signature(text: &str) -> Result<ExternalSignature, ExternalSignatureError> {
    let mut parser = Parser {
        tokens: tokenize(text)?,
        pos: 0,
    };
    let signature = parser.signature()?;
    parser.finish()?;
    Ok(signature)
}

// =============================================================================
// Application
// =============================================================================

impl ForeignResolver<'_> {
    /// Replace `data` with an attached function signature. A signature that
    /// does not fit the member is rejected and its errors are recorded.
    pub(crate) fn apply_external_function(
        &mut self,
        function: FunctionId,
        mut data: SignatureData,
        text: &str,
    ) -> SignatureData {
        match self.external_function(function, &data, text) {
            Ok(replacement) => {
                debug!(function = function.0, "external signature applied");
                replacement
            }
            Err(errors) => {
                let subject = self.function_subject(function);
                let joined = errors.join("; ");
                self.diagnostics.report(
                    &diagnostic_messages::EXTERNAL_SIGNATURE_ERROR,
                    &subject,
                    &[&subject, &joined],
                );
                data.errors
                    .extend(errors.into_iter().map(|e| format!("external signature: {e}")));
                data
            }
        }
    }

    fn external_function(
        &mut self,
        function: FunctionId,
        data: &SignatureData,
        text: &str,
    ) -> Result<SignatureData, Vec<String>> {
        let signature = parse_external_signature(text).map_err(|e| vec![e.to_string()])?;
        let ExternalSignature::Function {
            name,
            type_parameters,
            parameters,
            return_type,
        } = signature
        else {
            return Err(vec!["a property signature is attached to a function".to_string()]);
        };

        let mut errors = Vec::new();
        let own_name = self.store.name(self.store.function(function).name).to_string();
        if name != own_name {
            errors.push(format!("name '{name}' does not match '{own_name}'"));
        }
        if type_parameters.len() != data.type_params.len() {
            errors.push(format!(
                "{} type parameters declared, {} expected",
                type_parameters.len(),
                data.type_params.len()
            ));
        }
        if parameters.len() != data.value_params.len() {
            errors.push(format!(
                "{} parameters declared, {} expected",
                parameters.len(),
                data.value_params.len()
            ));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let own: Vec<(String, TypeParamId)> = type_parameters
            .iter()
            .map(|p| p.name.clone())
            .zip(data.type_params.iter().copied())
            .collect();
        let descriptor = self.store.function(function);
        let scope = self.external_scope(descriptor.owner, descriptor.is_static, own);

        let mut bounds = Vec::with_capacity(type_parameters.len());
        for parameter in &type_parameters {
            let mut resolved: Vec<TypeId> = parameter
                .bounds
                .iter()
                .map(|b| self.resolve_external_type(b, &scope, &mut errors))
                .collect();
            if resolved.is_empty() {
                resolved.push(self.builtins.nullable_any_type);
            }
            bounds.push(resolved);
        }

        let mut value_params = Vec::with_capacity(parameters.len());
        for (parameter, previous) in parameters.iter().zip(&data.value_params) {
            let declared = self.resolve_external_type(&parameter.ty, &scope, &mut errors);
            let (ty, vararg_element) = if parameter.vararg {
                (self.vararg_array_type(declared), Some(declared))
            } else {
                (declared, None)
            };
            value_params.push(ValueParameter {
                name: self.store.intern(&parameter.name),
                ty,
                vararg_element,
                ..previous.clone()
            });
        }
        let return_type = match &return_type {
            Some(ty) => self.resolve_external_type(ty, &scope, &mut errors),
            None => self.builtins.unit_type,
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        for (parameter, previous) in value_params.iter().zip(&data.value_params) {
            if let Some(error) = self.erasure_mismatch(previous.ty, parameter.ty) {
                let name = self.store.name(parameter.name).to_string();
                errors.push(format!("parameter '{name}': {error}"));
            }
        }
        if let Some(error) = self.erasure_mismatch(data.return_type, return_type) {
            errors.push(format!("return type: {error}"));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        for (&param, bounds) in data.type_params.iter().zip(bounds) {
            self.store.replace_upper_bounds(param, bounds);
        }
        Ok(SignatureData {
            return_type,
            receiver_type: data.receiver_type,
            value_params,
            type_params: data.type_params.clone(),
            errors: data.errors.clone(),
            source: SignatureSource::External,
        })
    }

    /// Array type carrying vararg elements of `element`.
    fn vararg_array_type(&mut self, element: TypeId) -> TypeId {
        if !self.types.is_nullable(element)
            && let Some(class) = self.types.class_of(element)
            && let Some(primitive) = self.builtins.as_primitive(class)
        {
            return self.types.simple(self.builtins.primitive_array(primitive), false);
        }
        self.types
            .class_type(self.builtins.array, [TypeProjection::invariant(element)], false)
    }

    /// Apply an attached `val`/`var` signature to a field.
    pub(crate) fn apply_external_property(&mut self, property: PropertyId, text: &str) {
        match self.external_property(property, text) {
            Ok(ty) => {
                let descriptor = self.store.property_mut(property);
                descriptor.ty = ty;
                descriptor.signature_source = SignatureSource::External;
                debug!(property = property.0, "external signature applied");
            }
            Err(errors) => {
                self.store
                    .property_mut(property)
                    .signature_errors
                    .extend(errors.iter().map(|e| format!("external signature: {e}")));
                let subject = self.property_subject(property);
                let joined = errors.join("; ");
                self.diagnostics.report(
                    &diagnostic_messages::EXTERNAL_SIGNATURE_ERROR,
                    &subject,
                    &[&subject, &joined],
                );
            }
        }
    }

    fn external_property(&mut self, property: PropertyId, text: &str) -> Result<TypeId, Vec<String>> {
        let signature = parse_external_signature(text).map_err(|e| vec![e.to_string()])?;
        let ExternalSignature::Property { name, is_var, ty } = signature else {
            return Err(vec!["a function signature is attached to a field".to_string()]);
        };
        let descriptor = self.store.property(property);
        let own_name = self.store.name(descriptor.name).to_string();
        let mut errors = Vec::new();
        if name != own_name {
            errors.push(format!("name '{name}' does not match '{own_name}'"));
        }
        if is_var != descriptor.is_var {
            let (declared, actual) = if is_var { ("var", "final") } else { ("val", "mutable") };
            errors.push(format!("'{declared}' declared but the field is {actual}"));
        }
        let (owner, is_static, declared) = (descriptor.owner, descriptor.is_static, descriptor.ty);
        let scope = self.external_scope(owner, is_static, Vec::new());
        let resolved = self.resolve_external_type(&ty, &scope, &mut errors);
        if errors.is_empty()
            && let Some(error) = self.erasure_mismatch(declared, resolved)
        {
            errors.push(format!("type: {error}"));
        }
        if errors.is_empty() { Ok(resolved) } else { Err(errors) }
    }

    /// Names visible to an external signature: the member's own type
    /// parameters, then those of the enclosing classes unless the member is
    /// static.
    fn external_scope(
        &self,
        owner: MemberOwner,
        is_static: bool,
        mut own: Vec<(String, TypeParamId)>,
    ) -> Vec<(String, TypeParamId)> {
        if !is_static && let MemberOwner::Class(class) = owner {
            let enclosing = TypeVariableResolver::for_class(&self.store, class);
            own.extend(enclosing.visible().map(|param| {
                let name = self.store.name(self.store.type_param(param).name).to_string();
                (name, param)
            }));
        }
        own
    }

    /// An external type must erase to the same foreign classifier as the
    /// type it replaces. Unresolved declared types are not checked.
    fn erasure_mismatch(&mut self, declared: TypeId, external: TypeId) -> Option<String> {
        if matches!(self.types.lookup(declared), TypeData::Error { .. }) {
            return None;
        }
        let relations = self.relations();
        let (expected, actual) = (relations.erasure(declared), relations.erasure(external));
        if matches!(expected, ErasedType::Unresolved(_)) || expected == actual {
            return None;
        }
        let formatter = self.formatter();
        Some(format!(
            "'{}' does not match '{}'",
            formatter.format(external),
            formatter.format(declared)
        ))
    }

    /// Type parameters by name first, then core builtins by short name,
    /// then qualified class names.
    fn resolve_external_type(
        &mut self,
        ty: &ExternalType,
        scope: &[(String, TypeParamId)],
        errors: &mut Vec<String>,
    ) -> TypeId {
        let is_short = !ty.name.contains('.');
        if is_short && let Some(&(_, param)) = scope.iter().find(|(name, _)| *name == ty.name) {
            if !ty.arguments.is_empty() {
                errors.push(format!("type parameter '{}' cannot have arguments", ty.name));
            }
            return self.types.parameter(param, ty.nullable);
        }

        let class = if is_short {
            let core = self.store.namespace(self.builtins.core).fq_name.to_unsafe();
            self.natives.class(&core.child(&ty.name))
        } else {
            self.resolve_class_inner(&FqNameUnsafe::new(&ty.name), SearchPolicy::PreferNative)
        };
        let Some(class) = class else {
            errors.push(format!("unresolved type '{}'", ty.name));
            let name = self.store.intern(&ty.name);
            return self.types.error(name, ty.nullable);
        };

        let params = self.store.class(class).type_params.len();
        if params != ty.arguments.len() {
            errors.push(format!(
                "'{}' takes {} type arguments, {} given",
                ty.name,
                params,
                ty.arguments.len()
            ));
            let name = self.store.intern(&ty.name);
            return self.types.error(name, ty.nullable);
        }
        let mut arguments = Vec::with_capacity(ty.arguments.len());
        for argument in &ty.arguments {
            arguments.push(match argument {
                ExternalTypeArgument::Star => TypeProjection::Star,
                ExternalTypeArgument::Type(variance, inner) => TypeProjection::Type {
                    variance: *variance,
                    ty: self.resolve_external_type(inner, scope, errors),
                },
            });
        }
        self.types.class_type(class, arguments, ty.nullable)
    }
}

#[cfg(test)]
#[path = "../../tests/external_tests.rs"]
mod tests;
