//! JVM-style generic signature parser.
//!
//! Grammar handled (a subset of the class file signature grammar plus the
//! erased descriptor grammar, which it contains):
//!
//! ```text
//! ClassSignature  = TypeParams? ClassType ClassType*
//! MethodSignature = TypeParams? '(' Type* ')' (Type | 'V') ('^' ThrowsType)*
//! TypeParams      = '<' (Ident ':' Type? (':' Type)*)+ '>'
//! Type            = Primitive | ClassType | 'T' Ident ';' | '[' Type
//! ClassType       = 'L' Path TypeArgs? ('.' Ident TypeArgs?)* ';'
//! TypeArgs        = '<' ('*' | ('+' | '-')? Type)+ '>'
//! ```
//!
//! Inner class suffixes (`Lp/Outer<TT;>.Inner;`) flatten into one binary
//! name (`p.Outer$Inner`) carrying the innermost argument list; arguments of
//! the outer segments are kept separately in `outer_arguments`.

use crate::error::SignatureError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    pub fn from_descriptor(c: char) -> Option<Self> {
        Some(match c {
            'Z' => Self::Boolean,
            'B' => Self::Byte,
            'C' => Self::Char,
            'S' => Self::Short,
            'I' => Self::Int,
            'J' => Self::Long,
            'F' => Self::Float,
            'D' => Self::Double,
            'V' => Self::Void,
            _ => return None,
        })
    }

    pub fn descriptor(self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Float => 'F',
            Self::Double => 'D',
            Self::Void => 'V',
        }
    }
}

/// A foreign type expression as written in a signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawType {
    Primitive(PrimitiveKind),
    Class {
        /// Binary name with `.` package separators (`java.util.Map$Entry`).
        name: String,
        arguments: Vec<RawTypeArg>,
        /// Arguments written on enclosing segments of an inner class type.
        outer_arguments: Vec<RawTypeArg>,
    },
    TypeVariable(String),
    Array(Box<RawType>),
}

impl RawType {
    /// A raw (argument-less) class reference.
    pub fn class(name: &str) -> Self {
        Self::Class {
            name: name.replace('/', "."),
            arguments: Vec::new(),
            outer_arguments: Vec::new(),
        }
    }

    pub fn generic(name: &str, arguments: Vec<RawTypeArg>) -> Self {
        Self::Class {
            name: name.replace('/', "."),
            arguments,
            outer_arguments: Vec::new(),
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Primitive(PrimitiveKind::Void))
    }

    /// Erased descriptor spelling, with type variables erased to `erase_var`.
    pub fn erased_descriptor(&self, erase_var: &dyn Fn(&str) -> String) -> String {
        match self {
            Self::Primitive(kind) => kind.descriptor().to_string(),
            Self::Class { name, .. } => format!("L{};", name.replace('.', "/")),
            Self::TypeVariable(name) => erase_var(name),
            Self::Array(element) => format!("[{}", element.erased_descriptor(erase_var)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawTypeArg {
    /// `*`
    Star,
    Invariant(RawType),
    /// `+T`, written `? extends T`
    Extends(RawType),
    /// `-T`, written `? super T`
    Super(RawType),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTypeParameter {
    pub name: String,
    /// Class bound first (if written), then interface bounds.
    pub bounds: Vec<RawType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSignature {
    pub type_parameters: Vec<RawTypeParameter>,
    pub super_class: Option<RawType>,
    pub interfaces: Vec<RawType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub type_parameters: Vec<RawTypeParameter>,
    pub parameters: Vec<RawType>,
    pub return_type: RawType,
    pub throws: Vec<RawType>,
}

// =============================================================================
// Entry points
// =============================================================================

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature, SignatureError> {
    let mut parser = SignatureParser::new(signature);
    let type_parameters = parser.type_parameters()?;
    let mut supertypes = Vec::new();
    while !parser.at_end() {
        supertypes.push(parser.class_type()?);
    }
    let mut supertypes = supertypes.into_iter();
    Ok(ClassSignature {
        type_parameters,
        super_class: supertypes.next(),
        interfaces: supertypes.collect(),
    })
}

pub fn parse_method_signature(signature: &str) -> Result<MethodSignature, SignatureError> {
    let mut parser = SignatureParser::new(signature);
    let type_parameters = parser.type_parameters()?;
    parser.expect('(')?;
    let mut parameters = Vec::new();
    while parser.peek() != Some(')') {
        parameters.push(parser.field_type()?);
    }
    parser.expect(')')?;
    let return_type = parser.return_type()?;
    let mut throws = Vec::new();
    while parser.eat('^') {
        throws.push(parser.field_type()?);
    }
    parser.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_field_signature(signature: &str) -> Result<RawType, SignatureError> {
    let mut parser = SignatureParser::new(signature);
    let ty = parser.field_type()?;
    parser.finish()?;
    Ok(ty)
}

// =============================================================================
// Parser
// =============================================================================

struct SignatureParser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Result<char, SignatureError> {
        let c = self.peek().ok_or_else(|| self.unexpected_end())?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SignatureError> {
        let start = self.pos;
        let found = self.bump()?;
        if found == expected {
            Ok(())
        } else {
            Err(self.unexpected(found, start))
        }
    }

    fn finish(&self) -> Result<(), SignatureError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(SignatureError::TrailingInput {
                pos: self.pos,
                signature: self.text.to_string(),
            })
        }
    }

    fn unexpected_end(&self) -> SignatureError {
        SignatureError::UnexpectedEnd {
            signature: self.text.to_string(),
        }
    }

    fn unexpected(&self, found: char, pos: usize) -> SignatureError {
        SignatureError::UnexpectedChar {
            found,
            pos,
            signature: self.text.to_string(),
        }
    }

    /// Read an identifier up to (not including) one of `stops`.
    fn identifier(&mut self, stops: &[char]) -> Result<&'a str, SignatureError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            if self.at_end() {
                return Err(self.unexpected_end());
            }
            return Err(SignatureError::EmptyIdentifier {
                signature: self.text.to_string(),
            });
        }
        Ok(&self.text[start..self.pos])
    }

    fn type_parameters(&mut self) -> Result<Vec<RawTypeParameter>, SignatureError> {
        let mut params = Vec::new();
        if !self.eat('<') {
            return Ok(params);
        }
        while !self.eat('>') {
            if self.at_end() {
                return Err(self.unexpected_end());
            }
            let name = self.identifier(&[':', '>'])?.to_string();
            let mut bounds = Vec::new();
            self.expect(':')?;
            // Class bound may be empty: `T::Ljava/lang/Comparable;`
            if !matches!(self.peek(), Some(':') | Some('>')) {
                bounds.push(self.field_type()?);
            }
            while self.eat(':') {
                bounds.push(self.field_type()?);
            }
            params.push(RawTypeParameter { name, bounds });
        }
        Ok(params)
    }

    fn return_type(&mut self) -> Result<RawType, SignatureError> {
        if self.eat('V') {
            return Ok(RawType::Primitive(PrimitiveKind::Void));
        }
        self.field_type()
    }

    fn field_type(&mut self) -> Result<RawType, SignatureError> {
        let start = self.pos;
        match self.peek() {
            None => Err(self.unexpected_end()),
            Some('L') => self.class_type(),
            Some('T') => {
                self.pos += 1;
                let name = self.identifier(&[';'])?.to_string();
                self.expect(';')?;
                Ok(RawType::TypeVariable(name))
            }
            Some('[') => {
                self.pos += 1;
                Ok(RawType::Array(Box::new(self.field_type()?)))
            }
            Some(c) => match PrimitiveKind::from_descriptor(c) {
                Some(PrimitiveKind::Void) | None => Err(self.unexpected(c, start)),
                Some(kind) => {
                    self.pos += 1;
                    Ok(RawType::Primitive(kind))
                }
            },
        }
    }

    fn class_type(&mut self) -> Result<RawType, SignatureError> {
        self.expect('L')?;
        let mut name = self.identifier(&['<', '.', ';'])?.replace('/', ".");
        let mut arguments = self.type_arguments()?;
        let mut outer_arguments = Vec::new();
        while self.eat('.') {
            let inner = self.identifier(&['<', '.', ';'])?;
            name.push('$');
            name.push_str(inner);
            outer_arguments.extend(std::mem::take(&mut arguments));
            arguments = self.type_arguments()?;
        }
        self.expect(';')?;
        Ok(RawType::Class {
            name,
            arguments,
            outer_arguments,
        })
    }

    fn type_arguments(&mut self) -> Result<Vec<RawTypeArg>, SignatureError> {
        let mut args = Vec::new();
        if !self.eat('<') {
            return Ok(args);
        }
        while !self.eat('>') {
            let arg = match self.peek() {
                None => return Err(self.unexpected_end()),
                Some('*') => {
                    self.pos += 1;
                    RawTypeArg::Star
                }
                Some('+') => {
                    self.pos += 1;
                    RawTypeArg::Extends(self.field_type()?)
                }
                Some('-') => {
                    self.pos += 1;
                    RawTypeArg::Super(self.field_type()?)
                }
                Some(_) => RawTypeArg::Invariant(self.field_type()?),
            };
            args.push(arg);
        }
        Ok(args)
    }
}

#[cfg(test)]
#[path = "../tests/signature_tests.rs"]
mod tests;
