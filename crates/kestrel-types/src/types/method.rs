//! Method signatures.
//!
//! A [`Method`] is the static signature stored in a namespace's method
//! table. The same shape doubles as the closure type (`|a: Int|: String`).
//! Bodies are compiled elsewhere; only the signature matters here.

use crate::env::GlobalEnvironment;
use crate::location::Location;
use crate::types::{Type, TypeParameter};
use kestrel_mem::Symbol;

/// How an argument binds to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterKind {
    #[default]
    Normal,
    /// Has a default value and may be omitted
    Optional,
    /// `*rest`
    Rest,
    /// `**named_rest`
    NamedRest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Symbol,
    pub ty: Type,
    pub kind: ParameterKind,
}

impl Parameter {
    #[must_use]
    pub fn new(name: Symbol, ty: Type) -> Self {
        Self {
            name,
            ty,
            kind: ParameterKind::Normal,
        }
    }

    #[must_use]
    pub fn optional(name: Symbol, ty: Type) -> Self {
        Self {
            name,
            ty,
            kind: ParameterKind::Optional,
        }
    }

    #[must_use]
    pub fn rest(name: Symbol, ty: Type) -> Self {
        Self {
            name,
            ty,
            kind: ParameterKind::Rest,
        }
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self.kind, ParameterKind::Normal)
    }

    fn inspect(&self, env: &GlobalEnvironment) -> String {
        let ty = self.ty.display(env);
        match self.kind {
            ParameterKind::Normal => format!("{}: {ty}", self.name),
            ParameterKind::Optional => format!("{}?: {ty}", self.name),
            ParameterKind::Rest => format!("*{}: {ty}", self.name),
            ParameterKind::NamedRest => format!("**{}: {ty}", self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodFlags {
    pub abstract_: bool,
    pub sealed: bool,
    /// Implemented natively by the runtime
    pub native: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: Symbol,
    pub doc_comment: String,
    pub type_parameters: Vec<TypeParameter>,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub throw_type: Option<Type>,
    pub flags: MethodFlags,
    pub location: Option<Location>,
}

impl Method {
    /// Creates a method returning `void` with no parameters.
    #[must_use]
    pub fn new(name: Symbol) -> Self {
        Self {
            name,
            doc_comment: String::new(),
            type_parameters: Vec::new(),
            params: Vec::new(),
            return_type: Type::Void,
            throw_type: None,
            flags: MethodFlags::default(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn returning(mut self, return_type: Type) -> Self {
        self.return_type = return_type;
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc_comment: impl Into<String>) -> Self {
        self.doc_comment = doc_comment.into();
        self
    }

    /// Number of parameters a call must supply.
    #[must_use]
    pub fn required_param_count(&self) -> usize {
        self.params.iter().filter(|p| p.is_required()).count()
    }

    fn inspect_params(&self, env: &GlobalEnvironment) -> String {
        self.params
            .iter()
            .map(|p| p.inspect(env))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn inspect_tail(&self, env: &GlobalEnvironment) -> String {
        let mut out = String::new();
        if self.return_type != Type::Void {
            out.push_str(&format!(": {}", self.return_type.display(env)));
        }
        if let Some(throw_type) = &self.throw_type {
            out.push_str(&format!(" ! {}", throw_type.display(env)));
        }
        out
    }

    /// Formats the signature as a method declaration:
    /// `def name[T](a: Int, b?: String): Bool`.
    #[must_use]
    pub fn inspect(&self, env: &GlobalEnvironment) -> String {
        let mut out = format!("def {}", self.name);
        if !self.type_parameters.is_empty() {
            let params: Vec<_> = self
                .type_parameters
                .iter()
                .map(|p| p.inspect_declaration(env))
                .collect();
            out.push_str(&format!("[{}]", params.join(", ")));
        }
        out.push_str(&format!("({})", self.inspect_params(env)));
        out.push_str(&self.inspect_tail(env));
        out
    }

    /// Formats the signature as a closure type: `|a: Int|: Bool`.
    #[must_use]
    pub fn inspect_closure(&self, env: &GlobalEnvironment) -> String {
        format!("|{}|{}", self.inspect_params(env), self.inspect_tail(env))
    }
}

/// An alternative name registered for an existing method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodAlias {
    pub name: Symbol,
    pub method: Method,
}
