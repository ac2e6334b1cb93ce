//! `Kestrel` type core.
//!
//! This crate holds the type model the Kestrel checker and compiler work
//! against:
//!
//! - [`types`] - the [`Type`] algebra, literals, generics and signatures
//! - [`namespace`] - classes, modules, mixins and interfaces, their
//!   members, and ancestry through mixin/interface proxies
//! - [`placeholder`] - forward references and unresolved-name diagnostics
//! - [`env`] - the [`GlobalEnvironment`] that owns one type universe, plus
//!   deep copy between environments
//!
//! # Examples
//!
//! ## Defining and querying a class
//!
//! ```
//! use kestrel_mem::{Symbol, well_known};
//! use kestrel_types::{GlobalEnvironment, Method, Modifiers, ParentSpec, Type};
//!
//! let mut env = GlobalEnvironment::new();
//! let root = env.root();
//! let greeter = env
//!     .try_define_class(root, "", Modifiers::default(), Symbol::intern("Greeter"), ParentSpec::Default)
//!     .unwrap();
//!
//! let string = env.std_subtype(well_known::STRING).cloned().unwrap();
//! env.define_method(greeter, Method::new(Symbol::intern("greet")).returning(string.clone()));
//!
//! let object = env.std_subtype(well_known::OBJECT).cloned().unwrap();
//! assert!(env.is_subtype(&Type::Namespace(greeter), &object));
//! assert_eq!(env.method_in_namespace(greeter, Symbol::intern("greet")).unwrap().return_type, string);
//! ```
//!
//! ## Forward references
//!
//! ```
//! use kestrel_mem::Symbol;
//! use kestrel_types::{GlobalEnvironment, Location};
//!
//! let mut env = GlobalEnvironment::new();
//! let root = env.root();
//! env.reference_constant(root, Symbol::intern("Missing"), Location::at("main.kes", 3, 7));
//!
//! let errors = env.check_placeholders();
//! assert_eq!(errors[0].to_string(), "undefined constant `Missing` at main.kes:3:7");
//! ```

pub mod env;
pub mod error;
pub mod location;
pub mod namespace;
pub mod placeholder;
pub mod types;
mod subtype;

pub use env::{DeepCopier, GlobalEnvironment, deep_copy_env};
pub use error::{Result, TypeError};
pub use location::{Location, Position, Span};
pub use namespace::{Modifiers, Namespace, NamespaceBase, NamespaceId, ParentSpec};
pub use placeholder::{PlaceholderData, PlaceholderId, PlaceholderKind};
pub use types::{
    Generic, GenericId, Literal, LiteralKind, Method, Parameter, Type, TypeArgument,
    TypeArguments, TypeParameter, Variance,
};
