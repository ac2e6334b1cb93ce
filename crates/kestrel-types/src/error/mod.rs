//! Errors produced by the type core.
//!
//! Two families share [`TypeError`]:
//!
//! - **Consistency errors** come back from the definition API when a
//!   namespace is reopened in a way that contradicts its first declaration.
//!   They are fatal for the compilation that hit them.
//! - **Unresolved references** are collected by
//!   [`GlobalEnvironment::check_placeholders`](crate::GlobalEnvironment::check_placeholders),
//!   one per recorded use site, and reported to the user.

use crate::location::Location;
use crate::namespace::Modifiers;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TypeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A namespace was reopened with different modifiers.
    #[error("cannot redeclare `{name}` with modifiers `{found}`, it was previously declared with `{previous}`")]
    ModifierMismatch {
        name: String,
        previous: Modifiers,
        found: Modifiers,
    },

    /// A name was reopened as a different kind of namespace.
    #[error("cannot reopen {previous} `{name}` as {found}")]
    KindMismatch {
        name: String,
        previous: &'static str,
        found: &'static str,
    },

    /// A class was reopened with a different superclass.
    #[error("superclass mismatch in `{name}`: previously `{previous}`, now `{found}`")]
    SuperclassMismatch {
        name: String,
        previous: String,
        found: String,
    },

    /// A constant or type was referenced but never defined.
    #[error("undefined constant `{name}` at {location}")]
    UndefinedConstant { name: String, location: Location },

    /// A namespace was opened through a forward reference but never defined.
    #[error("undefined namespace `{name}` at {location}")]
    UndefinedNamespace { name: String, location: Location },
}

impl TypeError {
    /// Returns true for consistency errors, which abort the compilation.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            TypeError::ModifierMismatch { .. }
                | TypeError::KindMismatch { .. }
                | TypeError::SuperclassMismatch { .. }
        )
    }

    /// Returns the use site for unresolved-reference errors.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        match self {
            TypeError::UndefinedConstant { location, .. }
            | TypeError::UndefinedNamespace { location, .. } => Some(location),
            _ => None,
        }
    }
}
