//! Forward references.
//!
//! A name used before its definition gets a placeholder so checking can
//! continue. Each placeholder moves through:
//!
//! ```text
//! created -> referenced 0..n more times (each use site recorded)
//!         -> replaced by a real definition | reported as undefined
//! ```
//!
//! Constant placeholders come in pairs: the constant slot holds a
//! [`Type::ConstantPlaceholder`] and the subtype slot its sibling
//! [`Type::Placeholder`]. Use sites are recorded on the constant side and
//! defining either slot replaces both. A half whose slot already holds a
//! real definition is never created, so a constant reference to a name
//! that only exists as a type alias stays unresolved.
//!
//! Namespaces opened through a forward reference (`Foo::Bar` before `Foo`
//! is declared) get a [`Namespace::Placeholder`] instead, which can hold
//! definitions of its own until the real namespace absorbs them.

use crate::env::GlobalEnvironment;
use crate::error::TypeError;
use crate::location::Location;
use crate::namespace::{Constant, Namespace, NamespaceBase, NamespaceId, NamespacePlaceholder};
use crate::types::Type;
use kestrel_log::debug;
use kestrel_mem::Symbol;

/// Index of a placeholder in its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(pub(crate) u32);

impl PlaceholderId {
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Which slot a placeholder occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Constant,
    Subtype,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderData {
    pub kind: PlaceholderKind,
    pub as_name: Symbol,
    pub full_name: String,
    pub container: NamespaceId,
    /// Use sites; populated on the constant side of a pair, or on a lone
    /// subtype placeholder.
    pub locations: Vec<Location>,
    pub sibling: Option<PlaceholderId>,
    pub checked: bool,
    pub replaced: bool,
}

impl GlobalEnvironment {
    #[must_use]
    pub fn placeholder(&self, id: PlaceholderId) -> &PlaceholderData {
        &self.placeholders[id.0 as usize]
    }

    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }

    pub(crate) fn alloc_placeholder(&mut self, data: PlaceholderData) -> PlaceholderId {
        let id = PlaceholderId(self.placeholders.len() as u32);
        self.placeholders.push(data);
        id
    }

    fn placeholder_mut(&mut self, id: PlaceholderId) -> &mut PlaceholderData {
        &mut self.placeholders[id.0 as usize]
    }

    /// The member of the pair `id` belongs to that records use sites.
    fn constant_side(&self, id: PlaceholderId) -> PlaceholderId {
        let data = self.placeholder(id);
        match (data.kind, data.sibling) {
            (PlaceholderKind::Subtype, Some(sibling)) => sibling,
            _ => id,
        }
    }

    /// Resolves a reference to constant `name` in `container`.
    ///
    /// Returns the defined type if there is one. Otherwise the use site is
    /// recorded on the existing placeholder, or a new placeholder pair is
    /// created.
    pub fn reference_constant(
        &mut self,
        container: NamespaceId,
        name: Symbol,
        location: Location,
    ) -> Type {
        let container = self.unwrap_namespace(container);

        match self.constant(container, name).cloned() {
            Some(Type::ConstantPlaceholder(id)) => {
                self.placeholder_mut(id).locations.push(location);
                Type::ConstantPlaceholder(id)
            }
            Some(ty) => ty,
            None => {
                let (constant, _) = self.create_placeholder_pair(container, name, location);
                match constant {
                    Some(constant) => Type::ConstantPlaceholder(constant),
                    None => unreachable!("constant slot of `{name}` was empty"),
                }
            }
        }
    }

    /// Resolves a reference to type `name` in `container`, like
    /// [`reference_constant`](Self::reference_constant) but for the subtype slot.
    pub fn reference_subtype(
        &mut self,
        container: NamespaceId,
        name: Symbol,
        location: Location,
    ) -> Type {
        let container = self.unwrap_namespace(container);

        match self.subtype(container, name).cloned() {
            Some(Type::Placeholder(id)) => {
                let constant = self.constant_side(id);
                self.placeholder_mut(constant).locations.push(location);
                Type::Placeholder(id)
            }
            Some(ty) => ty,
            None => {
                let (_, subtype) = self.create_placeholder_pair(container, name, location);
                match subtype {
                    Some(subtype) => Type::Placeholder(subtype),
                    None => unreachable!("subtype slot of `{name}` was empty"),
                }
            }
        }
    }

    /// Creates a constant/subtype placeholder pair for the slots of `name`
    /// that are still empty, installs each half and links them when both
    /// exist. At least one slot must be empty.
    fn create_placeholder_pair(
        &mut self,
        container: NamespaceId,
        name: Symbol,
        location: Location,
    ) -> (Option<PlaceholderId>, Option<PlaceholderId>) {
        let full_name = self.member_full_name(container, name);
        debug!("placeholder created: {}", full_name);

        let data = |kind: PlaceholderKind| PlaceholderData {
            kind,
            as_name: name,
            full_name: full_name.clone(),
            container,
            locations: Vec::new(),
            sibling: None,
            checked: false,
            replaced: false,
        };
        let constant = self
            .constant(container, name)
            .is_none()
            .then(|| self.alloc_placeholder(data(PlaceholderKind::Constant)));
        let subtype = self
            .subtype(container, name)
            .is_none()
            .then(|| self.alloc_placeholder(data(PlaceholderKind::Subtype)));

        if let (Some(constant), Some(subtype)) = (constant, subtype) {
            self.placeholder_mut(constant).sibling = Some(subtype);
            self.placeholder_mut(subtype).sibling = Some(constant);
        }
        if let Some(primary) = constant.or(subtype) {
            self.placeholder_mut(primary).locations.push(location);
        }

        let base = self.base_mut(container);
        if let Some(constant) = constant {
            base.constants.insert(
                name,
                Constant::new(full_name.clone(), Type::ConstantPlaceholder(constant)),
            );
        }
        if let Some(subtype) = subtype {
            base.subtypes
                .insert(name, Constant::new(full_name, Type::Placeholder(subtype)));
        }

        (constant, subtype)
    }

    /// Marks a placeholder and its sibling replaced, removing the sibling
    /// from its slot if it is still there.
    pub(crate) fn mark_replaced(&mut self, id: PlaceholderId) {
        if self.placeholder(id).replaced {
            return;
        }

        let data = self.placeholder_mut(id);
        data.replaced = true;
        let (name, container, sibling) = (data.as_name, data.container, data.sibling);
        debug!("placeholder replaced: {}", self.placeholder(id).full_name);

        let Some(sibling) = sibling else {
            return;
        };
        self.placeholder_mut(sibling).replaced = true;

        let sibling_kind = self.placeholder(sibling).kind;
        let base = self.base_mut(container);
        let slot = match sibling_kind {
            PlaceholderKind::Constant => &mut base.constants,
            PlaceholderKind::Subtype => &mut base.subtypes,
        };
        let leftover = match sibling_kind {
            PlaceholderKind::Constant => Type::ConstantPlaceholder(sibling),
            PlaceholderKind::Subtype => Type::Placeholder(sibling),
        };
        if slot.get(&name).is_some_and(|entry| entry.ty == leftover) {
            slot.shift_remove(&name);
        }
    }

    /// Returns the namespace `name` in `container`, creating a namespace
    /// placeholder if it is not defined yet. Each call records `location`
    /// on an unresolved placeholder.
    pub fn reference_namespace(
        &mut self,
        container: NamespaceId,
        name: Symbol,
        location: Location,
    ) -> NamespaceId {
        let container = self.unwrap_namespace(container);

        let carried = match self.subtype(container, name).cloned() {
            Some(Type::Namespace(id)) => {
                let id = self.resolve(id);
                if let Namespace::Placeholder(placeholder) = self.namespace_mut(id) {
                    placeholder.locations.push(location);
                }
                return id;
            }
            Some(Type::Placeholder(id)) => {
                let constant = self.constant_side(id);
                let locations = self.placeholder(constant).locations.clone();
                self.mark_replaced(id);
                locations
            }
            _ => Vec::new(),
        };

        let full_name = self.member_full_name(container, name);
        debug!("namespace placeholder created: {}", full_name);

        let mut locations = carried;
        locations.push(location);
        let id = self.alloc_namespace(Namespace::Placeholder(NamespacePlaceholder {
            base: NamespaceBase::new(name, full_name, Some(container)),
            locations,
            replaced_by: None,
            checked: false,
        }));

        self.define_subtype(container, name, Type::Namespace(id));
        if self.constant(container, name).is_none() {
            self.define_constant(container, name, Type::singleton_of(Type::Namespace(id)));
        }
        id
    }

    /// Reports every placeholder still unresolved, once per use site.
    ///
    /// A placeholder counts as resolved once a slot it was installed in
    /// holds a real definition. Each placeholder is examined at most once, so calling this
    /// again only reports placeholders created since the last call.
    pub fn check_placeholders(&mut self) -> Vec<TypeError> {
        let mut errors = Vec::new();

        for index in 0..self.placeholders.len() {
            let id = PlaceholderId(index as u32);
            let data = self.placeholder(id);
            if data.checked || self.constant_side(id) != id {
                continue;
            }

            if !data.replaced && self.pair_is_defined(id) {
                self.mark_replaced(id);
            }

            let data = self.placeholder_mut(id);
            data.checked = true;
            if data.replaced {
                continue;
            }
            errors.extend(data.locations.iter().map(|location| TypeError::UndefinedConstant {
                name: data.full_name.clone(),
                location: location.clone(),
            }));
        }

        for index in 0..self.namespaces.len() {
            if let Namespace::Placeholder(placeholder) = &mut self.namespaces[index] {
                if placeholder.checked || placeholder.replaced_by.is_some() {
                    continue;
                }
                placeholder.checked = true;
                errors.extend(placeholder.locations.iter().map(|location| {
                    TypeError::UndefinedNamespace {
                        name: placeholder.base.full_name.clone(),
                        location: location.clone(),
                    }
                }));
            }
        }

        errors
    }

    /// True if a slot occupied by the pair `id` belongs to now holds a real
    /// definition. Slots the pair never occupied are not consulted.
    fn pair_is_defined(&self, id: PlaceholderId) -> bool {
        let data = self.placeholder(id);
        let own = self.slot_is_defined(data.kind, data.container, data.as_name);
        own || data.sibling.is_some_and(|sibling| {
            let sibling = self.placeholder(sibling);
            self.slot_is_defined(sibling.kind, sibling.container, sibling.as_name)
        })
    }

    fn slot_is_defined(&self, kind: PlaceholderKind, container: NamespaceId, name: Symbol) -> bool {
        let ty = match kind {
            PlaceholderKind::Constant => self.constant(container, name),
            PlaceholderKind::Subtype => self.subtype(container, name),
        };
        ty.is_some_and(|ty| !matches!(ty, Type::ConstantPlaceholder(_) | Type::Placeholder(_)))
    }
}
