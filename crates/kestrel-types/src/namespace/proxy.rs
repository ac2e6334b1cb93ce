//! Mixin and interface inclusion.
//!
//! Including mixin `M` (ancestry `M -> B`) into class `C` must put `M` and
//! `B` into `C`'s ancestry without touching `M`'s own chain, because other
//! includers need their own chains. Each inclusion therefore copies the
//! spine: [`create_proxy`](GlobalEnvironment::create_proxy) builds a fresh
//! proxy for `M` and for every link of `M`'s parent chain, all pointing at
//! the shared canonical namespaces. Members stay on the canonical mixin, so
//! methods defined on it later are seen by every includer.
//!
//! ```text
//! before:  C -> Object              M -> [B]
//! after:   C -> [M'] -> [B'] -> Object
//! ```

use crate::env::GlobalEnvironment;
use crate::namespace::{Namespace, NamespaceId, Proxy};
use kestrel_log::debug;

impl GlobalEnvironment {
    /// Builds a fresh proxy chain for `target` and its parent chain.
    ///
    /// Returns `(head, tail)`: `head` wraps `target`, `tail` is the last
    /// link, whose parent is left empty for the caller to splice.
    ///
    /// # Panics
    ///
    /// In debug builds, if `target` is not a mixin or an interface.
    pub fn create_proxy(&mut self, target: NamespaceId) -> (NamespaceId, NamespaceId) {
        let target = self.unwrap_namespace(target);
        debug_assert!(
            matches!(self.namespace(target), Namespace::Mixin(_) | Namespace::Interface(_)),
            "cannot include {} `{}`",
            self.namespace(target).kind_name(),
            self.namespace_full_name(target)
        );
        let interface = matches!(self.namespace(target), Namespace::Interface(_));

        let head = self.alloc_proxy(target, interface);
        let mut tail = head;

        let mut link = self.namespace(target).parent();
        while let Some(current) = link {
            let current = self.resolve(current);
            let link_is_interface = match self.namespace(current) {
                Namespace::InterfaceProxy(_) | Namespace::Interface(_) => true,
                Namespace::MixinProxy(_) | Namespace::Mixin(_) => false,
                _ => interface,
            };
            let copy = self.alloc_proxy(self.unwrap_namespace(current), link_is_interface);

            self.namespace_mut(tail).set_parent(Some(copy));
            tail = copy;
            link = self.namespace(current).parent();
        }

        (head, tail)
    }

    fn alloc_proxy(&mut self, target: NamespaceId, interface: bool) -> NamespaceId {
        let proxy = Proxy {
            target,
            parent: None,
        };
        self.alloc_namespace(if interface {
            Namespace::InterfaceProxy(proxy)
        } else {
            Namespace::MixinProxy(proxy)
        })
    }

    /// Includes `mixin` into `target`, directly after `target` itself.
    pub fn include_mixin(&mut self, target: NamespaceId, mixin: NamespaceId) {
        debug!(
            "including {} in {}",
            self.namespace_full_name(mixin),
            self.namespace_full_name(target)
        );
        self.splice(target, mixin);
    }

    /// Records that `target` implements `interface`.
    pub fn implement_interface(&mut self, target: NamespaceId, interface: NamespaceId) {
        debug!(
            "{} implements {}",
            self.namespace_full_name(target),
            self.namespace_full_name(interface)
        );
        self.splice(target, interface);
    }

    fn splice(&mut self, target: NamespaceId, included: NamespaceId) {
        let target = self.unwrap_namespace(target);
        let (head, tail) = self.create_proxy(included);

        let previous = self.namespace(target).parent();
        self.namespace_mut(tail).set_parent(previous);
        self.namespace_mut(target).set_parent(Some(head));
    }

    /// True if `included` was included into (or implemented by) `target`
    /// directly or through another inclusion.
    #[must_use]
    pub fn is_included(&self, target: NamespaceId, included: NamespaceId) -> bool {
        let included = self.unwrap_namespace(included);
        self.ancestors(target).any(|link| {
            self.namespace(link)
                .proxy_target()
                .is_some_and(|proxied| self.unwrap_namespace(proxied) == included)
        })
    }
}
