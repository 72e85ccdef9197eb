// type_key.rs - Registry-assigned keys for component and system types
//
// Keys are handed out by a process-wide registry in first-use order.
// They are never derived from Rust TypeIds, so a key is stable for the
// lifetime of the process and cheap to compare, hash and sort.

use once_cell::sync::{Lazy, OnceCell};
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Names of every registered type, indexed by key.
static REGISTRY: Lazy<RwLock<Vec<&'static str>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Identifies one component or system type.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(u32);

impl TypeKey {
    /// Allocate a fresh key. Every call yields a new key, even for a name
    /// seen before; use [`TypeKeyCell`] to register a type exactly once.
    pub fn register(name: &'static str) -> TypeKey {
        let mut names = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
        let key = TypeKey(names.len() as u32);
        names.push(name);
        key
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Human-readable name given at registration.
    pub fn name(self) -> &'static str {
        REGISTRY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(self.0 as usize)
            .copied()
            .unwrap_or("<unregistered>")
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey(#{} {})", self.0, self.name())
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lazily registers a type's key on first use.
///
/// One static cell lives per type; `define_component!` and `define_system!`
/// declare it.
pub struct TypeKeyCell(OnceCell<TypeKey>);

impl TypeKeyCell {
    pub const fn new() -> Self {
        TypeKeyCell(OnceCell::new())
    }

    pub fn get_or_register(&self, name: &'static str) -> TypeKey {
        *self.0.get_or_init(|| TypeKey::register(name))
    }
}

impl Default for TypeKeyCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Types that own a registry key.
pub trait Keyed: 'static {
    fn type_key() -> TypeKey;

    fn type_name() -> &'static str {
        Self::type_key().name()
    }
}

/// Sorted, de-duplicated set of keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSet {
    keys: Vec<TypeKey>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = TypeKey>,
    {
        let mut keys: Vec<TypeKey> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();
        Self { keys }
    }

    pub fn insert(&mut self, key: TypeKey) {
        if let Err(at) = self.keys.binary_search(&key) {
            self.keys.insert(at, key);
        }
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.keys.binary_search(&key).is_ok()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.keys.iter().copied()
    }

    pub fn as_slice(&self) -> &[TypeKey] {
        &self.keys
    }
}

impl FromIterator<TypeKey> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeKey>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}

/// A tuple of keyed types, used to name several types in one generic
/// argument: `executes_after::<(Physics, Input)>()`.
pub trait KeySet {
    /// Keys in declaration order (duplicates kept).
    fn keys() -> Vec<TypeKey>;
}

macro_rules! impl_key_set {
    ($($name:ident),*) => {
        impl<$($name: Keyed),*> KeySet for ($($name,)*) {
            fn keys() -> Vec<TypeKey> {
                vec![$($name::type_key()),*]
            }
        }
    };
}

impl_key_set!();
impl_key_set!(A);
impl_key_set!(A, B);
impl_key_set!(A, B, C);
impl_key_set!(A, B, C, D);
impl_key_set!(A, B, C, D, E);
impl_key_set!(A, B, C, D, E, F);
impl_key_set!(A, B, C, D, E, F, G);
impl_key_set!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_distinct_keys() {
        let a = TypeKey::register("KeyA");
        let b = TypeKey::register("KeyB");
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(a.name(), "KeyA");
        assert_eq!(b.to_string(), "KeyB");
    }

    #[test]
    fn cell_registers_once() {
        static CELL: TypeKeyCell = TypeKeyCell::new();
        let first = CELL.get_or_register("Cached");
        let second = CELL.get_or_register("Cached");
        assert_eq!(first, second);
    }

    #[test]
    fn type_set_sorts_and_dedups() {
        let a = TypeKey::register("SetA");
        let b = TypeKey::register("SetB");
        let set = TypeSet::from_keys([b, a, b]);
        assert_eq!(set.as_slice(), &[a, b]);
        assert!(set.contains(a));

        let mut grown = TypeSet::new();
        grown.insert(b);
        grown.insert(a);
        grown.insert(a);
        assert_eq!(grown, set);
    }
}
