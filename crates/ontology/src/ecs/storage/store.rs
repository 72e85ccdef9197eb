use crate::ecs::Component;
use std::any::Any;

/// Dense array of one component type.
#[derive(Debug)]
pub struct ComponentStore<T> {
    values: Vec<T>,
}

impl<T> ComponentStore<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Insert at `index`, shifting later values up by one.
    pub(crate) fn insert(&mut self, index: usize, value: T) {
        self.values.insert(index, value);
    }

    /// Remove the value at `index`, shifting later values down by one.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.values.len()).then(|| self.values.remove(index))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.values.get_mut(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a store, for operations that only know a key.
pub(crate) trait AnyComponentStore: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn erase(&mut self, index: usize) -> bool;
    fn len(&self) -> usize;
}

impl<T: Component> AnyComponentStore for ComponentStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn erase(&mut self, index: usize) -> bool {
        self.remove(index).is_some()
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_shifts_later_values() {
        let mut store = ComponentStore::new();
        store.insert(0, 66);
        store.insert(1, 77);
        store.insert(0, 55);
        assert_eq!(store.as_slice(), &[55, 66, 77]);

        assert_eq!(store.remove(0), Some(55));
        assert_eq!(store.remove(5), None);
        assert_eq!(store.as_slice(), &[66, 77]);
    }
}
