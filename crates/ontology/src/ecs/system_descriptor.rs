use crate::ecs::{Component, ComponentSet, KeySet, TypeKey, TypeSet};

/// Declares what a system needs: the component types an entity must own
/// to be processed, and the systems that must run first.
///
/// # Example
/// ```ignore
/// let descriptor = SystemDescriptor::new()
///     .supports_components::<(Position, Velocity)>()
///     .executes_after::<(Input,)>();
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemDescriptor {
    components: TypeSet,
    predecessors: Vec<TypeKey>,
    receives_entities: bool,
}

impl SystemDescriptor {
    /// Requires nothing, so every entity qualifies.
    pub fn new() -> Self {
        Self {
            components: TypeSet::new(),
            predecessors: Vec::new(),
            receives_entities: true,
        }
    }

    /// Replace the required component set.
    pub fn supports_components<C: ComponentSet>(mut self) -> Self {
        self.components = TypeSet::from_keys(C::keys());
        self
    }

    /// Append a single required component.
    pub fn with_component<T: Component>(mut self) -> Self {
        self.components.insert(T::type_key());
        self
    }

    /// Replace the predecessor list. Declaration order is kept; it decides
    /// the order predecessors are resolved in.
    pub fn executes_after<S: KeySet>(mut self) -> Self {
        self.predecessors.clear();
        for key in S::keys() {
            if !self.predecessors.contains(&key) {
                self.predecessors.push(key);
            }
        }
        self
    }

    /// The system is scheduled but never given entities.
    pub fn receives_no_entities(mut self) -> Self {
        self.receives_entities = false;
        self
    }

    pub fn required_components(&self) -> &TypeSet {
        &self.components
    }

    pub fn predecessors(&self) -> &[TypeKey] {
        &self.predecessors
    }

    pub fn receives_entities(&self) -> bool {
        self.receives_entities
    }

    pub(crate) fn into_parts(self) -> (TypeSet, Vec<TypeKey>, bool) {
        (self.components, self.predecessors, self.receives_entities)
    }
}

impl Default for SystemDescriptor {
    fn default() -> Self {
        Self::new()
    }
}
