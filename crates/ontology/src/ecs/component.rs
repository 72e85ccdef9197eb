// component.rs - Component and system type registration
//
// Every component and system type gets a registry key the first time it
// is asked for one. The macros below declare the per-type static cell.

use crate::ecs::{KeySet, Keyed};

/// Plain data attached to entities.
///
/// Implement through [`define_component!`], which supplies the key.
/// Components must be `Send + Sync` so parallel systems can share stores
/// across threads.
pub trait Component: Keyed + Send + Sync {}

/// A tuple of component types: `supports_components::<(Position, Velocity)>()`.
pub trait ComponentSet: KeySet {}

macro_rules! impl_component_set {
    ($($name:ident),*) => {
        impl<$($name: Component),*> ComponentSet for ($($name,)*) {}
    };
}

impl_component_set!();
impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// Implement [`Keyed`] for a type through a lazily registered static cell.
///
/// The registered name is the type's path, for diagnostics only.
#[doc(hidden)]
#[macro_export]
macro_rules! __impl_keyed {
    ($ty:ty) => {
        impl $crate::ecs::Keyed for $ty {
            fn type_key() -> $crate::ecs::TypeKey {
                static KEY: $crate::ecs::TypeKeyCell = $crate::ecs::TypeKeyCell::new();
                KEY.get_or_register(::std::any::type_name::<$ty>())
            }
        }
    };
}

/// Helper macro to implement the Component trait.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Copy)]
/// struct Position { x: f32, y: f32 }
///
/// define_component!(Position);
/// ```
#[macro_export]
macro_rules! define_component {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__impl_keyed!($ty);
            impl $crate::ecs::Component for $ty {}
        )+
    };
}

/// Give a system type its registry key. The system still implements
/// `System` or `ParallelSystem` itself.
#[macro_export]
macro_rules! define_system {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__impl_keyed!($ty);
        )+
    };
}
