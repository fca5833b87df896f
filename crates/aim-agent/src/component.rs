//! Type-erased, per-agent component storage.
//!
//! # Design
//!
//! Each agent carries at most one value per component type, boxed behind
//! `Box<dyn Any + Send>` in a `HashMap<TypeId, _>`. This is the single-agent
//! narrowing of the population-wide "one `Vec<T>` per type" pattern: since an
//! `Agent` here is an owned value moved between blocks rather than an index
//! into a shared store, there is no parallel array to keep in lockstep —
//! just one slot per type, set and read directly.
//!
//! # Usage
//!
//! ```rust
//! use aim_agent::ComponentMap;
//!
//! #[derive(Default)]
//! struct Flag(bool);
//!
//! let mut map = ComponentMap::new();
//! map.set(Flag(true));
//! assert!(map.contains::<Flag>());
//! assert_eq!(map.get::<Flag>().unwrap().0, true);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Registry of user-defined component values on a single agent, one boxed
/// value per type.
#[derive(Default)]
pub struct ComponentMap {
    map: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl ComponentMap {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Set (insert or overwrite) the component of type `T`.
    pub fn set<T: Send + 'static>(&mut self, value: T) {
        self.map.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Shared reference to the component `T`, if present.
    pub fn get<T: Send + 'static>(&self) -> Option<&T> {
        self.map.get(&TypeId::of::<T>()).and_then(|v| v.downcast_ref::<T>())
    }

    /// Mutable reference to the component `T`, if present.
    pub fn get_mut<T: Send + 'static>(&mut self) -> Option<&mut T> {
        self.map.get_mut(&TypeId::of::<T>()).and_then(|v| v.downcast_mut::<T>())
    }

    /// Remove and return the component `T`, if present.
    pub fn take<T: Send + 'static>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }

    /// `true` if component `T` is present.
    pub fn contains<T: Send + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Number of distinct component types currently set.
    pub fn type_count(&self) -> usize {
        self.map.len()
    }
}
