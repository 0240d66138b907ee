//! Generation-checked handle pools.
//!
//! This module provides [`HandlePool<T>`], fixed-capacity slot storage that
//! hands out [`Handle<T>`] values instead of references. A handle is a
//! `(slot index, generation)` pair; removing a value bumps the slot's
//! generation, so every handle issued before the removal stops resolving.
//!
//! # Motivation
//!
//! GPU objects outlive the code that created them and are referenced from
//! many places (scene textures, frame graph targets, cached shader programs).
//! Handing out raw references would tie those lifetimes together. Handles
//! let the pool own the objects while callers keep cheap copyable tokens
//! that resolve to "not found" once the object is gone.
//!
//! # Example
//!
//! ```
//! use lumenwall_core::pool::HandlePool;
//!
//! let mut pool = HandlePool::with_capacity(4);
//! let a = pool.insert("first").unwrap();
//! assert_eq!(pool.get(a), Some(&"first"));
//!
//! pool.remove(a);
//! let b = pool.insert("second").unwrap();
//!
//! // `b` reuses the slot of `a`, but `a` no longer resolves.
//! assert_eq!(pool.get(a), None);
//! assert_eq!(pool.get(b), Some(&"second"));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Errors raised by [`HandlePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Every slot is live and the capacity ceiling has been reached.
    #[error("handle pool exhausted (capacity {capacity})")]
    Exhausted {
        /// The configured ceiling.
        capacity: usize,
    },
}

/// Opaque reference to a value stored in a [`HandlePool<T>`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index inside the owning pool.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this handle was issued.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Fixed-capacity storage addressed by generation-checked handles.
///
/// Freed slots are reused most-recently-freed first. The pool never evicts:
/// once `capacity` values are live, [`insert`](Self::insert) fails with
/// [`PoolError::Exhausted`].
#[derive(Debug)]
pub struct HandlePool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    capacity: usize,
    live: usize,
}

impl<T> HandlePool<T> {
    /// Creates an empty pool that holds at most `capacity` live values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            capacity,
            live: 0,
        }
    }

    /// Stores a value and returns its handle.
    pub fn insert(&mut self, value: T) -> Result<Handle<T>, PoolError> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.live += 1;
            return Ok(Handle::new(index, slot.generation));
        }
        if self.slots.len() >= self.capacity {
            return Err(PoolError::Exhausted {
                capacity: self.capacity,
            });
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.live += 1;
        Ok(Handle::new(index, 0))
    }

    /// Resolves a handle; stale or destroyed handles yield `None`.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Returns true if the handle still refers to a live value.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Removes the value and invalidates every handle to its slot.
    ///
    /// Returns `None` (and changes nothing) for stale handles.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(value)
    }

    /// Removes every live value, invalidating all outstanding handles.
    pub fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.live);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.value.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                out.push(value);
            }
        }
        self.live = 0;
        out
    }

    /// Iterates over live values with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(index as u32, slot.generation), value))
        })
    }

    /// Number of live values.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if no value is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The capacity ceiling.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
