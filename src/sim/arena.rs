//! Generational arena for seeds
//!
//! Handles stay valid only while the slot they point at holds the same
//! generation. A retired seed's handle fails every lookup, so deferred work
//! that captured it silently observes "gone" instead of touching a new seed
//! that reused the slot.

use serde::{Deserialize, Serialize};

/// Stable, generation-checked handle to a seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeedId {
    index: u32,
    generation: u32,
}

impl SeedId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for SeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seed#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
}

#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value built from its own handle
    pub fn insert_with(&mut self, build: impl FnOnce(SeedId) -> T) -> SeedId {
        let id = match self.free.pop() {
            Some(index) => {
                let generation = match self.slots[index as usize] {
                    Slot::Vacant { generation } => generation,
                    Slot::Occupied { generation, .. } => generation,
                };
                SeedId { index, generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot::Vacant { generation: 0 });
                SeedId {
                    index,
                    generation: 0,
                }
            }
        };
        self.slots[id.index as usize] = Slot::Occupied {
            generation: id.generation,
            value: build(id),
        };
        self.len += 1;
        id
    }

    /// Remove a value, bumping the slot generation. Stale handles return `None`.
    pub fn remove(&mut self, id: SeedId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == id.generation => {
                let next = Slot::Vacant {
                    generation: generation.wrapping_add(1),
                };
                let Slot::Occupied { value, .. } = std::mem::replace(slot, next) else {
                    return None;
                };
                self.free.push(id.index);
                self.len -= 1;
                Some(value)
            }
            _ => None,
        }
    }

    pub fn get(&self, id: SeedId) -> Option<&T> {
        match self.slots.get(id.index as usize)? {
            Slot::Occupied { generation, value } if *generation == id.generation => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: SeedId) -> Option<&mut T> {
        match self.slots.get_mut(id.index as usize)? {
            Slot::Occupied { generation, value } if *generation == id.generation => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, id: SeedId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live entries in slot order (stable across runs)
    pub fn iter(&self) -> impl Iterator<Item = (SeedId, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied { generation, value } => Some((
                SeedId {
                    index: i as u32,
                    generation: *generation,
                },
                value,
            )),
            Slot::Vacant { .. } => None,
        })
    }
}
