//! Generational arena for instances.

use std::fmt;

use objmodel_core::ObjectHandle;

use crate::instance::Instance;

/// Storage for every instance a runtime creates.
///
/// Freed slots are reused with a bumped generation, so handles to freed
/// instances are detected instead of aliasing a newer object.
#[derive(Default)]
pub struct ObjectHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
}

struct HeapSlot {
    generation: u32,
    value: Option<Instance>,
}

impl ObjectHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an instance and return its handle.
    pub fn allocate(&mut self, instance: Instance) -> ObjectHandle {
        if let Some(index) = self.free_list.pop()
            && let Some(slot) = self.slots.get_mut(index as usize)
        {
            slot.value = Some(instance);
            return ObjectHandle::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(HeapSlot {
            generation: 0,
            value: Some(instance),
        });
        ObjectHandle::new(index, 0)
    }

    /// Returns None if the handle is stale.
    pub fn get(&self, handle: ObjectHandle) -> Option<&Instance> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Returns None if the handle is stale.
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut Instance> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Free an instance. Returns false for a stale handle.
    pub fn free(&mut self, handle: ObjectHandle) -> bool {
        if let Some(slot) = self.slots.get_mut(handle.index as usize)
            && slot.generation == handle.generation
            && slot.value.is_some()
        {
            slot.value = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(handle.index);
            return true;
        }
        false
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live instances.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .finish()
    }
}
