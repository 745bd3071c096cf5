// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of libtess2 bucketalloc.c/h
//
// The bucket allocator becomes a Vec-backed arena with a free list. The sweep
// uses it for active regions, which are created and destroyed constantly while
// the sweep line advances.

use std::ops::{Index, IndexMut};

pub struct BucketAlloc<T> {
    items: Vec<Option<T>>,
    free_list: Vec<u32>,
}

impl<T> BucketAlloc<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Store `value`, reusing a freed slot when one is available.
    pub fn alloc(&mut self, value: T) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            self.items[idx as usize] = Some(value);
            idx
        } else {
            self.items.push(Some(value));
            (self.items.len() - 1) as u32
        }
    }

    /// Release a slot. Freeing an already free slot is a no-op.
    pub fn free(&mut self, idx: u32) {
        if let Some(slot) = self.items.get_mut(idx as usize) {
            if slot.take().is_some() {
                self.free_list.push(idx);
            }
        }
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        self.items.get(idx as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.items.get_mut(idx as usize)?.as_mut()
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.items.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for BucketAlloc<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<u32> for BucketAlloc<T> {
    type Output = T;

    fn index(&self, idx: u32) -> &T {
        match self.get(idx) {
            Some(item) => item,
            None => panic!("bucket slot {} is not allocated", idx),
        }
    }
}

impl<T> IndexMut<u32> for BucketAlloc<T> {
    fn index_mut(&mut self, idx: u32) -> &mut T {
        match self.get_mut(idx) {
            Some(item) => item,
            None => panic!("bucket slot {} is not allocated", idx),
        }
    }
}
