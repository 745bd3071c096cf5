// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of libtess2 priorityq.c/h
//
// Event queue of the sweep, ordered by `vert_leq` on sweep coordinates.
// Two phases, as in libtess2:
//   - before `init`, insertions go into a key array that is sorted once;
//   - after `init`, insertions (intersection vertices) go into a binary heap.
// Both phases hand out handles so queued vertices can be deleted when they are
// merged into another vertex. Sort-array handles are negative.

use glam::DVec2;

use crate::geom::vert_leq;
use crate::mesh::VertIdx;

/// Handle value stored on vertices that are not in the queue.
pub const INVALID_HANDLE: i32 = 0x0fff_ffff;

#[derive(Clone, Copy, Debug)]
struct Entry {
    pos: DVec2,
    vert: VertIdx,
}

#[derive(Clone, Debug)]
struct HeapSlot {
    entry: Option<Entry>,
    node: usize,
}

/// Binary min-heap with stable handles. `nodes[1..=size]` are live.
struct Heap {
    nodes: Vec<u32>,
    slots: Vec<HeapSlot>,
    free: Vec<u32>,
    size: usize,
}

impl Heap {
    fn new() -> Self {
        Heap {
            nodes: vec![0],
            slots: Vec::new(),
            free: Vec::new(),
            size: 0,
        }
    }

    fn pos_at(&self, node: usize) -> DVec2 {
        let handle = self.nodes[node] as usize;
        match self.slots[handle].entry {
            Some(e) => e.pos,
            None => DVec2::new(f64::INFINITY, f64::INFINITY),
        }
    }

    fn place(&mut self, node: usize, handle: u32) {
        self.nodes[node] = handle;
        self.slots[handle as usize].node = node;
    }

    fn float_down(&mut self, mut curr: usize) {
        let h_curr = self.nodes[curr];
        let key = self.pos_at(curr);
        loop {
            let mut child = curr << 1;
            if child > self.size {
                break;
            }
            if child < self.size && vert_leq(self.pos_at(child + 1), self.pos_at(child)) {
                child += 1;
            }
            if vert_leq(key, self.pos_at(child)) {
                break;
            }
            let h_child = self.nodes[child];
            self.place(curr, h_child);
            curr = child;
        }
        self.place(curr, h_curr);
    }

    fn float_up(&mut self, mut curr: usize) {
        let h_curr = self.nodes[curr];
        let key = self.pos_at(curr);
        while curr > 1 {
            let parent = curr >> 1;
            if vert_leq(self.pos_at(parent), key) {
                break;
            }
            let h_parent = self.nodes[parent];
            self.place(curr, h_parent);
            curr = parent;
        }
        self.place(curr, h_curr);
    }

    fn insert(&mut self, entry: Entry) -> u32 {
        self.size += 1;
        let curr = self.size;
        if self.nodes.len() <= curr {
            self.nodes.push(0);
        }
        let handle = match self.free.pop() {
            Some(h) => {
                self.slots[h as usize] = HeapSlot {
                    entry: Some(entry),
                    node: curr,
                };
                h
            }
            None => {
                self.slots.push(HeapSlot {
                    entry: Some(entry),
                    node: curr,
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.nodes[curr] = handle;
        self.float_up(curr);
        handle
    }

    fn minimum(&self) -> Option<Entry> {
        if self.size == 0 {
            return None;
        }
        self.slots[self.nodes[1] as usize].entry
    }

    fn extract_min(&mut self) -> Option<Entry> {
        if self.size == 0 {
            return None;
        }
        let handle = self.nodes[1];
        self.remove_node(1);
        self.release(handle)
    }

    fn delete(&mut self, handle: u32) {
        let Some(slot) = self.slots.get(handle as usize) else {
            return;
        };
        if slot.entry.is_none() {
            return;
        }
        let node = slot.node;
        self.remove_node(node);
        self.release(handle);
    }

    fn remove_node(&mut self, node: usize) {
        let last = self.nodes[self.size];
        self.size -= 1;
        if node > self.size {
            return;
        }
        self.place(node, last);
        if node > 1 && !vert_leq(self.pos_at(node >> 1), self.pos_at(node)) {
            self.float_up(node);
        } else {
            self.float_down(node);
        }
    }

    fn release(&mut self, handle: u32) -> Option<Entry> {
        let entry = self.slots[handle as usize].entry.take();
        self.free.push(handle);
        entry
    }
}

/// The sweep event queue.
pub struct PriorityQ {
    heap: Heap,
    keys: Vec<Option<Entry>>,
    /// Indices into `keys`, sorted so the minimum is last.
    order: Vec<u32>,
    initialized: bool,
}

impl PriorityQ {
    pub fn new() -> Self {
        PriorityQ {
            heap: Heap::new(),
            keys: Vec::new(),
            order: Vec::new(),
            initialized: false,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut pq = Self::new();
        pq.keys.reserve(capacity);
        pq
    }

    /// Queue vertex `vert` at sweep position `pos`, returning its handle.
    pub fn insert(&mut self, pos: DVec2, vert: VertIdx) -> i32 {
        let entry = Entry { pos, vert };
        if self.initialized {
            return self.heap.insert(entry) as i32;
        }
        self.keys.push(Some(entry));
        -(self.keys.len() as i32)
    }

    /// Sort the keys inserted so far. Later inserts go to the heap.
    pub fn init(&mut self) {
        let keys = &self.keys;
        let mut order: Vec<u32> = (0..keys.len() as u32).collect();
        order.sort_by(|&a, &b| {
            let pa = keys[a as usize].map(|e| e.pos);
            let pb = keys[b as usize].map(|e| e.pos);
            match (pa, pb) {
                (Some(pa), Some(pb)) => {
                    // Descending, so the smallest key sits at the end.
                    let a_le_b = vert_leq(pa, pb);
                    let b_le_a = vert_leq(pb, pa);
                    match (a_le_b, b_le_a) {
                        (true, true) => std::cmp::Ordering::Equal,
                        (true, false) => std::cmp::Ordering::Greater,
                        _ => std::cmp::Ordering::Less,
                    }
                }
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        self.order = order;
        self.initialized = true;
        self.trim_sorted();
    }

    fn trim_sorted(&mut self) {
        while let Some(&last) = self.order.last() {
            if self.keys[last as usize].is_some() {
                break;
            }
            self.order.pop();
        }
    }

    fn sorted_min(&self) -> Option<Entry> {
        self.order.last().and_then(|&i| self.keys[i as usize])
    }

    /// Vertex with the smallest position, without removing it.
    pub fn minimum(&self) -> Option<VertIdx> {
        match (self.sorted_min(), self.heap.minimum()) {
            (Some(s), Some(h)) => Some(if vert_leq(h.pos, s.pos) { h.vert } else { s.vert }),
            (Some(s), None) => Some(s.vert),
            (None, Some(h)) => Some(h.vert),
            (None, None) => None,
        }
    }

    /// Remove and return the vertex with the smallest position.
    pub fn extract_min(&mut self) -> Option<VertIdx> {
        let sorted = self.sorted_min();
        if let Some(h) = self.heap.minimum() {
            if sorted.map_or(true, |s| vert_leq(h.pos, s.pos)) {
                return self.heap.extract_min().map(|e| e.vert);
            }
        }
        let idx = self.order.pop()?;
        let entry = self.keys[idx as usize].take();
        self.trim_sorted();
        entry.map(|e| e.vert)
    }

    /// Remove the entry behind `handle`.
    pub fn delete(&mut self, handle: i32) {
        if handle == INVALID_HANDLE {
            return;
        }
        if handle >= 0 {
            self.heap.delete(handle as u32);
            return;
        }
        let idx = (-(handle + 1)) as usize;
        debug_assert!(self.keys.get(idx).map_or(false, |k| k.is_some()));
        if let Some(slot) = self.keys.get_mut(idx) {
            *slot = None;
        }
        if self.initialized {
            self.trim_sorted();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.minimum().is_none()
    }
}

impl Default for PriorityQ {
    fn default() -> Self {
        Self::new()
    }
}
