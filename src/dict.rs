// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of libtess2 dict.c/h
//
// Sorted circular doubly-linked list holding the active regions of the sweep,
// ordered from bottom to top. Keys are active-region indices; the head node
// carries `INVALID` and terminates every walk. The ordering predicate depends
// on the current sweep event, so callers pass it in on every operation.

use crate::mesh::INVALID;

/// Index into `Dict::nodes`.
pub type NodeIdx = u32;

/// Index of the head sentinel node.
pub const DICT_HEAD: NodeIdx = 0;

#[derive(Clone, Debug)]
struct DictNode {
    key: u32,
    next: NodeIdx,
    prev: NodeIdx,
}

pub struct Dict {
    nodes: Vec<DictNode>,
    free: Vec<NodeIdx>,
}

impl Dict {
    pub fn new() -> Self {
        Dict {
            nodes: vec![DictNode {
                key: INVALID,
                next: DICT_HEAD,
                prev: DICT_HEAD,
            }],
            free: Vec::new(),
        }
    }

    /// Insert `key` at its sorted position, searching backward from the head.
    pub fn insert<F>(&mut self, key: u32, leq: F) -> NodeIdx
    where
        F: FnMut(u32, u32) -> bool,
    {
        self.insert_before(DICT_HEAD, key, leq)
    }

    /// Insert `key` immediately after the last node preceding `node` whose key
    /// is `leq` the new key.
    pub fn insert_before<F>(&mut self, mut node: NodeIdx, key: u32, mut leq: F) -> NodeIdx
    where
        F: FnMut(u32, u32) -> bool,
    {
        loop {
            node = self.nodes[node as usize].prev;
            let node_key = self.nodes[node as usize].key;
            if node_key == INVALID || leq(node_key, key) {
                break;
            }
        }

        let next = self.nodes[node as usize].next;
        let fresh = DictNode {
            key,
            next,
            prev: node,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx as usize] = fresh;
                idx
            }
            None => {
                self.nodes.push(fresh);
                (self.nodes.len() - 1) as NodeIdx
            }
        };
        self.nodes[node as usize].next = idx;
        self.nodes[next as usize].prev = idx;
        idx
    }

    /// Unlink a node; its slot is recycled by later insertions.
    pub fn delete(&mut self, node: NodeIdx) {
        debug_assert_ne!(node, DICT_HEAD, "the head node cannot be deleted");
        let DictNode { next, prev, .. } = self.nodes[node as usize];
        self.nodes[next as usize].prev = prev;
        self.nodes[prev as usize].next = next;
        self.nodes[node as usize].key = INVALID;
        self.free.push(node);
    }

    /// First node whose key satisfies `leq(key, node_key)`, or the head.
    pub fn search<F>(&self, key: u32, mut leq: F) -> NodeIdx
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut node = DICT_HEAD;
        loop {
            node = self.nodes[node as usize].next;
            let node_key = self.nodes[node as usize].key;
            if node_key == INVALID || leq(key, node_key) {
                return node;
            }
        }
    }

    #[inline]
    pub fn key(&self, node: NodeIdx) -> u32 {
        self.nodes[node as usize].key
    }

    #[inline]
    pub fn min(&self) -> NodeIdx {
        self.nodes[DICT_HEAD as usize].next
    }

    #[inline]
    pub fn max(&self) -> NodeIdx {
        self.nodes[DICT_HEAD as usize].prev
    }

    #[inline]
    pub fn succ(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].next
    }

    #[inline]
    pub fn pred(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].prev
    }

    pub fn is_empty(&self) -> bool {
        self.min() == DICT_HEAD
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leq(a: u32, b: u32) -> bool {
        a <= b
    }

    fn keys(d: &Dict) -> Vec<u32> {
        let mut out = Vec::new();
        let mut n = d.min();
        while n != DICT_HEAD {
            out.push(d.key(n));
            n = d.succ(n);
        }
        out
    }

    #[test]
    fn empty_dict() {
        let d = Dict::new();
        assert!(d.is_empty());
        assert_eq!(d.min(), DICT_HEAD);
        assert_eq!(d.max(), DICT_HEAD);
    }

    #[test]
    fn insert_keeps_order() {
        let mut d = Dict::new();
        d.insert(3, leq);
        d.insert(1, leq);
        d.insert(2, leq);
        assert_eq!(keys(&d), vec![1, 2, 3]);
        assert_eq!(d.key(d.max()), 3);
    }

    #[test]
    fn insert_before_searches_backward_from_node() {
        let mut d = Dict::new();
        d.insert(10, leq);
        let n30 = d.insert(30, leq);
        d.insert_before(n30, 20, leq);
        assert_eq!(keys(&d), vec![10, 20, 30]);
    }

    #[test]
    fn deleted_nodes_are_recycled() {
        let mut d = Dict::new();
        d.insert(1, leq);
        let n2 = d.insert(2, leq);
        d.insert(3, leq);
        d.delete(n2);
        assert_eq!(keys(&d), vec![1, 3]);
        let again = d.insert(2, leq);
        assert_eq!(again, n2);
        assert_eq!(keys(&d), vec![1, 2, 3]);
    }

    #[test]
    fn search_finds_first_geq() {
        let mut d = Dict::new();
        d.insert(1, leq);
        d.insert(3, leq);
        d.insert(5, leq);
        assert_eq!(d.key(d.search(2, leq)), 3);
        assert_eq!(d.key(d.search(3, leq)), 3);
        assert_eq!(d.search(6, leq), DICT_HEAD);
    }
}
