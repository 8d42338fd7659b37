//! Canvas document: the single source of truth for spatial state.

use crate::block::{Block, BlockId};
use crate::camera::Camera;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Document errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A canvas document: an ordered id sequence plus an id → block map, kept in
/// 1:1 correspondence. The sequence is insertion order; stacking is governed
/// by each block's `z_index`, not by sequence position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Camera owned by the document; mutated only by pan/zoom gestures.
    pub camera: Camera,
    ids: Vec<BlockId>,
    blocks: HashMap<BlockId, Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block. The id is taken from the block itself.
    pub fn insert(&mut self, block: Block) -> BlockId {
        let id = block.id();
        debug_assert!(!self.blocks.contains_key(&id), "duplicate block id");
        self.ids.push(id);
        self.blocks.insert(id, block);
        id
    }

    /// Remove a block, dropping the id from the sequence and the map
    /// together so no dangling id remains.
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let removed = self.blocks.remove(&id);
        if removed.is_some() {
            self.ids.retain(|&other| other != id);
        }
        removed
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.ids.iter().filter_map(|id| self.blocks.get(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut doc = Document::new();
        let id = doc.insert(Block::image("a", 0.0, 0.0, 10.0, 10.0, 0));
        assert_eq!(doc.len(), 1);
        assert!(doc.get(id).is_some());
        assert_eq!(doc.ids(), &[id]);
    }

    #[test]
    fn test_remove_is_atomic() {
        let mut doc = Document::new();
        let a = doc.insert(Block::image("a", 0.0, 0.0, 10.0, 10.0, 0));
        let b = doc.insert(Block::prompt(20.0, 0.0, 180.0, 32.0, 1));

        assert!(doc.remove(a).is_some());
        assert!(!doc.ids().contains(&a));
        assert!(doc.get(a).is_none());
        assert_eq!(doc.ids(), &[b]);

        // Removing again is a no-op.
        assert!(doc.remove(a).is_none());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_blocks_follow_insertion_order() {
        let mut doc = Document::new();
        let a = doc.insert(Block::image("a", 0.0, 0.0, 10.0, 10.0, 5));
        let b = doc.insert(Block::image("b", 0.0, 0.0, 10.0, 10.0, 1));
        let order: Vec<_> = doc.blocks().map(Block::id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut doc = Document::new();
        doc.insert(Block::render("make image", -300.0, -200.0, 600.0, 400.0, 0));
        doc.insert(Block::image("/cat.jpg", -400.0, -400.0, 400.0, 300.0, 0));

        let json = doc.to_json().unwrap();
        let back = Document::from_json(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.ids(), doc.ids());
    }
}
