//! Face table
//!
//! Faces registered with the forwarder, by id.

use std::collections::HashMap;
use std::sync::Arc;

use nfwd_core::{Face, FaceError, FaceId};

/// Registered faces
#[derive(Debug, Default)]
pub struct FaceTable {
    faces: HashMap<FaceId, Arc<dyn Face>>,
}

impl FaceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face; ids must be unique
    pub fn add(&mut self, face: Arc<dyn Face>) -> Result<(), FaceError> {
        let id = face.id();
        if self.faces.contains_key(&id) {
            return Err(FaceError::Duplicate(id));
        }
        self.faces.insert(id, face);
        Ok(())
    }

    /// Unregister a face
    pub fn remove(&mut self, id: FaceId) -> Result<Arc<dyn Face>, FaceError> {
        self.faces.remove(&id).ok_or(FaceError::NotFound(id))
    }

    /// Look up a face
    pub fn get(&self, id: FaceId) -> Option<&Arc<dyn Face>> {
        self.faces.get(&id)
    }

    /// Look up a face, failing if it is not registered
    pub fn require(&self, id: FaceId) -> Result<&Arc<dyn Face>, FaceError> {
        self.get(id).ok_or(FaceError::NotFound(id))
    }

    /// Check if a face is registered
    pub fn contains(&self, id: FaceId) -> bool {
        self.faces.contains_key(&id)
    }

    /// Number of registered faces
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Check if no face is registered
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// All registered faces, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Face>> {
        self.faces.values()
    }
}
