//! Identity shared by every scene entity.

use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// A process-unique id paired with a human readable name.
///
/// Ids are handed out by a global atomic counter in creation order, so two
/// objects never share an id and a later object always has a larger one.
/// Neither field changes after construction.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Object {
    id: u32,
    name: String,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
