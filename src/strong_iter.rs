//! Functionality relating to strong iterators: external cursors that stay
//! attached to an array across copies and mutation

use std::collections::VecDeque;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::array::ArrayId;
use crate::error::{ArrayError, Result};

#[derive(Debug)]
struct CursorState {
    owner: Option<ArrayId>,
    pos: Option<usize>,
}

/// A live cursor into an array's iteration order.
///
/// The cursor refers to its owning array by [`ArrayId`] only. Dropping the
/// owning array detaches the cursor; copy-on-write and escalation move it to
/// the replacement instance.
pub struct StrongIter {
    state: Arc<Mutex<CursorState>>,
}

impl StrongIter {
    pub(crate) fn new(pos: Option<usize>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CursorState { owner: None, pos })),
        }
    }

    /// The array this cursor is attached to, if any.
    #[must_use]
    pub fn owner(&self) -> Option<ArrayId> {
        self.state.lock().owner
    }

    /// Current position, or `None` once the cursor ran off the end or its
    /// element was removed.
    #[must_use]
    pub fn pos(&self) -> Option<usize> {
        self.state.lock().pos
    }

    /// Returns `true` while the cursor is registered with an array.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.owner().is_some()
    }

    pub(crate) fn set_pos(&self, pos: Option<usize>) {
        self.state.lock().pos = pos;
    }
}

impl Debug for StrongIter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("StrongIter")
            .field("owner", &state.owner)
            .field("pos", &state.pos)
            .finish()
    }
}

/// The cursors attached to one array instance, most recent first.
#[derive(Default)]
pub(crate) struct IterRegistry {
    cursors: Mutex<VecDeque<Arc<Mutex<CursorState>>>>,
}

impl IterRegistry {
    /// Registers a detached cursor with the array `owner`.
    pub(crate) fn attach(&self, owner: ArrayId, it: &StrongIter) -> Result<()> {
        let mut state = it.state.lock();
        if let Some(current) = state.owner {
            return Err(ArrayError::internal(format!(
                "strong iterator is already attached to array {}",
                current
            )));
        }
        state.owner = Some(owner);
        drop(state);

        let mut cursors = self.cursors.lock();
        // Cursors whose handle was dropped without being freed.
        cursors.retain(|c| Arc::strong_count(c) > 1);
        cursors.push_front(it.state.clone());
        Ok(())
    }

    /// Unregisters `it`.
    pub(crate) fn detach(&self, it: &StrongIter) -> Result<()> {
        let mut cursors = self.cursors.lock();
        if cursors.is_empty() {
            return Err(ArrayError::internal(
                "detaching a strong iterator from an array with none attached",
            ));
        }
        let index = cursors
            .iter()
            .position(|c| Arc::ptr_eq(c, &it.state))
            .ok_or_else(|| ArrayError::internal("strong iterator is not attached to this array"))?;
        if let Some(state) = cursors.remove(index) {
            state.lock().owner = None;
        }
        Ok(())
    }

    /// Detaches every cursor; used when the array is destroyed.
    pub(crate) fn detach_all(&self) {
        for state in self.cursors.lock().drain(..) {
            state.lock().owner = None;
        }
    }

    /// Moves every cursor from `src` to this registry, owned by `dest`.
    pub(crate) fn transfer_all(&self, dest: ArrayId, src: &IterRegistry) {
        let moved = std::mem::take(&mut *src.cursors.lock());
        if moved.is_empty() {
            return;
        }
        for state in &moved {
            state.lock().owner = Some(dest);
        }
        let mut cursors = self.cursors.lock();
        if cursors.is_empty() {
            *cursors = moved;
        } else {
            let older = std::mem::replace(&mut *cursors, moved);
            cursors.extend(older);
        }
    }

    /// Fixes cursors up after the element at `removed` was deleted.
    pub(crate) fn on_remove(&self, removed: usize) {
        for state in self.cursors.lock().iter() {
            let mut state = state.lock();
            state.pos = match state.pos {
                Some(p) if p == removed => None,
                Some(p) if p > removed => Some(p - 1),
                other => other,
            };
        }
    }

    /// Fixes cursors up after an element was inserted at the front.
    pub(crate) fn on_prepend(&self) {
        for state in self.cursors.lock().iter() {
            let mut state = state.lock();
            state.pos = state.pos.map(|p| p + 1);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cursors.lock().len()
    }
}

impl Debug for IterRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterRegistry")
            .field("len", &self.len())
            .finish()
    }
}
