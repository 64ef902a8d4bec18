use crate::pixel_buffer::PixelBuffer;

/// Default number of drawing-layer states kept for undo
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// A full copy of the drawing layer at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    buffer: PixelBuffer,
}

impl Snapshot {
    pub fn new(buffer: &PixelBuffer) -> Self {
        Self { buffer: buffer.clone() }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
}

/// What the caller should do with the drawing layer after an undo
#[derive(Debug, PartialEq)]
pub enum UndoOutcome<'a> {
    /// Write this snapshot back into the drawing layer
    Restore(&'a Snapshot),
    /// The last remaining state was popped; clear the drawing layer
    Cleared,
    /// History was already empty
    Nothing,
}

/// Bounded undo stack stored in a fixed ring of slots.
///
/// Pushing onto a full ring overwrites the oldest entry, so memory stays at
/// `capacity` snapshots no matter how long the session runs.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    slots: Vec<Option<Snapshot>>,
    /// Slot holding the oldest entry
    head: usize,
    len: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn can_undo(&self) -> bool {
        !self.is_empty()
    }

    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.capacity()
    }

    /// Appends a snapshot, evicting the oldest one when full
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.len == self.capacity() {
            self.slots[self.head] = Some(snapshot);
            self.head = self.slot(1);
            log::debug!("History full, evicted oldest snapshot");
        } else {
            let index = self.slot(self.len);
            self.slots[index] = Some(snapshot);
            self.len += 1;
        }
    }

    /// Most recent snapshot
    pub fn top(&self) -> Option<&Snapshot> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.slot(self.len - 1)].as_ref()
    }

    /// Pops the most recent snapshot and reports what should be shown now
    pub fn undo(&mut self) -> UndoOutcome<'_> {
        match self.len {
            0 => UndoOutcome::Nothing,
            1 => {
                self.clear();
                UndoOutcome::Cleared
            }
            _ => {
                let index = self.slot(self.len - 1);
                self.slots[index] = None;
                self.len -= 1;
                match self.top() {
                    Some(snapshot) => UndoOutcome::Restore(snapshot),
                    None => UndoOutcome::Cleared,
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
    }
}
