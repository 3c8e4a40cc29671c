//! Ordered upload queue
//!
//! The queue owns its [`WorkItem`]s. Insertion order is the scheduling order, reads
//! return copies, and every mutation goes through a named operation. Lookups by an
//! unknown id are silent no-ops.

use crate::item::WorkItem;
use sendq_types::{FileDescriptor, ItemId, ItemStatus, StatusCount};
use std::fmt;

/// Notification emitted by a [`Queue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// One item was added from this descriptor
    ItemAdded(FileDescriptor),
    /// A batch of items was added
    BulkItemsAdded(Vec<WorkItem>),
    /// A removal was requested; `removed` tells whether an item matched
    ItemRemoved {
        /// Requested id
        id: ItemId,
        /// Whether an item was removed
        removed: bool,
    },
    /// The queue was emptied
    QueueCleared,
}

type Listener = Box<dyn Fn(&QueueEvent) + Send + Sync>;

/// Ordered collection of work items
#[derive(Default)]
pub struct Queue {
    items: Vec<WorkItem>,
    listeners: Vec<Listener>,
}

impl Queue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; listeners run synchronously in registration order
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Number of items held, whatever their status
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count of complete and failed items
    pub fn status_count(&self) -> StatusCount {
        self.items
            .iter()
            .fold(StatusCount::default(), |mut count, item| {
                match item.status {
                    ItemStatus::Complete => count.finished += 1,
                    ItemStatus::Error => count.error += 1,
                    ItemStatus::Ready | ItemStatus::Uploading => {}
                }
                count
            })
    }

    /// Append one ready item and return the new queue size
    pub fn add_item(&mut self, descriptor: FileDescriptor) -> usize {
        self.items.push(WorkItem::new(descriptor.clone()));
        self.emit(&QueueEvent::ItemAdded(descriptor));
        self.size()
    }

    /// Append a batch of ready items with a single notification
    pub fn bulk_add_items(&mut self, descriptors: Vec<FileDescriptor>) -> Vec<WorkItem> {
        let created: Vec<WorkItem> = descriptors.into_iter().map(WorkItem::new).collect();
        self.items.extend(created.iter().cloned());
        self.emit(&QueueEvent::BulkItemsAdded(created.clone()));
        created
    }

    /// Copy of the item with `id`
    pub fn get_item_by_id(&self, id: ItemId) -> Option<WorkItem> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    /// Copies of all items in queue order
    pub fn get_items(&self) -> Vec<WorkItem> {
        self.items.clone()
    }

    /// Remove the first item with `id`
    ///
    /// `ItemRemoved` is emitted even when no item matched.
    pub fn remove_item_by_id(&mut self, id: ItemId) -> Option<WorkItem> {
        let removed = self
            .items
            .iter()
            .position(|item| item.id == id)
            .map(|position| self.items.remove(position));

        self.emit(&QueueEvent::ItemRemoved {
            id,
            removed: removed.is_some(),
        });
        removed
    }

    /// Set the status of an item; the error message is replaced, or cleared when `None`
    pub fn set_status(&mut self, id: ItemId, status: ItemStatus, error: Option<String>) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.status = status;
            item.error = error;
        }
    }

    /// Set transferred bytes on every item with `id`
    pub fn set_transferred(&mut self, id: ItemId, transferred: u64) {
        for item in self.items.iter_mut().filter(|item| item.id == id) {
            item.transferred = transferred;
        }
    }

    /// Copy of the first ready item in queue order
    pub fn next_ready_item(&self) -> Option<WorkItem> {
        self.items
            .iter()
            .find(|item| item.status == ItemStatus::Ready)
            .cloned()
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.items.clear();
        self.emit(&QueueEvent::QueueCleared);
    }

    fn emit(&self, event: &QueueEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("items", &self.items)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
