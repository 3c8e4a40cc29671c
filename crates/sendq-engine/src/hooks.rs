//! Lifecycle notifications of an uploader

use crate::item::WorkItem;
use sendq_types::TransferStatus;

/// Progress snapshot published while a file is being transferred
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Aggregate status at the time of the sample
    pub transfer_status: TransferStatus,
    /// Refreshed copy of the item being transferred
    pub item: Option<WorkItem>,
}

/// Override points called by the [`Uploader`](crate::Uploader)
///
/// Every method has a no-op default. Hooks run inline on the upload task, so a slow
/// hook delays the whole batch.
#[allow(unused_variables)]
pub trait UploadHooks: Send {
    /// An item is about to be processed
    fn on_before_item(&mut self, item: &WorkItem) {}

    /// An item completed
    fn on_after_item(&mut self, item: &WorkItem) {}

    /// An item failed; its `error` field holds the reason
    fn on_error_item(&mut self, item: &WorkItem) {}

    /// The client reported a connection error
    fn on_connection_error(&mut self, message: &str) {}

    /// The server ended the connection
    fn on_connection_end(&mut self) {}

    /// The connection was closed
    fn on_connection_close(&mut self) {}

    /// No ready items remain
    fn on_finished(&mut self, status: &TransferStatus) {}

    /// A progress sample was taken
    fn on_progress(&mut self, progress: &Progress) {}
}

impl UploadHooks for () {}

impl<H: UploadHooks + ?Sized> UploadHooks for Box<H> {
    fn on_before_item(&mut self, item: &WorkItem) {
        (**self).on_before_item(item);
    }

    fn on_after_item(&mut self, item: &WorkItem) {
        (**self).on_after_item(item);
    }

    fn on_error_item(&mut self, item: &WorkItem) {
        (**self).on_error_item(item);
    }

    fn on_connection_error(&mut self, message: &str) {
        (**self).on_connection_error(message);
    }

    fn on_connection_end(&mut self) {
        (**self).on_connection_end();
    }

    fn on_connection_close(&mut self) {
        (**self).on_connection_close();
    }

    fn on_finished(&mut self, status: &TransferStatus) {
        (**self).on_finished(status);
    }

    fn on_progress(&mut self, progress: &Progress) {
        (**self).on_progress(progress);
    }
}
