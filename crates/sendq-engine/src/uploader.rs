//! Sequential upload orchestration
//!
//! The [`Uploader`] owns a [`Queue`] and a [`TransferClient`] and processes ready items
//! one at a time, in queue order:
//!
//! 1. `on_before_item`, then the item becomes `Uploading`.
//! 2. A missing local source fails the item without touching the connection.
//! 3. Directories create the parent of their server path and complete.
//! 4. Files make sure their remote directory exists, apply the [`Behavior`] policy and
//!    upload while a poll timer samples the byte count.
//! 5. The item ends `Complete` or `Error` and the loop moves on.
//!
//! When no ready item remains the client is disconnected, the sampler is reset and
//! `on_finished` runs. A failing item never stops the batch.

use crate::hooks::{Progress, UploadHooks};
use crate::item::WorkItem;
use crate::policy::{self, TransferPlan};
use crate::queue::{Queue, QueueEvent};
use crate::speed::{SpeedMeter, DEFAULT_SPEED_WINDOW};
use sendq_client::{path, TransferClient, TransferSource};
use sendq_config::Config;
use sendq_types::{
    Behavior, ConnectionEvent, Credentials, Error, FileDescriptor, ItemId, ItemStatus, Result,
    TransferStatus,
};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default progress polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Uploader configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Server credentials
    pub credentials: Credentials,
    /// Collision policy, fixed for the uploader's lifetime
    pub behavior: Behavior,
    /// Progress polling interval
    pub poll_interval: Duration,
    /// Number of speed samples averaged
    pub speed_window: usize,
}

impl UploaderConfig {
    /// Create a configuration with the default polling settings
    pub fn new(credentials: Credentials, behavior: Behavior) -> Self {
        Self {
            credentials,
            behavior,
            poll_interval: DEFAULT_POLL_INTERVAL,
            speed_window: DEFAULT_SPEED_WINDOW,
        }
    }

    /// Derive the uploader settings from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            credentials: config.credentials(),
            behavior: config.transfer.behavior,
            poll_interval: config.transfer.poll_interval(),
            speed_window: config.transfer.speed_window,
        }
    }

    /// Set the polling interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the speed window
    pub fn with_speed_window(mut self, speed_window: usize) -> Self {
        self.speed_window = speed_window;
        self
    }
}

/// Handle for submitting batches to an uploader from other tasks
///
/// Batches sent while a batch is running join it; batches sent while idle are started
/// by [`Uploader::serve`].
#[derive(Debug, Clone)]
pub struct Submitter {
    tx: UnboundedSender<Vec<FileDescriptor>>,
}

impl Submitter {
    /// Queue a batch; empty batches are ignored
    pub fn submit(&self, items: Vec<FileDescriptor>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.tx
            .send(items)
            .map_err(|_| Error::other("Uploader is no longer accepting items"))
    }
}

#[derive(Debug)]
struct Scheduler {
    is_uploading: bool,
    is_finished: bool,
    current_item_id: Option<ItemId>,
    meter: SpeedMeter,
}

/// Sequential upload orchestrator
pub struct Uploader<C, H = ()> {
    config: UploaderConfig,
    client: C,
    hooks: H,
    queue: Queue,
    scheduler: Scheduler,
    events: Option<UnboundedReceiver<ConnectionEvent>>,
    inbox: Option<UnboundedReceiver<Vec<FileDescriptor>>>,
    inbox_handle: Option<WeakUnboundedSender<Vec<FileDescriptor>>>,
    last_connection_error: Option<String>,
}

impl<C: TransferClient, H: UploadHooks> Uploader<C, H> {
    /// Create an idle uploader
    pub fn new(config: UploaderConfig, mut client: C, hooks: H) -> Self {
        let events = client.take_events();
        let meter = SpeedMeter::new(config.speed_window);

        Self {
            config,
            client,
            hooks,
            queue: Queue::new(),
            scheduler: Scheduler {
                is_uploading: false,
                is_finished: false,
                current_item_id: None,
                meter,
            },
            events,
            inbox: None,
            inbox_handle: None,
            last_connection_error: None,
        }
    }

    /// Enqueue `items` and run them, returning once no ready item remains
    ///
    /// An empty list changes nothing and fires no notification. Item failures are
    /// recorded on the items and reported through the hooks.
    pub async fn submit(&mut self, items: Vec<FileDescriptor>) {
        if items.is_empty() {
            return;
        }

        self.queue.bulk_add_items(items);

        if !self.scheduler.is_uploading {
            self.scheduler.is_uploading = true;
            self.scheduler.is_finished = false;
            info!("Starting upload of {} queued items", self.queue.size());
            self.advance().await;
        }
    }

    /// Handle for submitting batches from other tasks
    pub fn submitter(&mut self) -> Submitter {
        if let Some(tx) = self
            .inbox_handle
            .as_ref()
            .and_then(WeakUnboundedSender::upgrade)
        {
            return Submitter { tx };
        }

        // Batches left in a closed inbox still count
        self.drain_inbox();

        let (tx, rx) = mpsc::unbounded_channel();
        self.inbox = Some(rx);
        self.inbox_handle = Some(tx.downgrade());
        Submitter { tx }
    }

    /// Run batches received through [`Submitter`]s until every submitter is dropped
    ///
    /// Connection signals are forwarded while idle. Returns immediately when no
    /// submitter was ever created.
    pub async fn serve(&mut self) {
        loop {
            let Some(inbox) = self.inbox.as_mut() else {
                return;
            };

            tokio::select! {
                batch = inbox.recv() => match batch {
                    Some(batch) => self.submit(batch).await,
                    None => {
                        self.inbox = None;
                        self.inbox_handle = None;
                        debug!("All submitters dropped, uploader stops serving");
                        return;
                    }
                },
                event = next_event(&mut self.events) => match event {
                    Some(event) => {
                        Self::dispatch_event(&mut self.hooks, &mut self.last_connection_error, event);
                    }
                    None => self.events = None,
                },
            }
        }
    }

    /// Aggregate status
    pub fn transfer_status(&self) -> TransferStatus {
        Self::status_of(&self.scheduler, &self.queue)
    }

    /// Copies of all queued items in order
    pub fn items(&self) -> Vec<WorkItem> {
        self.queue.get_items()
    }

    /// Copy of one item
    pub fn item(&self, id: ItemId) -> Option<WorkItem> {
        self.queue.get_item_by_id(id)
    }

    /// Remove an item from the queue
    pub fn remove_item(&mut self, id: ItemId) -> Option<WorkItem> {
        self.queue.remove_item_by_id(id)
    }

    /// Remove every item from the queue
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Register a queue listener
    pub fn subscribe_queue<F>(&mut self, listener: F)
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        self.queue.subscribe(listener);
    }

    /// Id of the item being processed
    pub fn current_item_id(&self) -> Option<ItemId> {
        self.scheduler.current_item_id
    }

    /// Speed estimator state
    pub fn speed_meter(&self) -> &SpeedMeter {
        &self.scheduler.meter
    }

    /// Message of the last connection error reported by the client
    pub fn last_connection_error(&self) -> Option<&str> {
        self.last_connection_error.as_deref()
    }

    /// Uploader configuration
    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Transfer client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Lifecycle hooks
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable lifecycle hooks
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    async fn advance(&mut self) {
        loop {
            self.drain_inbox();
            self.drain_connection_events();

            match self.queue.next_ready_item() {
                Some(item) => self.process_item(item).await,
                None => break,
            }
        }

        self.finish_batch().await;
    }

    async fn process_item(&mut self, item: WorkItem) {
        self.hooks.on_before_item(&item);
        self.queue.set_status(item.id, ItemStatus::Uploading, None);
        self.scheduler.current_item_id = Some(item.id);
        debug!(
            "Processing {} -> {}",
            item.local_path.display(),
            item.server_path
        );

        let outcome = if item.is_directory {
            self.create_directory(&item).await
        } else {
            self.upload_file(&item).await
        };

        match outcome {
            Ok(()) => self.complete_item(&item),
            Err(error) => self.fail_item(&item, &error),
        }
    }

    async fn create_directory(&mut self, item: &WorkItem) -> Result<()> {
        check_source(item).await?;
        self.ensure_connected().await?;

        let directory = path::parent(&item.server_path);
        debug!("Creating remote directory {}", directory);
        self.client.mkdir_recursive(&directory).await
    }

    async fn upload_file(&mut self, item: &WorkItem) -> Result<()> {
        check_source(item).await?;
        self.ensure_connected().await?;

        let directory = path::parent(&item.server_path);
        self.ensure_remote_dir(&directory).await?;

        let plan = self.plan(item).await?;
        debug!("{} plan for {}: {:?}", self.config.behavior, item.server_path, plan);
        if plan != TransferPlan::Satisfied {
            self.transfer(item, plan.offset()).await?;
        }

        // Report the declared size once so progress reaches 100%
        Self::step(
            &mut self.scheduler,
            &mut self.queue,
            &mut self.hooks,
            item,
            item.size,
        );
        Ok(())
    }

    async fn ensure_connected(&mut self) -> Result<()> {
        if !self.client.is_connected() {
            debug!("Connecting to {}", self.config.credentials.endpoint());
            self.client.connect(&self.config.credentials).await?;
        }
        Ok(())
    }

    async fn ensure_remote_dir(&mut self, directory: &str) -> Result<()> {
        if let Err(error) = self.client.list_dir(directory).await {
            debug!("Listing {} failed ({}), creating it", directory, error);
            self.client.mkdir_recursive(directory).await?;
        }
        Ok(())
    }

    async fn plan(&mut self, item: &WorkItem) -> Result<TransferPlan> {
        let behavior = self.config.behavior;
        if !policy::requires_remote_stat(behavior) {
            return Ok(policy::plan_transfer(behavior, item.size, None));
        }

        let local_size = tokio::fs::metadata(&item.local_path).await?.len();
        let remote = self.client.stat(&item.server_path).await?;
        Ok(policy::plan_transfer(behavior, local_size, remote))
    }

    async fn transfer(&mut self, item: &WorkItem, offset: Option<u64>) -> Result<()> {
        let source = TransferSource::open(&item.local_path, offset).await?;
        let counter = source.counter();
        let period = self.config.poll_interval.max(Duration::from_millis(1));

        let Self {
            client,
            hooks,
            queue,
            scheduler,
            events,
            last_connection_error,
            ..
        } = self;

        let upload = client.upload(source, &item.server_path, offset);
        tokio::pin!(upload);

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                result = &mut upload => return result,
                _ = ticker.tick() => {
                    Self::step(scheduler, queue, hooks, item, counter.get());
                }
                event = next_event(events) => match event {
                    Some(event) => Self::dispatch_event(hooks, last_connection_error, event),
                    None => *events = None,
                },
            }
        }
    }

    fn step(
        scheduler: &mut Scheduler,
        queue: &mut Queue,
        hooks: &mut H,
        item: &WorkItem,
        transferred: u64,
    ) {
        queue.set_transferred(item.id, transferred);

        if scheduler
            .meter
            .sample(&item.local_path, transferred, Instant::now())
            .is_some()
        {
            let progress = Progress {
                transfer_status: Self::status_of(scheduler, queue),
                item: queue.get_item_by_id(item.id),
            };
            hooks.on_progress(&progress);
        }
    }

    fn complete_item(&mut self, item: &WorkItem) {
        self.queue.set_status(item.id, ItemStatus::Complete, None);
        self.queue.set_transferred(item.id, item.size);
        debug!("Completed {}", item.server_path);

        if let Some(refreshed) = self.queue.get_item_by_id(item.id) {
            self.hooks.on_after_item(&refreshed);
        }
    }

    fn fail_item(&mut self, item: &WorkItem, error: &Error) {
        let message = error.to_string();
        warn!("Failed to upload {}: {}", item.local_path.display(), message);
        self.queue
            .set_status(item.id, ItemStatus::Error, Some(message));

        if let Some(refreshed) = self.queue.get_item_by_id(item.id) {
            self.hooks.on_error_item(&refreshed);
        }
    }

    async fn finish_batch(&mut self) {
        self.scheduler.is_uploading = false;
        self.scheduler.is_finished = true;

        if let Err(error) = self.client.disconnect().await {
            warn!("Disconnect failed: {}", error);
        }

        self.scheduler.current_item_id = None;
        self.scheduler.meter.reset();

        let status = self.transfer_status();
        info!(
            "Upload finished: {} complete, {} failed, {} total",
            status.finished_count, status.error_count, status.total
        );
        self.hooks.on_finished(&status);

        self.drain_connection_events();
    }

    fn drain_inbox(&mut self) {
        let mut batches = Vec::new();
        if let Some(inbox) = self.inbox.as_mut() {
            while let Ok(batch) = inbox.try_recv() {
                batches.push(batch);
            }
        }

        for batch in batches.into_iter().filter(|batch| !batch.is_empty()) {
            debug!("Queued {} submitted items", batch.len());
            self.queue.bulk_add_items(batch);
        }
    }

    fn drain_connection_events(&mut self) {
        while let Some(event) = self.events.as_mut().and_then(|rx| rx.try_recv().ok()) {
            Self::dispatch_event(&mut self.hooks, &mut self.last_connection_error, event);
        }
    }

    fn dispatch_event(hooks: &mut H, last_error: &mut Option<String>, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Error(message) => {
                warn!("Connection error: {}", message);
                hooks.on_connection_error(&message);
                *last_error = Some(message);
            }
            ConnectionEvent::End => {
                warn!("Connection ended by server");
                hooks.on_connection_end();
            }
            ConnectionEvent::Close => {
                debug!("Connection closed");
                hooks.on_connection_close();
            }
        }
    }

    fn status_of(scheduler: &Scheduler, queue: &Queue) -> TransferStatus {
        let count = queue.status_count();
        TransferStatus {
            is_uploading: scheduler.is_uploading,
            is_finished: scheduler.is_finished,
            speed_average: scheduler.meter.average(),
            total: queue.size(),
            finished_count: count.finished,
            error_count: count.error,
        }
    }
}

impl<C, H> std::fmt::Debug for Uploader<C, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("config", &self.config)
            .field("queue", &self.queue)
            .field("scheduler", &self.scheduler)
            .field("last_connection_error", &self.last_connection_error)
            .finish_non_exhaustive()
    }
}

async fn check_source(item: &WorkItem) -> Result<()> {
    match tokio::fs::try_exists(&item.local_path).await {
        Ok(true) => Ok(()),
        _ => Err(Error::source_not_found(&item.local_path)),
    }
}

async fn next_event(
    events: &mut Option<UnboundedReceiver<ConnectionEvent>>,
) -> Option<ConnectionEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
