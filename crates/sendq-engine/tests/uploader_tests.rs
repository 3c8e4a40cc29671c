//! Integration tests for the uploader
//!
//! These tests drive a real [`Uploader`] against an in-memory client that records every
//! call, with tokio time paused so polling is deterministic.

use async_trait::async_trait;
use sendq_client::{TransferClient, TransferSource};
use sendq_engine::{Progress, QueueEvent, Submitter, UploadHooks, Uploader, UploaderConfig, WorkItem};
use sendq_types::{
    Behavior, ConnectionEvent, Credentials, Error, FileDescriptor, ItemStatus, RemoteEntry,
    RemoteStat, Result, TransferStatus,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Connect,
    Disconnect,
    Upload { path: String, offset: Option<u64> },
    Stat(String),
    ListDir(String),
    Mkdir(String),
}

/// Transfer client keeping the remote side in memory
struct MockClient {
    connected: bool,
    calls: Vec<Call>,
    remote_files: HashMap<String, u64>,
    remote_dirs: HashSet<String>,
    failing_uploads: HashSet<String>,
    failing_mkdirs: HashSet<String>,
    refuse_connect: bool,
    chunk_size: usize,
    chunk_delay: Duration,
    events_on_upload: Vec<ConnectionEvent>,
    events_tx: UnboundedSender<ConnectionEvent>,
    events_rx: Option<UnboundedReceiver<ConnectionEvent>>,
}

impl MockClient {
    fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            connected: false,
            calls: Vec::new(),
            remote_files: HashMap::new(),
            remote_dirs: HashSet::from(["/".to_string(), "/upload".to_string()]),
            failing_uploads: HashSet::new(),
            failing_mkdirs: HashSet::new(),
            refuse_connect: false,
            chunk_size: 64 * 1024,
            chunk_delay: Duration::ZERO,
            events_on_upload: Vec::new(),
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    fn with_remote_file(mut self, path: &str, size: u64) -> Self {
        self.remote_files.insert(path.to_string(), size);
        self
    }

    fn without_remote_dirs(mut self) -> Self {
        self.remote_dirs.clear();
        self
    }

    fn failing_upload(mut self, path: &str) -> Self {
        self.failing_uploads.insert(path.to_string());
        self
    }

    fn failing_mkdir(mut self, path: &str) -> Self {
        self.failing_mkdirs.insert(path.to_string());
        self
    }

    fn refusing_connections(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    fn throttled(mut self, chunk_size: usize, chunk_delay: Duration) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_delay = chunk_delay;
        self
    }

    fn emitting_on_upload(mut self, event: ConnectionEvent) -> Self {
        self.events_on_upload.push(event);
        self
    }

    fn uploads(&self) -> Vec<(String, Option<u64>)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Upload { path, offset } => Some((path.clone(), *offset)),
                _ => None,
            })
            .collect()
    }

    fn count(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| matcher(call)).count()
    }
}

#[async_trait]
impl TransferClient for MockClient {
    async fn connect(&mut self, _credentials: &Credentials) -> Result<()> {
        if self.connected {
            return Ok(());
        }
        self.calls.push(Call::Connect);
        if self.refuse_connect {
            return Err(Error::connection("connection refused"));
        }
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.connected {
            self.calls.push(Call::Disconnect);
            self.connected = false;
            let _ = self.events_tx.send(ConnectionEvent::Close);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn upload(
        &mut self,
        mut source: TransferSource,
        remote_path: &str,
        resume_offset: Option<u64>,
    ) -> Result<()> {
        self.calls.push(Call::Upload {
            path: remote_path.to_string(),
            offset: resume_offset,
        });
        for event in self.events_on_upload.drain(..) {
            let _ = self.events_tx.send(event);
        }

        let mut written = resume_offset.unwrap_or(0);
        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            let read = source.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            written += read as u64;
            if self.failing_uploads.contains(remote_path) {
                return Err(Error::transfer("connection reset by peer"));
            }
            tokio::time::sleep(self.chunk_delay).await;
        }

        self.remote_files.insert(remote_path.to_string(), written);
        Ok(())
    }

    async fn stat(&mut self, remote_path: &str) -> Result<Option<RemoteStat>> {
        self.calls.push(Call::Stat(remote_path.to_string()));
        Ok(self
            .remote_files
            .get(remote_path)
            .map(|size| RemoteStat { size: *size }))
    }

    async fn list_dir(&mut self, remote_path: &str) -> Result<Vec<RemoteEntry>> {
        self.calls.push(Call::ListDir(remote_path.to_string()));
        if self.remote_dirs.contains(remote_path) {
            Ok(Vec::new())
        } else {
            Err(Error::transfer(format!("{}: No such directory", remote_path)))
        }
    }

    async fn mkdir_recursive(&mut self, remote_path: &str) -> Result<()> {
        self.calls.push(Call::Mkdir(remote_path.to_string()));
        if self.failing_mkdirs.contains(remote_path) {
            return Err(Error::directory_create(remote_path, "permission denied"));
        }

        let mut current = String::new();
        for part in remote_path.split('/').filter(|part| !part.is_empty()) {
            current.push('/');
            current.push_str(part);
            self.remote_dirs.insert(current.clone());
        }
        Ok(())
    }

    fn take_events(&mut self) -> Option<UnboundedReceiver<ConnectionEvent>> {
        self.events_rx.take()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum HookEvent {
    Before(String),
    After(String),
    Failed(String, String),
    ConnectionError(String),
    ConnectionEnd,
    ConnectionClose,
    Finished(TransferStatus),
}

#[derive(Default)]
struct RecordingHooks {
    events: Vec<HookEvent>,
    progress: Vec<Progress>,
    submit_on_first_item: Option<(Submitter, Vec<FileDescriptor>)>,
}

impl RecordingHooks {
    fn finished(&self) -> Vec<&TransferStatus> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HookEvent::Finished(status) => Some(status),
                _ => None,
            })
            .collect()
    }
}

impl UploadHooks for RecordingHooks {
    fn on_before_item(&mut self, item: &WorkItem) {
        assert_eq!(item.status, ItemStatus::Ready);
        self.events.push(HookEvent::Before(item.name.clone()));
        if let Some((submitter, batch)) = self.submit_on_first_item.take() {
            submitter.submit(batch).unwrap();
        }
    }

    fn on_after_item(&mut self, item: &WorkItem) {
        assert_eq!(item.status, ItemStatus::Complete);
        assert_eq!(item.transferred, item.size);
        self.events.push(HookEvent::After(item.name.clone()));
    }

    fn on_error_item(&mut self, item: &WorkItem) {
        assert_eq!(item.status, ItemStatus::Error);
        self.events.push(HookEvent::Failed(
            item.name.clone(),
            item.error.clone().unwrap_or_default(),
        ));
    }

    fn on_connection_error(&mut self, message: &str) {
        self.events
            .push(HookEvent::ConnectionError(message.to_string()));
    }

    fn on_connection_end(&mut self) {
        self.events.push(HookEvent::ConnectionEnd);
    }

    fn on_connection_close(&mut self) {
        self.events.push(HookEvent::ConnectionClose);
    }

    fn on_finished(&mut self, status: &TransferStatus) {
        self.events.push(HookEvent::Finished(*status));
    }

    fn on_progress(&mut self, progress: &Progress) {
        self.progress.push(progress.clone());
    }
}

/// Local source files for a test
struct Sources {
    dir: TempDir,
}

impl Sources {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn file(&self, name: &str, size: usize) -> FileDescriptor {
        let path = self.dir.path().join(name);
        fs::write(&path, vec![b'x'; size]).unwrap();
        FileDescriptor::file(path, format!("/upload/{}", name), size as u64)
    }

    fn missing(&self, name: &str, size: u64) -> FileDescriptor {
        FileDescriptor::file(
            self.dir.path().join(name),
            format!("/upload/{}", name),
            size,
        )
    }

    fn directory(&self, name: &str) -> FileDescriptor {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path).unwrap();
        FileDescriptor::directory(path, format!("/upload/{}/.", name))
    }
}

fn uploader(behavior: Behavior, client: MockClient) -> Uploader<MockClient, RecordingHooks> {
    let config = UploaderConfig::new(
        Credentials::new("ftp.example.com", 21, "tester", "secret"),
        behavior,
    );
    Uploader::new(config, client, RecordingHooks::default())
}

fn assert_sequential(events: &[HookEvent]) {
    let mut active: Option<&str> = None;
    for event in events {
        match event {
            HookEvent::Before(name) => {
                assert!(active.is_none(), "{} started while {:?} was active", name, active);
                active = Some(name.as_str());
            }
            HookEvent::After(name) | HookEvent::Failed(name, _) => {
                assert_eq!(active, Some(name.as_str()));
                active = None;
            }
            _ => {}
        }
    }
    assert!(active.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_cover_uploads_all_items_in_order() {
    let sources = Sources::new();
    let client = MockClient::new().with_remote_file("/upload/a.bin", 100);
    let mut uploader = uploader(Behavior::Cover, client);

    uploader
        .submit(vec![sources.file("a.bin", 100), sources.file("b.bin", 50)])
        .await;

    let status = uploader.transfer_status();
    assert_eq!(status.finished_count, 2);
    assert_eq!(status.error_count, 0);
    assert_eq!(status.total, 2);
    assert!(status.is_finished);
    assert!(!status.is_uploading);

    assert_eq!(
        uploader.client().uploads(),
        vec![
            ("/upload/a.bin".to_string(), None),
            ("/upload/b.bin".to_string(), None),
        ]
    );
    assert_eq!(uploader.client().count(|c| matches!(c, Call::Stat(_))), 0);
    assert_eq!(uploader.client().remote_files["/upload/b.bin"], 50);

    let events = &uploader.hooks().events;
    assert_eq!(
        events[..5],
        [
            HookEvent::Before("a.bin".to_string()),
            HookEvent::After("a.bin".to_string()),
            HookEvent::Before("b.bin".to_string()),
            HookEvent::After("b.bin".to_string()),
            HookEvent::Finished(status),
        ]
    );
    assert_sequential(events);

    for item in uploader.items() {
        assert_eq!(item.status, ItemStatus::Complete);
        assert_eq!(item.transferred, item.size);
        assert!(item.error.is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn test_verify_skips_transfer_when_remote_is_complete() {
    let sources = Sources::new();
    let client = MockClient::new().with_remote_file("/upload/a.bin", 100);
    let mut uploader = uploader(Behavior::Verify, client);

    uploader.submit(vec![sources.file("a.bin", 100)]).await;

    assert!(uploader.client().uploads().is_empty());
    assert_eq!(
        uploader.client().count(|c| *c == Call::Stat("/upload/a.bin".to_string())),
        1
    );
    let item = &uploader.items()[0];
    assert_eq!(item.status, ItemStatus::Complete);
    assert_eq!(item.transferred, 100);
}

#[tokio::test(start_paused = true)]
async fn test_verify_treats_larger_remote_as_complete() {
    let sources = Sources::new();
    let client = MockClient::new().with_remote_file("/upload/a.bin", 500);
    let mut uploader = uploader(Behavior::Verify, client);

    uploader.submit(vec![sources.file("a.bin", 100)]).await;

    assert!(uploader.client().uploads().is_empty());
    assert_eq!(uploader.transfer_status().finished_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_verify_resumes_partial_remote() {
    let sources = Sources::new();
    let client = MockClient::new().with_remote_file("/upload/a.bin", 40);
    let mut uploader = uploader(Behavior::Verify, client);

    uploader.submit(vec![sources.file("a.bin", 100)]).await;

    assert_eq!(
        uploader.client().uploads(),
        vec![("/upload/a.bin".to_string(), Some(40))]
    );
    assert_eq!(uploader.client().remote_files["/upload/a.bin"], 100);
    let item = &uploader.items()[0];
    assert_eq!(item.status, ItemStatus::Complete);
    assert_eq!(item.transferred, 100);
}

#[tokio::test(start_paused = true)]
async fn test_resumed_progress_counts_from_offset() {
    let sources = Sources::new();
    let client = MockClient::new()
        .with_remote_file("/upload/a.bin", 40)
        .throttled(40, Duration::from_millis(350));
    let mut uploader = uploader(Behavior::Verify, client);

    uploader.submit(vec![sources.file("a.bin", 400)]).await;

    assert_eq!(
        uploader.client().uploads(),
        vec![("/upload/a.bin".to_string(), Some(40))]
    );

    let transferred: Vec<u64> = uploader
        .hooks()
        .progress
        .iter()
        .map(|p| p.item.as_ref().unwrap().transferred)
        .collect();
    assert!(transferred.len() >= 2, "only {} progress samples", transferred.len());
    assert!(transferred.iter().all(|bytes| *bytes >= 40));
    assert!(transferred.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(*transferred.last().unwrap(), 400);
}

#[tokio::test(start_paused = true)]
async fn test_verify_uploads_absent_remote_in_full() {
    let sources = Sources::new();
    let mut uploader = uploader(Behavior::Verify, MockClient::new());

    uploader.submit(vec![sources.file("a.bin", 100)]).await;

    assert_eq!(
        uploader.client().uploads(),
        vec![("/upload/a.bin".to_string(), None)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_missing_source_fails_and_batch_continues() {
    let sources = Sources::new();
    let missing = sources.missing("gone.bin", 10);
    let missing_path = missing.local_path.clone();
    let mut uploader = uploader(Behavior::Cover, MockClient::new());

    uploader
        .submit(vec![missing, sources.file("b.bin", 50)])
        .await;

    let items = uploader.items();
    assert_eq!(items[0].status, ItemStatus::Error);
    assert_eq!(
        items[0].error.as_deref(),
        Some(format!("{} not found", missing_path.display()).as_str())
    );
    assert_eq!(items[1].status, ItemStatus::Complete);

    // the connection is only opened for the second item
    let calls = &uploader.client().calls;
    assert_eq!(calls[0], Call::Connect);
    assert_eq!(
        uploader.client().uploads(),
        vec![("/upload/b.bin".to_string(), None)]
    );

    let status = uploader.transfer_status();
    assert_eq!((status.finished_count, status.error_count), (1, 1));
    assert!(matches!(
        &uploader.hooks().events[1],
        HookEvent::Failed(name, message) if name == "gone.bin" && message.ends_with("not found")
    ));
}

#[tokio::test(start_paused = true)]
async fn test_skip_never_stats_or_uploads() {
    let sources = Sources::new();
    let mut uploader = uploader(Behavior::Skip, MockClient::new());

    uploader
        .submit(vec![sources.file("a.bin", 100), sources.file("b.bin", 10)])
        .await;

    let client = uploader.client();
    assert!(client.uploads().is_empty());
    assert_eq!(client.count(|c| matches!(c, Call::Stat(_))), 0);
    assert_eq!(uploader.transfer_status().finished_count, 2);
    for item in uploader.items() {
        assert_eq!(item.status, ItemStatus::Complete);
        assert_eq!(item.transferred, item.size);
    }
}

#[tokio::test(start_paused = true)]
async fn test_upload_failure_does_not_stop_batch() {
    let sources = Sources::new();
    let client = MockClient::new()
        .throttled(10, Duration::from_millis(100))
        .failing_upload("/upload/a.bin");
    let mut uploader = uploader(Behavior::Cover, client);

    uploader
        .submit(vec![sources.file("a.bin", 100), sources.file("b.bin", 20)])
        .await;

    let items = uploader.items();
    assert_eq!(items[0].status, ItemStatus::Error);
    assert!(items[0]
        .error
        .as_deref()
        .unwrap()
        .contains("connection reset by peer"));
    assert_eq!(items[1].status, ItemStatus::Complete);
    assert_eq!(uploader.client().uploads().len(), 2);
    assert_sequential(&uploader.hooks().events);
}

#[tokio::test(start_paused = true)]
async fn test_connection_refused_fails_items() {
    let sources = Sources::new();
    let client = MockClient::new().refusing_connections();
    let mut uploader = uploader(Behavior::Cover, client);

    uploader
        .submit(vec![sources.file("a.bin", 10), sources.file("b.bin", 10)])
        .await;

    let status = uploader.transfer_status();
    assert_eq!(status.error_count, 2);
    assert!(status.is_finished);
    assert!(uploader.items()[0]
        .error
        .as_deref()
        .unwrap()
        .contains("connection refused"));
    assert!(uploader.client().uploads().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_directory_items_create_parent_of_server_path() {
    let sources = Sources::new();
    let mut uploader = uploader(Behavior::Verify, MockClient::new());

    uploader
        .submit(vec![sources.directory("photos"), sources.file("a.bin", 5)])
        .await;

    let client = uploader.client();
    assert!(client
        .calls
        .contains(&Call::Mkdir("/upload/photos".to_string())));
    assert!(client.remote_dirs.contains("/upload/photos"));
    assert_eq!(client.uploads().len(), 1);

    let items = uploader.items();
    assert_eq!(items[0].status, ItemStatus::Complete);
    assert_eq!(items[0].transferred, 0);
    assert!(uploader
        .hooks()
        .progress
        .iter()
        .all(|p| p.item.as_ref().map(|i| i.name.as_str()) != Some("photos")));
}

#[tokio::test(start_paused = true)]
async fn test_directory_with_trailing_separator_creates_its_parent() {
    let sources = Sources::new();
    let photos = sources.directory("photos");
    let item = FileDescriptor::directory(photos.local_path, "/upload/photos/");
    let mut uploader = uploader(Behavior::Verify, MockClient::new());

    uploader.submit(vec![item]).await;

    let client = uploader.client();
    assert!(client.calls.contains(&Call::Mkdir("/upload".to_string())));
    assert!(!client
        .calls
        .contains(&Call::Mkdir("/upload/photos".to_string())));
    assert_eq!(uploader.items()[0].status, ItemStatus::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_directory_failure_records_client_message() {
    let sources = Sources::new();
    let client = MockClient::new().failing_mkdir("/upload/photos");
    let mut uploader = uploader(Behavior::Verify, client);

    uploader
        .submit(vec![sources.directory("photos"), sources.file("a.bin", 5)])
        .await;

    let items = uploader.items();
    assert_eq!(items[0].status, ItemStatus::Error);
    assert!(items[0]
        .error
        .as_deref()
        .unwrap()
        .contains("permission denied"));
    assert_eq!(items[1].status, ItemStatus::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_missing_remote_parent_is_created() {
    let sources = Sources::new();
    let client = MockClient::new().without_remote_dirs();
    let mut uploader = uploader(Behavior::Cover, client);

    uploader
        .submit(vec![sources.file("a.bin", 5), sources.file("b.bin", 5)])
        .await;

    let client = uploader.client();
    assert_eq!(client.count(|c| *c == Call::ListDir("/upload".to_string())), 2);
    // created once, listed successfully afterwards
    assert_eq!(client.count(|c| *c == Call::Mkdir("/upload".to_string())), 1);
    assert_eq!(uploader.transfer_status().finished_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_polled_during_transfer() {
    let sources = Sources::new();
    let client = MockClient::new().throttled(100, Duration::from_millis(350));
    let mut uploader = uploader(Behavior::Cover, client);

    uploader.submit(vec![sources.file("a.bin", 800)]).await;

    let progress = &uploader.hooks().progress;
    assert!(progress.len() >= 2, "only {} progress samples", progress.len());

    let transferred: Vec<u64> = progress
        .iter()
        .map(|p| p.item.as_ref().unwrap().transferred)
        .collect();
    assert!(transferred.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(*transferred.last().unwrap(), 800);

    assert!(progress.iter().all(|p| p.transfer_status.is_uploading));
    assert!(progress.iter().any(|p| p.transfer_status.speed_average > 0));
    assert!(progress
        .iter()
        .all(|p| p.item.as_ref().unwrap().status == ItemStatus::Uploading));
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_state_resets_after_batch() {
    let sources = Sources::new();
    let client = MockClient::new().throttled(100, Duration::from_millis(350));
    let mut uploader = uploader(Behavior::Cover, client);

    uploader.submit(vec![sources.file("a.bin", 400)]).await;

    assert!(uploader.current_item_id().is_none());
    assert!(uploader.speed_meter().is_idle());
    assert_eq!(uploader.transfer_status().speed_average, 0);
    assert!(!uploader.client().is_connected());
    assert_eq!(uploader.client().calls.last(), Some(&Call::Disconnect));

    let events = &uploader.hooks().events;
    let finished = events
        .iter()
        .position(|e| matches!(e, HookEvent::Finished(_)))
        .unwrap();
    assert_eq!(events[finished + 1], HookEvent::ConnectionClose);
}

#[tokio::test(start_paused = true)]
async fn test_submit_empty_batch_is_noop() {
    let mut uploader = uploader(Behavior::Verify, MockClient::new());

    uploader.submit(Vec::new()).await;

    assert!(uploader.hooks().events.is_empty());
    assert!(uploader.client().calls.is_empty());
    assert_eq!(uploader.transfer_status(), TransferStatus::default());
}

#[tokio::test(start_paused = true)]
async fn test_later_batch_reuses_queue() {
    let sources = Sources::new();
    let mut uploader = uploader(Behavior::Cover, MockClient::new());

    uploader.submit(vec![sources.file("a.bin", 10)]).await;
    uploader.submit(vec![sources.file("b.bin", 10)]).await;

    let status = uploader.transfer_status();
    assert_eq!(status.total, 2);
    assert_eq!(status.finished_count, 2);
    assert_eq!(uploader.hooks().finished().len(), 2);
    assert_eq!(uploader.client().count(|c| *c == Call::Connect), 2);
    // first item is not uploaded again
    assert_eq!(uploader.client().uploads().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_submission_during_batch_joins_it() {
    let sources = Sources::new();
    let mut uploader = uploader(Behavior::Cover, MockClient::new());
    let submitter = uploader.submitter();
    uploader.hooks_mut().submit_on_first_item =
        Some((submitter, vec![sources.file("late.bin", 10)]));

    uploader.submit(vec![sources.file("a.bin", 10)]).await;

    assert_eq!(uploader.hooks().finished().len(), 1);
    let names: Vec<String> = uploader.items().into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["a.bin".to_string(), "late.bin".to_string()]);
    assert_eq!(uploader.transfer_status().finished_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_serve_runs_submitted_batches() {
    let sources = Sources::new();
    let mut uploader = uploader(Behavior::Cover, MockClient::new());
    let submitter = uploader.submitter();

    tokio_test::assert_ok!(submitter.submit(vec![sources.file("a.bin", 10)]));
    tokio_test::assert_ok!(submitter.clone().submit(vec![sources.file("b.bin", 10)]));
    drop(submitter);

    uploader.serve().await;

    assert_eq!(uploader.transfer_status().finished_count, 2);
    assert_eq!(uploader.client().uploads().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_connection_signals_are_forwarded_without_failing_items() {
    let sources = Sources::new();
    let client = MockClient::new()
        .throttled(10, Duration::from_millis(100))
        .emitting_on_upload(ConnectionEvent::Error("control channel timeout".to_string()))
        .emitting_on_upload(ConnectionEvent::End);
    let mut uploader = uploader(Behavior::Cover, client);

    uploader.submit(vec![sources.file("a.bin", 50)]).await;

    let events = &uploader.hooks().events;
    assert!(events.contains(&HookEvent::ConnectionError(
        "control channel timeout".to_string()
    )));
    assert!(events.contains(&HookEvent::ConnectionEnd));
    assert_eq!(
        uploader.last_connection_error(),
        Some("control channel timeout")
    );
    assert_eq!(uploader.items()[0].status, ItemStatus::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_queue_listener_and_maintenance() {
    let sources = Sources::new();
    let mut uploader = uploader(Behavior::Skip, MockClient::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    uploader.subscribe_queue(move |event| sink.lock().unwrap().push(event.clone()));

    uploader
        .submit(vec![sources.file("a.bin", 1), sources.file("b.bin", 1)])
        .await;

    let first = uploader.items()[0].id;
    let removed = uploader.remove_item(first).unwrap();
    assert_eq!(removed.name, "a.bin");
    assert!(uploader.item(first).is_none());
    assert_eq!(uploader.transfer_status().total, 1);

    uploader.clear_queue();
    assert!(uploader.items().is_empty());

    let seen = seen.lock().unwrap();
    assert!(matches!(&seen[0], QueueEvent::BulkItemsAdded(items) if items.len() == 2));
    assert_eq!(
        seen[1],
        QueueEvent::ItemRemoved {
            id: first,
            removed: true
        }
    );
    assert_eq!(seen[2], QueueEvent::QueueCleared);
}
