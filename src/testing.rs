//! In-memory capture and recorder backends for tests

use crate::capture::{
    CaptureBackend, CaptureError, CaptureRequest, CaptureResult, CaptureStream, WindowInfo,
};
use crate::recorder::media::{
    Chunk, MediaRecorder, RecorderError, RecorderFactory, RecorderOptions, RecorderResult,
    RecorderState,
};
use crate::recorder::MimeType;
use crate::studio::notify::{Notifier, StudioEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

type SharedSink = Arc<Mutex<Option<mpsc::UnboundedSender<Chunk>>>>;

/// Recorder that only produces the chunks a test feeds it
pub struct FakeRecorder {
    mime_type: MimeType,
    state: RecorderState,
    sink: SharedSink,
    calls: Arc<Mutex<Vec<&'static str>>>,
    fail_start: bool,
}

/// Test-side handle to a `FakeRecorder`
#[derive(Clone)]
pub struct RecorderControl {
    sink: SharedSink,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl RecorderControl {
    /// Deliver a data-available chunk
    pub fn emit(&self, chunk: Chunk) {
        if let Some(sink) = self.sink.lock().as_ref() {
            let _ = sink.send(chunk);
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }
}

impl FakeRecorder {
    pub fn new(mime_type: &str) -> (Self, RecorderControl) {
        Self::build(mime_type, false)
    }

    pub fn failing(mime_type: &str) -> (Self, RecorderControl) {
        Self::build(mime_type, true)
    }

    fn build(mime_type: &str, fail_start: bool) -> (Self, RecorderControl) {
        let sink: SharedSink = Arc::new(Mutex::new(None));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorder = Self {
            mime_type: mime_type.parse().expect("valid test MIME type"),
            state: RecorderState::Inactive,
            sink: sink.clone(),
            calls: calls.clone(),
            fail_start,
        };
        (recorder, RecorderControl { sink, calls })
    }
}

#[async_trait]
impl MediaRecorder for FakeRecorder {
    fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    async fn start(&mut self, sink: mpsc::UnboundedSender<Chunk>) -> RecorderResult<()> {
        self.calls.lock().push("start");
        if self.fail_start {
            return Err(RecorderError::Encoder("start refused".to_string()));
        }
        *self.sink.lock() = Some(sink);
        self.state = RecorderState::Recording;
        Ok(())
    }

    async fn pause(&mut self) -> RecorderResult<()> {
        self.calls.lock().push("pause");
        self.state = RecorderState::Paused;
        Ok(())
    }

    async fn resume(&mut self) -> RecorderResult<()> {
        self.calls.lock().push("resume");
        self.state = RecorderState::Recording;
        Ok(())
    }

    async fn stop(&mut self) -> RecorderResult<()> {
        self.calls.lock().push("stop");
        self.sink.lock().take();
        self.state = RecorderState::Inactive;
        Ok(())
    }
}

/// Factory handing out `FakeRecorder`s
#[derive(Default)]
pub struct FakeRecorderFactory {
    supported: Mutex<Vec<MimeType>>,
    fail_start: AtomicBool,
    pub created: Mutex<Vec<RecorderOptions>>,
    pub controls: Mutex<Vec<RecorderControl>>,
}

impl FakeRecorderFactory {
    pub fn supporting(types: &[&str]) -> Self {
        let factory = Self::default();
        *factory.supported.lock() = types
            .iter()
            .map(|t| t.parse().expect("valid test MIME type"))
            .collect();
        factory
    }

    pub fn fail_next_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub fn last_control(&self) -> RecorderControl {
        self.controls.lock().last().cloned().expect("a recorder was created")
    }
}

#[async_trait]
impl RecorderFactory for FakeRecorderFactory {
    async fn is_type_supported(&self, mime_type: &MimeType) -> bool {
        self.supported.lock().contains(mime_type)
    }

    fn create(
        &self,
        _stream: Arc<CaptureStream>,
        options: RecorderOptions,
    ) -> RecorderResult<Box<dyn MediaRecorder>> {
        let mime = options.mime_type.to_string();
        let (recorder, control) = if self.fail_start.swap(false, Ordering::SeqCst) {
            FakeRecorder::failing(&mime)
        } else {
            FakeRecorder::new(&mime)
        };
        self.created.lock().push(options);
        self.controls.lock().push(control);
        Ok(Box::new(recorder))
    }
}

/// Capture backend that grants or denies every request
#[derive(Default)]
pub struct FakeCapture {
    deny: AtomicBool,
    pub requests: Mutex<Vec<CaptureRequest>>,
}

impl FakeCapture {
    pub fn deny(&self) {
        self.deny.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaptureBackend for FakeCapture {
    async fn acquire(&self, request: &CaptureRequest) -> CaptureResult<CaptureStream> {
        self.requests.lock().push(request.clone());
        if self.deny.load(Ordering::SeqCst) {
            return Err(CaptureError::PermissionDenied);
        }
        Ok(CaptureStream::new(
            request.kind,
            request.kind.display_name(),
            Vec::new(),
            request.constraints.audio.enabled,
            request.constraints.clone(),
        ))
    }

    fn list_windows(&self) -> Vec<WindowInfo> {
        vec![WindowInfo {
            id: 1,
            title: "Editor".to_string(),
        }]
    }

    fn has_permission(&self) -> bool {
        !self.deny.load(Ordering::SeqCst)
    }

    fn request_permission(&self) -> bool {
        self.has_permission()
    }
}

/// Notifier that records every event
#[derive(Default)]
pub struct CollectingNotifier {
    pub events: Mutex<Vec<StudioEvent>>,
}

impl CollectingNotifier {
    /// Titles of the toasts shown so far
    pub fn toast_titles(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                StudioEvent::Toast(toast) => Some(toast.title.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn emit(&self, event: StudioEvent) {
        self.events.lock().push(event);
    }
}
