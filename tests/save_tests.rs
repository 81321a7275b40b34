//! Save semantics through the session controller, on a real filesystem

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;

use overdub::application::ports::{
    Capability, CaptureDevice, CaptureError, NotificationError, NotificationIcon, Notifier,
    PermissionGate, PermissionState, PickerError, PlaybackError, SourcePicker, SourcePlayer,
};
use overdub::application::{RecordingSession, SessionConfig, SessionError};
use overdub::domain::session::SessionPhase;

struct StubPlayer;

#[async_trait]
impl SourcePlayer for StubPlayer {
    async fn prepare(&self, _source: &Path) -> Result<(), PlaybackError> {
        Ok(())
    }

    async fn start(&self) -> Result<(), PlaybackError> {
        Ok(())
    }

    async fn stop(&self) {}
}

/// Capture fake that writes real bytes so renames can be observed on disk
struct FileCapture {
    capturing: AtomicBool,
    payload: &'static [u8],
}

impl FileCapture {
    fn new() -> Self {
        Self {
            capturing: AtomicBool::new(false),
            payload: b"RIFF-fake-take",
        }
    }
}

#[async_trait]
impl CaptureDevice for FileCapture {
    async fn start(&self, output: &Path) -> Result<(), CaptureError> {
        if self.capturing.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::DeviceBusy("already capturing".to_string()));
        }
        std::fs::write(output, self.payload)
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> u64 {
        0
    }
}

struct StubPicker {
    path: StdMutex<Option<PathBuf>>,
}

#[async_trait]
impl SourcePicker for StubPicker {
    async fn pick(&self) -> Result<Option<PathBuf>, PickerError> {
        Ok(self.path.lock().unwrap().clone())
    }
}

struct AllowAll;

#[async_trait]
impl PermissionGate for AllowAll {
    async fn query(&self, _capability: Capability) -> PermissionState {
        PermissionState::Granted
    }
}

struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn notify(
        &self,
        _title: &str,
        _message: &str,
        _icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}

fn controller(
    dir: &Path,
) -> RecordingSession<StubPlayer, FileCapture, StubPicker, AllowAll, SilentNotifier> {
    let source = dir.join("backing.wav");
    std::fs::write(&source, b"RIFF-fake-source").unwrap();

    RecordingSession::new(
        StubPlayer,
        FileCapture::new(),
        StubPicker {
            path: StdMutex::new(Some(source)),
        },
        AllowAll,
        SilentNotifier,
        SessionConfig {
            output_dir: dir.to_path_buf(),
            require_storage_permission: false,
            enable_notify: false,
        },
    )
}

async fn record_one_take(
    session: &RecordingSession<StubPlayer, FileCapture, StubPicker, AllowAll, SilentNotifier>,
) -> PathBuf {
    session.select_source().await.unwrap();
    session.start().await.unwrap();
    session.stop().await.unwrap().unwrap()
}

#[tokio::test]
async fn save_moves_the_file_rather_than_copying() {
    let dir = tempfile::tempdir().unwrap();
    let session = controller(dir.path());
    let temp = record_one_take(&session).await;

    let saved = session.save_as("test1").await.unwrap();

    assert_eq!(saved, dir.path().join("test1.wav"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"RIFF-fake-take");
    assert!(!temp.exists(), "temp file must be gone after a rename save");
}

#[tokio::test]
async fn name_is_trimmed_before_joining_the_destination() {
    let dir = tempfile::tempdir().unwrap();
    let session = controller(dir.path());
    record_one_take(&session).await;

    let saved = session.save_as("  chorus  ").await.unwrap();
    assert_eq!(saved, dir.path().join("chorus.wav"));
}

#[tokio::test]
async fn blank_names_never_touch_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let session = controller(dir.path());
    let temp = record_one_take(&session).await;

    for bad in ["", "   ", "\t"] {
        let err = session.save_as(bad).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidName(_)));
        assert!(temp.exists());
        assert_eq!(session.phase().await, SessionPhase::Stopped);
    }
}

#[tokio::test]
async fn rename_failure_leaves_the_take_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("taken.wav"), b"older recording").unwrap();

    let session = controller(dir.path());
    let temp = record_one_take(&session).await;

    let err = session.save_as("taken").await.unwrap_err();
    assert!(matches!(err, SessionError::SaveFailed { .. }));
    assert!(temp.exists());
    assert_eq!(
        std::fs::read(dir.path().join("taken.wav")).unwrap(),
        b"older recording",
        "an existing recording must never be clobbered"
    );

    // The session is still stopped, so a retry under a free name works
    let saved = session.save_as("taken-2").await.unwrap();
    assert!(saved.exists());
}

#[tokio::test]
async fn declining_the_save_keeps_the_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let session = controller(dir.path());
    let temp = record_one_take(&session).await;

    let kept = session.discard().await.unwrap();
    assert_eq!(kept.as_deref(), Some(temp.as_path()));
    assert!(temp.exists());
    assert_eq!(session.phase().await, SessionPhase::Idle);
}

#[tokio::test]
async fn a_new_cycle_abandons_the_previous_temp_without_deleting_it() {
    let dir = tempfile::tempdir().unwrap();
    let session = controller(dir.path());

    let first = record_one_take(&session).await;
    session.discard().await.unwrap();

    let second = record_one_take(&session).await;
    assert_ne!(first, second);
    assert!(first.exists());

    session.save_as("second-take").await.unwrap();
    assert!(first.exists());
    assert!(!second.exists());
}

#[tokio::test]
async fn stop_with_nothing_running_does_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let session = controller(dir.path());

    assert!(session.stop().await.unwrap().is_none());
    assert!(session.stop().await.unwrap().is_none());
}
