//! Rodio playback adapter
//!
//! Plays the selected source file on a dedicated thread; rodio's output
//! stream is not Send, so the thread owns it for the whole playback.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};

use crate::application::ports::{PlaybackError, SourcePlayer};

/// How often the playback thread checks the stop flag
const STOP_POLL: Duration = Duration::from_millis(50);

/// How long `start` waits for the output stream to come up
const STREAM_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Playback of a prepared source file using rodio
pub struct RodioPlayer {
    source: StdMutex<Option<PathBuf>>,
    stop_flag: Arc<AtomicBool>,
    playing: Arc<AtomicBool>,
}

impl RodioPlayer {
    /// Create a player with no source bound
    pub fn new() -> Self {
        Self {
            source: StdMutex::new(None),
            stop_flag: Arc::new(AtomicBool::new(false)),
            playing: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourcePlayer for RodioPlayer {
    async fn prepare(&self, source: &Path) -> Result<(), PlaybackError> {
        let path = source.to_path_buf();

        // Decode the header up front so a bad pick fails at selection time
        tokio::task::spawn_blocking(move || {
            let file = File::open(&path).map_err(|e| {
                PlaybackError::SourceNotReadable(format!("{}: {}", path.display(), e))
            })?;
            Decoder::new(BufReader::new(file))
                .map(|_| ())
                .map_err(|e| PlaybackError::UnsupportedSource(e.to_string()))
        })
        .await
        .map_err(|e| PlaybackError::PlaybackFailed(format!("task join error: {e}")))??;

        *self.source.lock().unwrap() = Some(source.to_path_buf());
        tracing::debug!(source = %source.display(), "playback source prepared");
        Ok(())
    }

    async fn start(&self) -> Result<(), PlaybackError> {
        let Some(path) = self.source.lock().unwrap().clone() else {
            return Err(PlaybackError::PlaybackFailed(
                "no source prepared".to_string(),
            ));
        };
        if self.playing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.stop_flag.store(false, Ordering::SeqCst);

        let stop_flag = Arc::clone(&self.stop_flag);
        let playing = Arc::clone(&self.playing);
        let (ready_tx, ready_rx) = mpsc::channel();

        std::thread::spawn(move || {
            play_source(&path, &stop_flag, &ready_tx);
            playing.store(false, Ordering::SeqCst);
        });

        let ready = tokio::task::spawn_blocking(move || ready_rx.recv_timeout(STREAM_READY_TIMEOUT))
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(format!("task join error: {e}")))?;

        match ready {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.playing.store(false, Ordering::SeqCst);
                Err(e)
            }
            Err(_) => {
                self.stop_flag.store(true, Ordering::SeqCst);
                Err(PlaybackError::PlaybackFailed(
                    "timed out waiting for the output stream".to_string(),
                ))
            }
        }
    }

    async fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

/// Thread body: open the output device, play the file until it ends or the
/// stop flag is raised.
fn play_source(path: &Path, stop_flag: &AtomicBool, ready_tx: &mpsc::Sender<Result<(), PlaybackError>>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(v) => v,
        Err(e) => {
            let _ = ready_tx.send(Err(PlaybackError::NoOutputDevice(e.to_string())));
            return;
        }
    };
    let sink = match Sink::try_new(&handle) {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(PlaybackError::PlaybackFailed(e.to_string())));
            return;
        }
    };
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            let _ = ready_tx.send(Err(PlaybackError::SourceNotReadable(format!(
                "{}: {}",
                path.display(),
                e
            ))));
            return;
        }
    };
    let decoder = match Decoder::new(BufReader::new(file)) {
        Ok(d) => d,
        Err(e) => {
            let _ = ready_tx.send(Err(PlaybackError::UnsupportedSource(e.to_string())));
            return;
        }
    };

    sink.append(decoder);
    let _ = ready_tx.send(Ok(()));
    tracing::info!(source = %path.display(), "playback started");

    while !stop_flag.load(Ordering::SeqCst) && !sink.empty() {
        std::thread::sleep(STOP_POLL);
    }
    sink.stop();
    tracing::debug!("playback finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn tiny_wav(dir: &Path) -> PathBuf {
        let path = dir.join("tiny.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..441 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[tokio::test]
    async fn prepare_accepts_valid_wav() {
        let dir = tempfile::tempdir().unwrap();
        let player = RodioPlayer::new();
        assert!(player.prepare(&tiny_wav(dir.path())).await.is_ok());
    }

    #[tokio::test]
    async fn prepare_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let player = RodioPlayer::new();

        let err = player
            .prepare(&dir.path().join("missing.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybackError::SourceNotReadable(_)));
    }

    #[tokio::test]
    async fn prepare_rejects_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"not actually audio").unwrap();

        let player = RodioPlayer::new();
        let err = player.prepare(&path).await.unwrap_err();
        assert!(matches!(err, PlaybackError::UnsupportedSource(_)));
    }

    #[tokio::test]
    async fn start_without_prepare_fails() {
        let player = RodioPlayer::new();
        let err = player.start().await.unwrap_err();
        assert!(matches!(err, PlaybackError::PlaybackFailed(_)));
    }

    #[tokio::test]
    #[ignore = "Requires audio hardware"]
    async fn plays_prepared_source_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let player = RodioPlayer::new();
        player.prepare(&tiny_wav(dir.path())).await.unwrap();
        player.start().await.unwrap();
        player.stop().await;
    }
}
