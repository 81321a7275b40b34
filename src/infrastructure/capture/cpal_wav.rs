//! WAV capture adapter driven by cpal
//!
//! A dedicated worker thread owns the device stream and the WAV writer. The
//! input callback hands mono i16 buffers to the worker over a channel; the
//! worker appends each buffer to the open file until the stop flag is
//! observed, resampling when the device rate differs from the output rate.
//! The stop flag is the only state shared across threads.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use hound::{WavSpec, WavWriter};
use rubato::{FftFixedIn, Resampler};

use crate::application::ports::{CaptureDevice, CaptureError};

/// How long the worker waits for one buffer before re-checking the stop flag
const BUFFER_POLL: Duration = Duration::from_millis(100);

/// Resampler input chunk size in frames
const RESAMPLE_CHUNK: usize = 1024;

/// How long `start` waits for the device stream to come up
const STREAM_READY_TIMEOUT: Duration = Duration::from_secs(5);

type WavSink = WavWriter<BufWriter<File>>;

/// Microphone capture writing 16-bit mono WAV at a fixed output rate
pub struct CpalWavCapture {
    output_sample_rate: u32,
    stop_flag: Arc<AtomicBool>,
    capturing: Arc<AtomicBool>,
    elapsed_ms: Arc<AtomicU64>,
    worker: StdMutex<Option<JoinHandle<Result<(), CaptureError>>>>,
}

impl CpalWavCapture {
    /// Create a capture adapter targeting the given output sample rate
    pub fn new(output_sample_rate: u32) -> Self {
        Self {
            output_sample_rate,
            stop_flag: Arc::new(AtomicBool::new(false)),
            capturing: Arc::new(AtomicBool::new(false)),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            worker: StdMutex::new(None),
        }
    }
}

#[async_trait]
impl CaptureDevice for CpalWavCapture {
    async fn start(&self, output: &Path) -> Result<(), CaptureError> {
        if self.capturing.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::DeviceBusy(
                "capture already in progress".to_string(),
            ));
        }
        self.stop_flag.store(false, Ordering::SeqCst);
        self.elapsed_ms.store(0, Ordering::SeqCst);

        let output = output.to_path_buf();
        let target_rate = self.output_sample_rate;
        let stop_flag = Arc::clone(&self.stop_flag);
        let capturing = Arc::clone(&self.capturing);
        let elapsed_ms = Arc::clone(&self.elapsed_ms);

        // The worker reports one Ok/Err once the stream is live (or not).
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            let result = run_capture(&output, target_rate, &stop_flag, &elapsed_ms, &ready_tx);
            capturing.store(false, Ordering::SeqCst);
            result
        });

        let ready = tokio::task::spawn_blocking(move || ready_rx.recv_timeout(STREAM_READY_TIMEOUT))
            .await
            .map_err(|e| CaptureError::StartFailed(format!("task join error: {e}")))?;

        match ready {
            Ok(Ok(())) => {
                *self.worker.lock().unwrap() = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                self.capturing.store(false, Ordering::SeqCst);
                Err(e)
            }
            Err(_) => {
                self.stop_flag.store(true, Ordering::SeqCst);
                let _ = handle.join();
                self.capturing.store(false, Ordering::SeqCst);
                Err(CaptureError::StartFailed(
                    "timed out waiting for the capture stream".to_string(),
                ))
            }
        }
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        let handle = self.worker.lock().unwrap().take();
        let Some(handle) = handle else {
            return Ok(());
        };

        self.stop_flag.store(true, Ordering::SeqCst);

        let joined = tokio::task::spawn_blocking(move || handle.join())
            .await
            .map_err(|e| CaptureError::FinalizeFailed(format!("task join error: {e}")))?;
        joined.map_err(|_| CaptureError::FinalizeFailed("capture worker panicked".to_string()))?
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }
}

/// Worker body: open the device, stream buffers into the WAV file, finalize.
fn run_capture(
    output: &PathBuf,
    target_rate: u32,
    stop_flag: &AtomicBool,
    elapsed_ms: &AtomicU64,
    ready_tx: &mpsc::Sender<Result<(), CaptureError>>,
) -> Result<(), CaptureError> {
    macro_rules! setup {
        ($result:expr) => {
            match $result {
                Ok(v) => v,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.clone()));
                    return Err(e);
                }
            }
        };
    }

    let host = cpal::default_host();
    let device = setup!(host
        .default_input_device()
        .ok_or(CaptureError::NoInputDevice));
    let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

    let (config, sample_format) = setup!(input_config_for(&device, target_rate));
    let device_rate = config.sample_rate.0;
    let channels = config.channels;
    tracing::info!(
        device = %device_name,
        rate = device_rate,
        channels,
        "capture device opened"
    );

    let spec = WavSpec {
        channels: 1,
        sample_rate: target_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = setup!(
        WavWriter::create(output, spec).map_err(|e| CaptureError::StartFailed(e.to_string()))
    );

    let mut resampler = if device_rate != target_rate {
        tracing::debug!(from = device_rate, to = target_rate, "resampling capture");
        Some(setup!(ChunkResampler::new(device_rate, target_rate)))
    } else {
        None
    };

    let (tx, rx) = mpsc::channel::<Vec<i16>>();

    let stream = setup!(match sample_format {
        SampleFormat::I16 => {
            let tx = tx.clone();
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let mono = mix_to_mono(data, channels);
                    if !mono.is_empty() {
                        let _ = tx.send(mono);
                    }
                },
                |err| tracing::warn!("capture stream error: {err}"),
                None,
            )
        }
        SampleFormat::F32 => {
            let tx = tx.clone();
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let as_i16: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                        .collect();
                    let mono = mix_to_mono(&as_i16, channels);
                    if !mono.is_empty() {
                        let _ = tx.send(mono);
                    }
                },
                |err| tracing::warn!("capture stream error: {err}"),
                None,
            )
        }
        other => {
            let e = CaptureError::StartFailed(format!("unsupported sample format: {other:?}"));
            let _ = ready_tx.send(Err(e.clone()));
            return Err(e);
        }
    }
    .map_err(|e| CaptureError::StartFailed(e.to_string())));
    // The stream holds the only live sender from here on, so the receiver
    // disconnects when the stream dies.
    drop(tx);

    setup!(stream
        .play()
        .map_err(|e| CaptureError::StartFailed(e.to_string())));
    let _ = ready_tx.send(Ok(()));

    let started = Instant::now();
    let mut loop_err: Option<CaptureError> = None;

    loop {
        match rx.recv_timeout(BUFFER_POLL) {
            Ok(buffer) => {
                if let Err(e) = append_samples(&mut writer, resampler.as_mut(), &buffer) {
                    loop_err = Some(e);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        elapsed_ms.store(started.elapsed().as_millis() as u64, Ordering::SeqCst);
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
    }

    // Stop the device before draining whatever is still queued
    drop(stream);
    if loop_err.is_none() {
        while let Ok(buffer) = rx.try_recv() {
            if let Err(e) = append_samples(&mut writer, resampler.as_mut(), &buffer) {
                loop_err = Some(e);
                break;
            }
        }
    }
    if loop_err.is_none() {
        if let Some(r) = resampler.as_mut() {
            if let Err(e) = r.finish(&mut writer) {
                loop_err = Some(e);
            }
        }
    }

    let finalize = writer.finalize();
    if let Some(e) = loop_err {
        return Err(e);
    }
    finalize.map_err(|e| CaptureError::FinalizeFailed(e.to_string()))?;
    tracing::debug!(path = %output.display(), "capture file finalized");
    Ok(())
}

/// Pick an input configuration, preferring mono and a range that covers the
/// target rate. Falls back to the range's minimum rate otherwise.
fn input_config_for(
    device: &cpal::Device,
    target_rate: u32,
) -> Result<(StreamConfig, SampleFormat), CaptureError> {
    let supported = device
        .supported_input_configs()
        .map_err(|e| CaptureError::StartFailed(format!("failed to query configs: {e}")))?;

    let mut best: Option<cpal::SupportedStreamConfigRange> = None;
    for config in supported {
        if config.sample_format() != SampleFormat::I16
            && config.sample_format() != SampleFormat::F32
        {
            continue;
        }

        let covers_target = config.min_sample_rate().0 <= target_rate
            && config.max_sample_rate().0 >= target_rate;

        let is_better = match &best {
            None => true,
            Some(current) => {
                let fewer_channels = config.channels() < current.channels();
                let better_rate = covers_target
                    && (current.min_sample_rate().0 > target_rate
                        || current.max_sample_rate().0 < target_rate);
                fewer_channels || better_rate
            }
        };
        if is_better {
            best = Some(config);
        }
    }

    let range = best.ok_or_else(|| {
        CaptureError::StartFailed("no suitable input configuration found".to_string())
    })?;

    let sample_rate =
        if range.min_sample_rate().0 <= target_rate && range.max_sample_rate().0 >= target_rate {
            SampleRate(target_rate)
        } else {
            range.min_sample_rate()
        };

    let sample_format = range.sample_format();
    let config = StreamConfig {
        channels: range.channels(),
        sample_rate,
        buffer_size: cpal::BufferSize::Default,
    };

    Ok((config, sample_format))
}

/// Mix interleaved multi-channel samples down to mono by averaging
fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Append a buffer to the WAV file, through the resampler when present
fn append_samples(
    writer: &mut WavSink,
    resampler: Option<&mut ChunkResampler>,
    samples: &[i16],
) -> Result<(), CaptureError> {
    match resampler {
        Some(r) => {
            let mut out = Vec::new();
            r.push(samples, &mut out)?;
            for s in out {
                writer
                    .write_sample(s)
                    .map_err(|e| CaptureError::StreamFailed(e.to_string()))?;
            }
        }
        None => {
            for &s in samples {
                writer
                    .write_sample(s)
                    .map_err(|e| CaptureError::StreamFailed(e.to_string()))?;
            }
        }
    }
    Ok(())
}

/// Streaming mono resampler: accumulates input and processes full chunks
struct ChunkResampler {
    inner: FftFixedIn<f32>,
    pending: Vec<f32>,
}

impl ChunkResampler {
    fn new(from_rate: u32, to_rate: u32) -> Result<Self, CaptureError> {
        let inner = FftFixedIn::<f32>::new(
            from_rate as usize,
            to_rate as usize,
            RESAMPLE_CHUNK,
            2, // Sub-chunks
            1, // Mono
        )
        .map_err(|e| CaptureError::StartFailed(format!("resampler init failed: {e}")))?;
        Ok(Self {
            inner,
            pending: Vec::new(),
        })
    }

    /// Feed input samples, emitting resampled output for every full chunk
    fn push(&mut self, samples: &[i16], writer: &mut Vec<i16>) -> Result<(), CaptureError> {
        self.pending
            .extend(samples.iter().map(|&s| s as f32 / 32768.0));

        while self.pending.len() >= self.inner.input_frames_next() {
            let frames = self.inner.input_frames_next();
            let chunk: Vec<Vec<f32>> = vec![self.pending.drain(..frames).collect()];
            let resampled = self
                .inner
                .process(&chunk, None)
                .map_err(|e| CaptureError::StreamFailed(format!("resampling failed: {e}")))?;
            writer.extend(
                resampled[0]
                    .iter()
                    .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16),
            );
        }
        Ok(())
    }

    /// Flush the zero-padded final chunk into the WAV file
    fn finish(&mut self, writer: &mut WavSink) -> Result<(), CaptureError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let frames = self.inner.input_frames_next();
        self.pending.resize(frames, 0.0);
        let chunk: Vec<Vec<f32>> = vec![std::mem::take(&mut self.pending)];
        let resampled = self
            .inner
            .process(&chunk, None)
            .map_err(|e| CaptureError::StreamFailed(format!("resampling failed: {e}")))?;
        for &s in &resampled[0] {
            writer
                .write_sample((s.clamp(-1.0, 1.0) * 32767.0) as i16)
                .map_err(|e| CaptureError::StreamFailed(e.to_string()))?;
        }
        Ok(())
    }
}
