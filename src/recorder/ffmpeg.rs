//! FFmpeg media recorder
//!
//! Spawns FFmpeg on the capture stream's grab device and streams the muxed
//! output from stdout back as chunks. Stopping sends `q` on stdin so FFmpeg
//! finalizes the container before exiting.

use super::media::{
    Chunk, MediaRecorder, RecorderError, RecorderFactory, RecorderOptions, RecorderResult,
    RecorderState,
};
use super::mime::{ffmpeg_encoder, MimeType};
use crate::capture::CaptureStream;
use async_trait::async_trait;
use std::collections::HashSet;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::sync::{mpsc, OnceCell};
use tokio::task::JoinHandle;

/// Bytes read from FFmpeg's stdout per chunk
const CHUNK_SIZE: usize = 64 * 1024;

/// How long FFmpeg gets to flush the container after `q`
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// FFmpeg still running after this long has opened its inputs
const STARTUP_GRACE: Duration = Duration::from_millis(500);

/// Parse the encoder names out of `ffmpeg -encoders`
pub fn parse_encoders(output: &str) -> HashSet<String> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("------"))
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// Build the full FFmpeg argument list for a recording
pub fn build_args(stream: &CaptureStream, options: &RecorderOptions) -> RecorderResult<Vec<String>> {
    let mime = &options.mime_type;
    let video_encoder = ffmpeg_encoder(mime.video_codec())
        .ok_or_else(|| RecorderError::UnsupportedType(mime.to_string()))?;

    let mut args: Vec<String> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];
    args.extend(stream.input_args().iter().cloned());

    // Scale down to fit, never up
    args.push("-vf".into());
    args.push(format!(
        "scale='min(iw,{w})':'min(ih,{h})':force_original_aspect_ratio=decrease:force_divisible_by=2",
        w = options.max_width,
        h = options.max_height
    ));
    args.push("-pix_fmt".into());
    args.push("yuv420p".into());

    args.push("-c:v".into());
    args.push(video_encoder.into());
    match video_encoder {
        "libvpx" | "libvpx-vp9" => {
            args.extend(
                ["-deadline", "realtime", "-cpu-used", "8", "-b:v", "4M"]
                    .iter()
                    .map(|s| s.to_string()),
            );
        }
        "libx264" | "libx265" => {
            args.extend(
                ["-preset", "veryfast", "-crf", "23"]
                    .iter()
                    .map(|s| s.to_string()),
            );
        }
        _ => {
            args.extend(["-q:v", "5"].iter().map(|s| s.to_string()));
        }
    }

    if stream.has_audio() {
        let audio_codec = mime.audio_codec();
        let audio_encoder = ffmpeg_encoder(audio_codec)
            .ok_or_else(|| RecorderError::UnsupportedType(mime.to_string()))?;

        let audio = &stream.constraints().audio;
        let mut filters = vec![format!("volume={:.2}", options.audio_gain.clamp(0.0, 1.0))];
        if audio.noise_suppression {
            filters.push("afftdn".to_string());
        }
        args.push("-af".into());
        args.push(filters.join(","));

        args.push("-c:a".into());
        args.push(audio_encoder.into());

        // Opus only encodes at 48kHz and its divisors
        if let (Some(rate), false) = (audio.sample_rate, audio_codec == "opus") {
            args.push("-ar".into());
            args.push(rate.to_string());
        }
    } else {
        args.push("-an".into());
    }

    if matches!(mime.muxer(), "mp4" | "mov") {
        // Non-seekable output needs a fragmented container
        args.push("-movflags".into());
        args.push("frag_keyframe+empty_moov+default_base_moof".into());
    }

    args.push("-f".into());
    args.push(mime.muxer().into());
    args.push("pipe:1".into());

    Ok(args)
}

/// Recorder factory backed by the FFmpeg binary
pub struct FfmpegRecorderFactory {
    ffmpeg_path: String,
    encoders: OnceCell<HashSet<String>>,
}

impl FfmpegRecorderFactory {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            encoders: OnceCell::new(),
        }
    }

    async fn encoders(&self) -> &HashSet<String> {
        self.encoders
            .get_or_init(|| probe_encoders(&self.ffmpeg_path))
            .await
    }
}

async fn probe_encoders(ffmpeg_path: &str) -> HashSet<String> {
    let output = Command::new(ffmpeg_path)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let encoders = parse_encoders(&String::from_utf8_lossy(&output.stdout));
            tracing::debug!("FFmpeg reports {} encoders", encoders.len());
            encoders
        }
        Ok(output) => {
            tracing::warn!(
                "ffmpeg -encoders failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            HashSet::new()
        }
        Err(e) => {
            tracing::warn!("Failed to run ffmpeg: {}", e);
            HashSet::new()
        }
    }
}

#[async_trait]
impl RecorderFactory for FfmpegRecorderFactory {
    async fn is_type_supported(&self, mime_type: &MimeType) -> bool {
        if !matches!(
            mime_type.essence(),
            "video/webm" | "video/mp4" | "video/quicktime" | "video/x-msvideo"
        ) {
            return false;
        }

        let encoders = self.encoders().await;
        mime_type.codecs().iter().all(|codec| {
            ffmpeg_encoder(codec)
                .map(|encoder| encoders.contains(encoder))
                .unwrap_or(false)
        })
    }

    fn create(
        &self,
        stream: Arc<CaptureStream>,
        options: RecorderOptions,
    ) -> RecorderResult<Box<dyn MediaRecorder>> {
        Ok(Box::new(FfmpegRecorder::new(
            self.ffmpeg_path.clone(),
            stream,
            options,
        )))
    }
}

/// Recorder that runs one FFmpeg process per session
pub struct FfmpegRecorder {
    ffmpeg_path: String,
    stream: Arc<CaptureStream>,
    options: RecorderOptions,
    state: RecorderState,
    pid: Option<u32>,
    stdin: Option<ChildStdin>,
    reader: Option<JoinHandle<()>>,
    stopping: Arc<AtomicBool>,
    startup_grace: Duration,
}

impl FfmpegRecorder {
    pub fn new(ffmpeg_path: String, stream: Arc<CaptureStream>, options: RecorderOptions) -> Self {
        Self {
            ffmpeg_path,
            stream,
            options,
            state: RecorderState::Inactive,
            pid: None,
            stdin: None,
            reader: None,
            stopping: Arc::new(AtomicBool::new(false)),
            startup_grace: STARTUP_GRACE,
        }
    }

    async fn signal(&self, name: &str) -> RecorderResult<()> {
        let pid = self.pid.ok_or(RecorderError::NotRecording)?;
        send_signal(pid, name).await
    }
}

#[cfg(unix)]
async fn send_signal(pid: u32, name: &str) -> RecorderResult<()> {
    let status = Command::new("kill")
        .arg(format!("-{}", name))
        .arg(pid.to_string())
        .status()
        .await?;
    if status.success() {
        Ok(())
    } else {
        Err(RecorderError::Encoder(format!(
            "failed to send SIG{} to FFmpeg ({})",
            name, pid
        )))
    }
}

#[cfg(not(unix))]
async fn send_signal(_pid: u32, name: &str) -> RecorderResult<()> {
    Err(RecorderError::Unsupported(format!(
        "suspending FFmpeg (SIG{})",
        name
    )))
}

#[async_trait]
impl MediaRecorder for FfmpegRecorder {
    fn mime_type(&self) -> &MimeType {
        &self.options.mime_type
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    async fn start(&mut self, sink: mpsc::UnboundedSender<Chunk>) -> RecorderResult<()> {
        if self.state != RecorderState::Inactive {
            return Err(RecorderError::AlreadyRecording);
        }
        if !self.stream.is_active() {
            return Err(RecorderError::StreamInactive);
        }

        let args = build_args(&self.stream, &self.options)?;
        tracing::info!("Starting FFmpeg: {} {}", self.ffmpeg_path, args.join(" "));

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RecorderError::Encoder(format!("Failed to start FFmpeg: {}", e)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| RecorderError::Encoder("Failed to capture FFmpeg stdout".to_string()))?;

        // Keeps the last line so a startup failure can say why
        let stderr_tail = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut last = None;
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::warn!("ffmpeg: {}", line);
                    last = Some(line);
                }
                last
            })
        });

        // Taken before waiting, which would close it
        let stdin = child.stdin.take();

        // FFmpeg exits straight away when it cannot open the grab device
        if let Ok(exited) = tokio::time::timeout(self.startup_grace, child.wait()).await {
            let status = exited?;
            let detail = match stderr_tail {
                Some(task) => tokio::time::timeout(Duration::from_secs(1), task)
                    .await
                    .ok()
                    .and_then(Result::ok)
                    .flatten(),
                None => None,
            };
            let message = match detail {
                Some(line) => format!("FFmpeg exited during startup ({}): {}", status, line),
                None => format!("FFmpeg exited during startup ({})", status),
            };
            tracing::error!("{}", message);
            return Err(RecorderError::Encoder(message));
        }

        self.pid = child.id();
        self.stdin = stdin;
        self.stopping.store(false, Ordering::SeqCst);

        let stopping = self.stopping.clone();
        let stream = self.stream.clone();
        self.reader = Some(tokio::spawn(async move {
            let mut buffer = vec![0u8; CHUNK_SIZE];
            loop {
                match stdout.read(&mut buffer).await {
                    Ok(0) => break,
                    Ok(n) => {
                        if sink.send(buffer[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read FFmpeg output: {}", e);
                        break;
                    }
                }
            }
            drop(sink);

            match child.wait().await {
                Ok(status) if !status.success() && !stopping.load(Ordering::SeqCst) => {
                    tracing::error!("FFmpeg exited unexpectedly: {}", status);
                    stream.end();
                }
                Ok(status) => tracing::debug!("FFmpeg exited: {}", status),
                Err(e) => tracing::warn!("Failed to wait for FFmpeg: {}", e),
            }
        }));

        self.state = RecorderState::Recording;
        Ok(())
    }

    async fn pause(&mut self) -> RecorderResult<()> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }
        self.signal("STOP").await?;
        self.state = RecorderState::Paused;
        Ok(())
    }

    async fn resume(&mut self) -> RecorderResult<()> {
        if self.state != RecorderState::Paused {
            return Err(RecorderError::NotPaused);
        }
        self.signal("CONT").await?;
        self.state = RecorderState::Recording;
        Ok(())
    }

    async fn stop(&mut self) -> RecorderResult<()> {
        if self.state == RecorderState::Inactive {
            return Ok(());
        }

        self.stopping.store(true, Ordering::SeqCst);
        if self.state == RecorderState::Paused {
            if let Err(e) = self.signal("CONT").await {
                tracing::warn!("Failed to resume FFmpeg before stopping: {}", e);
            }
        }

        if let Some(mut stdin) = self.stdin.take() {
            // FFmpeg may already be gone; the reader task still drains stdout
            if let Err(e) = stdin.write_all(b"q").await {
                tracing::debug!("FFmpeg stdin closed: {}", e);
            }
            let _ = stdin.shutdown().await;
        }

        if let Some(mut reader) = self.reader.take() {
            if tokio::time::timeout(STOP_TIMEOUT, &mut reader).await.is_err() {
                tracing::warn!("FFmpeg did not exit in time, killing it");
                reader.abort();
            }
        }

        self.pid = None;
        self.state = RecorderState::Inactive;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConstraints, SourceKind};

    fn stream(has_audio: bool, constraints: CaptureConstraints) -> CaptureStream {
        CaptureStream::new(
            SourceKind::Screen,
            "Screen Capture",
            vec!["-f".into(), "x11grab".into(), "-i".into(), ":0.0".into()],
            has_audio,
            constraints,
        )
    }

    fn options(mime: &str, gain: f32) -> RecorderOptions {
        RecorderOptions {
            mime_type: mime.parse().unwrap(),
            max_width: 1280,
            max_height: 720,
            audio_gain: gain,
        }
    }

    #[test]
    fn test_parse_encoders() {
        let output = "Encoders:\n V..... = Video\n ------\n V....D libvpx-vp9           libvpx VP9\n A....D libopus              libopus Opus\n";
        let encoders = parse_encoders(output);
        assert!(encoders.contains("libvpx-vp9"));
        assert!(encoders.contains("libopus"));
        assert_eq!(encoders.len(), 2);
    }

    #[test]
    fn test_webm_args_with_audio() {
        let args = build_args(
            &stream(true, CaptureConstraints::detailed()),
            &options("video/webm;codecs=vp9,opus", 0.7),
        )
        .unwrap();
        let joined = args.join(" ");
        assert!(joined.contains("-c:v libvpx-vp9"));
        assert!(joined.contains("-c:a libopus"));
        assert!(joined.contains("volume=0.70,afftdn"));
        assert!(joined.contains("min(iw,1280)"));
        // 44.1kHz is not valid for Opus
        assert!(!joined.contains("-ar"));
        assert!(joined.ends_with("-f webm pipe:1"));
    }

    #[test]
    fn test_mp4_args_are_fragmented() {
        let args = build_args(
            &stream(true, CaptureConstraints::detailed()),
            &options("video/mp4", 1.0),
        )
        .unwrap();
        let joined = args.join(" ");
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-c:a aac"));
        assert!(joined.contains("-ar 44100"));
        assert!(joined.contains("frag_keyframe"));
    }

    #[test]
    fn test_video_only_args() {
        let args = build_args(
            &stream(false, CaptureConstraints::default()),
            &options("video/webm", 0.0),
        )
        .unwrap();
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-af".to_string()));
    }

    #[tokio::test]
    async fn test_codec_support() {
        let result = build_args(
            &stream(false, CaptureConstraints::default()),
            &options("video/webm;codecs=theora", 1.0),
        );
        // Unknown codecs leave the container default video codec in place
        assert!(result.is_ok());

        let factory = FfmpegRecorderFactory::new("ffmpeg");
        let _ = factory.encoders.set(HashSet::from(["libvpx".to_string()]));
        assert!(
            !factory
                .is_type_supported(&"video/webm;codecs=theora".parse().unwrap())
                .await
        );
        assert!(
            factory
                .is_type_supported(&"video/webm;codecs=vp8".parse().unwrap())
                .await
        );
        assert!(factory.is_type_supported(&"video/webm".parse().unwrap()).await);
        assert!(!factory.is_type_supported(&"video/ogg".parse().unwrap()).await);
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;
        use tempfile::tempdir;

        /// Writes an executable stand-in for FFmpeg
        fn script(dir: &Path, body: &str) -> String {
            let path = dir.join("ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().to_string()
        }

        fn recorder(path: String, stream: Arc<CaptureStream>, grace_ms: u64) -> FfmpegRecorder {
            let mut recorder = FfmpegRecorder::new(path, stream, options("video/webm", 1.0));
            recorder.startup_grace = Duration::from_millis(grace_ms);
            recorder
        }

        fn live_stream() -> Arc<CaptureStream> {
            Arc::new(stream(false, CaptureConstraints::default()))
        }

        fn drain(rx: &mut mpsc::UnboundedReceiver<Chunk>) -> Vec<u8> {
            let mut bytes = Vec::new();
            while let Ok(chunk) = rx.try_recv() {
                bytes.extend(chunk);
            }
            bytes
        }

        // Emits a header, waits for `q`, then flushes a trailer
        const ENCODER: &str = "printf 'header'\nread -r _cmd\nprintf 'trailer'\nexit 0";

        #[tokio::test]
        async fn test_stop_drains_output() {
            let dir = tempdir().unwrap();
            let stream = live_stream();
            let mut recorder = recorder(script(dir.path(), ENCODER), stream.clone(), 150);
            let (tx, mut rx) = mpsc::unbounded_channel();

            recorder.start(tx).await.unwrap();
            assert_eq!(recorder.state(), RecorderState::Recording);

            recorder.stop().await.unwrap();
            assert_eq!(recorder.state(), RecorderState::Inactive);
            assert_eq!(drain(&mut rx), b"headertrailer");

            // Sink is closed once stop returns
            assert!(rx.recv().await.is_none());
            assert!(!*stream.ended().borrow());
        }

        #[tokio::test]
        async fn test_pause_and_resume_signal_the_process() {
            let dir = tempdir().unwrap();
            let mut recorder = recorder(script(dir.path(), ENCODER), live_stream(), 150);
            let (tx, mut rx) = mpsc::unbounded_channel();

            recorder.start(tx).await.unwrap();
            recorder.pause().await.unwrap();
            assert_eq!(recorder.state(), RecorderState::Paused);
            assert!(matches!(recorder.pause().await, Err(RecorderError::NotRecording)));

            recorder.resume().await.unwrap();
            assert_eq!(recorder.state(), RecorderState::Recording);
            recorder.pause().await.unwrap();

            // Stopping while paused continues the process first
            recorder.stop().await.unwrap();
            assert_eq!(drain(&mut rx), b"headertrailer");
        }

        #[tokio::test]
        async fn test_startup_failure_is_an_error() {
            let dir = tempdir().unwrap();
            let stream = live_stream();
            let path = script(dir.path(), "echo 'cannot open display' >&2\nexit 1");
            let mut recorder = recorder(path, stream.clone(), 2000);
            let (tx, _rx) = mpsc::unbounded_channel();

            match recorder.start(tx).await {
                Err(RecorderError::Encoder(message)) => {
                    assert!(message.contains("cannot open display"), "{}", message)
                }
                other => panic!("expected an encoder error, got {:?}", other.map(|_| ())),
            }
            assert_eq!(recorder.state(), RecorderState::Inactive);
            assert!(!*stream.ended().borrow());
            assert!(matches!(recorder.pause().await, Err(RecorderError::NotRecording)));
        }

        #[tokio::test]
        async fn test_unexpected_exit_ends_stream() {
            let dir = tempdir().unwrap();
            let stream = live_stream();
            let path = script(dir.path(), "printf 'partial'\nsleep 1\nexit 1");
            let mut recorder = recorder(path, stream.clone(), 150);
            let (tx, mut rx) = mpsc::unbounded_channel();

            recorder.start(tx).await.unwrap();

            let mut ended = stream.ended();
            tokio::time::timeout(Duration::from_secs(5), ended.wait_for(|ended| *ended))
                .await
                .unwrap()
                .unwrap();

            recorder.stop().await.unwrap();
            assert_eq!(drain(&mut rx), b"partial");
        }
    }
}
