use std::{
    io::{Read, Write as _},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    encode::sink::{ExportFrame, FrameSink, SinkConfig},
    foundation::error::{FramefxError, FramefxResult},
    render::surface::FrameRGBA,
};

/// Video codec handed to `ffmpeg`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoCodec {
    /// H.264 in MP4.
    H264,
    /// VP9 in WebM.
    Vp9,
}

impl VideoCodec {
    /// VP9 for `.webm` outputs, H.264 otherwise.
    pub fn for_path(path: &Path) -> Self {
        let is_webm = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("webm"));
        if is_webm { Self::Vp9 } else { Self::H264 }
    }

    fn encoder_name(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::Vp9 => "libvpx-vp9",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    pub codec: VideoCodec,
    pub overwrite: bool,
    /// Straight RGBA8 background that transparent pixels are flattened onto.
    pub background: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Codec picked from the output extension.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        let out_path = out_path.into();
        Self {
            codec: VideoCodec::for_path(&out_path),
            out_path,
            overwrite: true,
            background: [0, 0, 0, 255],
        }
    }
}

/// MP4 (H.264) or WebM (VP9) output through the system `ffmpeg`, fed raw RGBA frames over
/// stdin.
///
/// The quality tier in [`SinkConfig`] picks the target bitrate.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_index: Option<u64>,
}

impl std::fmt::Debug for FfmpegSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSink")
            .field("opts", &self.opts)
            .field("running", &self.child.is_some())
            .finish_non_exhaustive()
    }
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_index: None,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            self.opts.codec.encoder_name(),
            "-b:v",
            &cfg.quality.bitrate_bps().to_string(),
            "-pix_fmt",
            "yuv420p",
        ]);
        if self.opts.codec == VideoCodec::H264 {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.arg(&self.opts.out_path);
        cmd
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> FramefxResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(FramefxError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(FramefxError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if cfg.total_frames == 0 {
            return Err(FramefxError::validation("no frames to encode"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(FramefxError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(FramefxError::render(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let mut child = self
            .command(&cfg)
            .spawn()
            .context("spawn ffmpeg (is it installed and on PATH?)")?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FramefxError::render("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| FramefxError::render("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_index = None;
        Ok(())
    }

    fn push_frame(&mut self, frame: ExportFrame, pixels: &FrameRGBA) -> FramefxResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FramefxError::render("ffmpeg sink not started"))?;
        if let Some(last) = self.last_index
            && frame.index <= last
        {
            return Err(FramefxError::render(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_index = Some(frame.index);

        if pixels.width != cfg.width || pixels.height != cfg.height {
            return Err(FramefxError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                pixels.width, pixels.height, cfg.width, cfg.height
            )));
        }
        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &pixels.data,
            pixels.premultiplied,
            self.opts.background,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FramefxError::render("ffmpeg sink is already finalized"));
        };
        stdin
            .write_all(&self.scratch)
            .context("write frame to ffmpeg stdin")?;
        Ok(())
    }

    fn end(&mut self) -> FramefxResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| FramefxError::render("ffmpeg sink not started"))?;
        let status = child.wait().context("wait for ffmpeg to finish")?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| FramefxError::render("ffmpeg stderr drain thread panicked"))?
                .context("read ffmpeg stderr")?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(FramefxError::render(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.kill_child();
        self.cfg = None;
        let _ = std::fs::remove_file(&self.opts.out_path);
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.kill_child();
        }
    }
}

/// Flatten RGBA8 onto an opaque background, producing straight opaque RGBA for ffmpeg.
fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    premultiplied: bool,
    background: [u8; 4],
) -> FramefxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FramefxError::validation(
            "frame data size mismatch with width*height*4",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let fg = if premultiplied {
                u16::from(s[c])
            } else {
                mul_div255(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255(u16::from(background[c]), inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u16
}

pub fn ensure_parent_dir(path: &Path) -> FramefxResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
