//! Token-command interpreter.
//!
//! Parses `playpcm` / `recpcm` command lines, spawns sessions against
//! the msm device nodes, and routes in-band `-cmd=` control tokens to
//! the session registry. All streaming semantics live in
//! `pcm-stream-core`; this layer is glue.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use pcm_stream_core::{
    spawn_capture, spawn_playback, CaptureParams, PcmDevice, PcmSource, PlaybackParams,
    RepeatCount, SessionCommand, SessionHandle, SessionRegistry,
};
use pcm_stream_msm::MsmPcmDevice;

const DEFAULT_PLAY_FILE: &str = "/data/data.wav";
const DEFAULT_REC_FILE: &str = "/data/record.wav";

pub const HELP_TEXT: &str = "\
playpcm <path> [-id=N] [-repeat=N] [-dev=/dev/msm_pcm_out]
    Play a 16-bit PCM wav file. -repeat=N plays the file N times
    total; -repeat=0 repeats until stopped.
    Control: playpcm -id=N -cmd=stop
             playpcm -id=N -cmd=volume -value=N
recpcm <path> [-rate=N] [-cmode=1|2] [-id=N]
    Record 16-bit PCM into a wav file.
    Sample rates: 48000 44100 32000 24000 22050 16000 12000 11025 8000
    Control: recpcm -id=N -cmd=stop
help
    Show this text.
quit
    Stop all sessions and exit.
";

/// What a dispatched command line did.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    Nothing,
    Help,
    Quit,
    Spawned(u32),
    Control,
}

pub struct Interpreter {
    registry: Arc<SessionRegistry>,
    out_device: PathBuf,
    in_device: PathBuf,
}

impl Interpreter {
    pub fn new(registry: Arc<SessionRegistry>, out_device: PathBuf, in_device: PathBuf) -> Self {
        Self {
            registry,
            out_device,
            in_device,
        }
    }

    /// Dispatch one command line.
    pub fn dispatch(&self, line: &str) -> Result<Dispatch> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&keyword, rest)) = tokens.split_first() else {
            return Ok(Dispatch::Nothing);
        };
        match keyword {
            "playpcm" => self.playpcm(rest),
            "recpcm" => self.recpcm(rest),
            "help" => {
                print!("{}", HELP_TEXT);
                Ok(Dispatch::Help)
            }
            "quit" | "exit" => Ok(Dispatch::Quit),
            other => bail!("unknown command: {}", other),
        }
    }

    fn playpcm(&self, tokens: &[&str]) -> Result<Dispatch> {
        if has_control_token(tokens) {
            return self.control(tokens);
        }
        let request = PlayRequest::parse(tokens)?;

        let (header, source) = PcmSource::from_wav_file(&request.path)
            .with_context(|| format!("playpcm: {}", request.path.display()))?;
        info!(
            "playpcm: {} ch, {} hz, {} bit",
            header.num_channels, header.sample_rate, header.bits_per_sample
        );

        let device_path = request.device.unwrap_or_else(|| self.out_device.clone());
        let device = MsmPcmDevice::open_output(&device_path)?;
        if let Some(session_id) = device.session_id() {
            info!("decoder session id {}", session_id);
        }
        let params =
            PlaybackParams::new(header.sample_rate, header.num_channels as u32).repeat(request.repeat);

        self.register(request.id, spawn_playback(device, source, params))
    }

    fn recpcm(&self, tokens: &[&str]) -> Result<Dispatch> {
        if has_control_token(tokens) {
            return self.control(tokens);
        }
        let request = RecRequest::parse(tokens)?;

        let device = MsmPcmDevice::open_input(&self.in_device)?;
        if let Some(session_id) = device.session_id() {
            info!("encoder session id {}", session_id);
        }
        self.register(request.id, spawn_capture(device, request.params, request.path))
    }

    fn register(&self, id: u32, handle: SessionHandle) -> Result<Dispatch> {
        if let Some(previous) = self.registry.insert(id, handle) {
            if !previous.is_finished() {
                warn!("session id {} was still running; stopping it", id);
                previous.stop();
            }
            // Dropping the handle detaches the old worker; it winds
            // down on its own.
        }
        Ok(Dispatch::Spawned(id))
    }

    fn control(&self, tokens: &[&str]) -> Result<Dispatch> {
        let mut id = 0u32;
        let mut command_tokens = Vec::new();
        for &token in tokens {
            if let Some(v) = token.strip_prefix("-id=") {
                id = v.parse().context("bad -id value")?;
            } else {
                command_tokens.push(token);
            }
        }
        let command = SessionCommand::parse(command_tokens)?;
        self.registry.dispatch(id, command)?;
        Ok(Dispatch::Control)
    }
}

fn has_control_token(tokens: &[&str]) -> bool {
    tokens.iter().any(|t| t.starts_with("-cmd="))
}

#[derive(Debug, PartialEq, Eq)]
struct PlayRequest {
    path: PathBuf,
    id: u32,
    repeat: RepeatCount,
    device: Option<PathBuf>,
}

impl PlayRequest {
    fn parse(tokens: &[&str]) -> Result<Self> {
        let mut request = Self {
            path: PathBuf::from(DEFAULT_PLAY_FILE),
            id: 0,
            repeat: RepeatCount::Off,
            device: None,
        };
        for &token in tokens {
            if let Some(v) = token.strip_prefix("-id=") {
                request.id = v.parse().context("bad -id value")?;
            } else if let Some(v) = token.strip_prefix("-repeat=") {
                request.repeat = parse_repeat(v)?;
            } else if let Some(v) = token.strip_prefix("-dev=") {
                request.device = Some(PathBuf::from(v));
            } else if token.starts_with('-') {
                bail!("unknown option: {}", token);
            } else {
                request.path = PathBuf::from(token);
            }
        }
        Ok(request)
    }
}

/// `-repeat=N` plays the file N times total; 0 repeats until stopped.
fn parse_repeat(value: &str) -> Result<RepeatCount> {
    let n: u32 = value.parse().context("bad -repeat value")?;
    Ok(match n {
        0 => RepeatCount::Infinite,
        n => RepeatCount::Times(n - 1),
    })
}

#[derive(Debug, PartialEq, Eq)]
struct RecRequest {
    path: PathBuf,
    id: u32,
    params: CaptureParams,
}

impl RecRequest {
    fn parse(tokens: &[&str]) -> Result<Self> {
        let mut request = Self {
            path: PathBuf::from(DEFAULT_REC_FILE),
            id: 0,
            params: CaptureParams::default(),
        };
        for &token in tokens {
            if let Some(v) = token.strip_prefix("-rate=") {
                request.params.sample_rate = v.parse().context("bad -rate value")?;
            } else if let Some(v) = token.strip_prefix("-cmode=") {
                request.params.channel_count = v.parse().context("bad -cmode value")?;
            } else if let Some(v) = token.strip_prefix("-id=") {
                request.id = v.parse().context("bad -id value")?;
            } else if token.starts_with('-') {
                bail!("unknown option: {}", token);
            } else {
                request.path = PathBuf::from(token);
            }
        }
        Ok(request)
    }
}
