//! ioctl surface of the msm PCM driver.

/// Config block exchanged with the driver via GET_CONFIG/SET_CONFIG.
///
/// Field order and widths match the kernel ABI; the struct is 32
/// bytes on every target.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsmAudioConfig {
    pub buffer_size: u32,
    pub buffer_count: u32,
    pub channel_count: u32,
    pub sample_rate: u32,
    pub kind: u32,
    pub unused: [u32; 3],
}

const AUDIO_IOCTL_MAGIC: u8 = b'a';

const AUDIO_START: u8 = 0;
const AUDIO_GET_CONFIG: u8 = 3;
const AUDIO_SET_CONFIG: u8 = 4;
const AUDIO_GET_SESSION_ID: u8 = 15;
const AUDIO_SET_VOLUME: u8 = 16;

nix::ioctl_write_ptr!(audio_start, AUDIO_IOCTL_MAGIC, AUDIO_START, u32);
nix::ioctl_read!(
    audio_get_config,
    AUDIO_IOCTL_MAGIC,
    AUDIO_GET_CONFIG,
    MsmAudioConfig
);
nix::ioctl_write_ptr!(
    audio_set_config,
    AUDIO_IOCTL_MAGIC,
    AUDIO_SET_CONFIG,
    MsmAudioConfig
);
nix::ioctl_read!(
    audio_get_session_id,
    AUDIO_IOCTL_MAGIC,
    AUDIO_GET_SESSION_ID,
    u16
);
nix::ioctl_write_ptr!(audio_set_volume, AUDIO_IOCTL_MAGIC, AUDIO_SET_VOLUME, u32);
