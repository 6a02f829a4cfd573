/// Represents the reporting mode of the PMS7003 sensor.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DeviceMode {
    /// In Active mode, the sensor pushes frames continuously.
    Active,
    /// In Passive mode, the sensor only reports data when queried.
    Passive,
}

/// How a telemetry frame is laid out once the magic bytes have been found.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum FrameProfile {
    /// The magic bytes are consumed on their own and decoding works on the
    /// 30 bytes that follow. The checksum adds the magic bytes back in.
    Standard,
    /// Decoding works on the full 32-byte frame, whose first two bytes are
    /// the magic bytes and are summed as part of the body.
    WithMagicInBody,
}

impl FrameProfile {
    /// Length of the buffer handed to the frame decoder.
    pub const fn body_len(self) -> usize {
        match self {
            FrameProfile::Standard => crate::BODY_LEN,
            FrameProfile::WithMagicInBody => crate::FRAME_LEN,
        }
    }
}

/// Default bound on frame synchronization attempts.
pub const DEFAULT_MAX_SYNC_ATTEMPTS: u32 = 2048;

/// Default settling delay before reading a command acknowledgement.
pub const DEFAULT_RESPONSE_DELAY_MS: u32 = 2000;

/// Configuration settings for the PMS7003 sensor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Whether `init` puts the sensor into passive mode.
    pub mode: DeviceMode,
    /// Frame layout used by the decoder.
    pub profile: FrameProfile,
    /// Maximum number of rejected frames before a read gives up.
    /// `None` keeps scanning forever.
    pub max_sync_attempts: Option<u32>,
    /// Time given to the sensor before its acknowledgement is read.
    pub response_delay_ms: u32,
}

impl Config {
    /// Creates a new `Config` instance.
    ///
    /// # Arguments
    ///
    /// * `mode` - The `DeviceMode` for the sensor.
    ///
    /// # Returns
    ///
    /// A new `Config` instance with the specified mode and default settings otherwise.
    pub fn new(mode: DeviceMode) -> Config {
        Config {
            mode,
            ..Config::default()
        }
    }
    /// Sets the device mode for the configuration.
    ///
    /// # Arguments
    ///
    /// * `mode` - The `DeviceMode` to set.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn mode(mut self, mode: DeviceMode) -> Self {
        self.mode = mode;
        self
    }
    /// Sets the frame profile for the configuration.
    ///
    /// # Arguments
    ///
    /// * `profile` - The `FrameProfile` to decode frames with.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn profile(mut self, profile: FrameProfile) -> Self {
        self.profile = profile;
        self
    }
    /// Sets the synchronization bound.
    ///
    /// # Arguments
    ///
    /// * `attempts` - Rejected frames tolerated per read, `None` to never give up.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn max_sync_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_sync_attempts = attempts;
        self
    }
    /// Sets the acknowledgement settling delay.
    ///
    /// # Arguments
    ///
    /// * `delay_ms` - Milliseconds to wait before reading an acknowledgement.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn response_delay_ms(mut self, delay_ms: u32) -> Self {
        self.response_delay_ms = delay_ms;
        self
    }
}

/// Provides default configuration values for the PMS7003 sensor.
impl Default for Config {
    /// The default configuration uses `Passive` mode, the standard frame
    /// profile, 2048 synchronization attempts and a 2 second settling delay.
    fn default() -> Config {
        Config {
            mode: DeviceMode::Passive,
            profile: FrameProfile::Standard,
            max_sync_attempts: Some(DEFAULT_MAX_SYNC_ATTEMPTS),
            response_delay_ms: DEFAULT_RESPONSE_DELAY_MS,
        }
    }
}
