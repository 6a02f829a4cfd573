// MAGIC_1 is the first byte of every frame (telemetry, command or acknowledgement).
pub const MAGIC_1: u8 = 0x42;

// MAGIC_2 is the second byte of every frame.
pub const MAGIC_2: u8 = 0x4D;

// BODY_LEN is the number of bytes following the two magic bytes in a telemetry frame.
pub const BODY_LEN: usize = 30;

// FRAME_LEN is the full telemetry frame length on the wire, magic bytes included.
pub const FRAME_LEN: usize = BODY_LEN + 2;

// ACK_LEN is the length of every command acknowledgement frame.
pub const ACK_LEN: usize = 8;

// MAX_RESPONSE_LEN is the longest response `send_command` will wait for.
pub const MAX_RESPONSE_LEN: usize = FRAME_LEN;

/// Fixed command frames understood by the sensor.
///
/// Each command is a 7-byte literal: magic bytes, command code, two data bytes
/// and a big-endian checksum of everything before it.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ModeCommand {
    /// Switch to polled (passive) reporting.
    EnterPassiveMode,
    /// Switch back to continuous (active) reporting.
    EnterActiveMode,
    /// Stop the fan and laser.
    Sleep,
    /// Restart the fan and laser. The sensor sends no acknowledgement.
    Wake,
    /// Ask for one telemetry frame while in passive mode.
    PassiveRead,
}

impl ModeCommand {
    /// All commands, in declaration order.
    pub const ALL: [ModeCommand; 5] = [
        ModeCommand::EnterPassiveMode,
        ModeCommand::EnterActiveMode,
        ModeCommand::Sleep,
        ModeCommand::Wake,
        ModeCommand::PassiveRead,
    ];

    /// The bytes to write to the sensor.
    pub const fn request(self) -> &'static [u8] {
        match self {
            ModeCommand::EnterPassiveMode => &[MAGIC_1, MAGIC_2, 0xE1, 0x00, 0x00, 0x01, 0x70],
            ModeCommand::EnterActiveMode => &[MAGIC_1, MAGIC_2, 0xE1, 0x00, 0x01, 0x01, 0x71],
            ModeCommand::Sleep => &[MAGIC_1, MAGIC_2, 0xE4, 0x00, 0x00, 0x01, 0x73],
            ModeCommand::Wake => &[MAGIC_1, MAGIC_2, 0xE4, 0x00, 0x01, 0x01, 0x74],
            ModeCommand::PassiveRead => &[MAGIC_1, MAGIC_2, 0xE2, 0x00, 0x00, 0x01, 0x71],
        }
    }

    /// The literal acknowledgement the sensor answers with.
    ///
    /// Empty for `Wake` (no answer) and `PassiveRead` (answered by a telemetry frame).
    pub const fn response(self) -> &'static [u8] {
        match self {
            ModeCommand::EnterPassiveMode => &[MAGIC_1, MAGIC_2, 0x00, 0x04, 0xE1, 0x00, 0x01, 0x74],
            ModeCommand::EnterActiveMode => &[MAGIC_1, MAGIC_2, 0x00, 0x04, 0xE1, 0x01, 0x01, 0x75],
            ModeCommand::Sleep => &[MAGIC_1, MAGIC_2, 0x00, 0x04, 0xE4, 0x00, 0x01, 0x77],
            ModeCommand::Wake | ModeCommand::PassiveRead => &[],
        }
    }

    /// Checks that the trailing checksum of both the request and the
    /// acknowledgement matches the sum of their preceding bytes.
    pub fn has_valid_checksum(self) -> bool {
        fn trailer_matches(bytes: &[u8]) -> bool {
            if bytes.is_empty() {
                return true;
            }
            let (payload, trailer) = bytes.split_at(bytes.len() - 2);
            let sum = payload
                .iter()
                .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)));
            sum == u16::from_be_bytes([trailer[0], trailer[1]])
        }
        trailer_matches(self.request()) && trailer_matches(self.response())
    }
}
