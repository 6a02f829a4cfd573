use core::fmt;

use crate::constants::MAX_RESPONSE_LEN;

/// Bytes received in place of an expected acknowledgement.
#[derive(PartialEq, Eq, Copy, Clone)]
pub struct ResponseBytes {
    buf: [u8; MAX_RESPONSE_LEN],
    len: usize,
}

impl ResponseBytes {
    /// Copies up to `MAX_RESPONSE_LEN` bytes from `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_RESPONSE_LEN);
        let mut buf = [0u8; MAX_RESPONSE_LEN];
        buf[..len].copy_from_slice(&bytes[..len]);
        ResponseBytes { buf, len }
    }

    /// The received bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl fmt::Debug for ResponseBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X?}", self.as_bytes())
    }
}

/// A command exchange that did not go as the protocol requires.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ProtocolError {
    /// The serial port accepted fewer bytes than the command is long.
    ShortWrite { expected: usize, written: usize },
    /// The acknowledgement did not match the literal the sensor should send.
    UnexpectedResponse {
        expected: &'static [u8],
        received: ResponseBytes,
    },
    /// The port ran dry before the whole acknowledgement arrived.
    IncompleteResponse { expected: &'static [u8] },
    /// The expected response does not fit the receive buffer.
    ResponseTooLong { len: usize, max: usize },
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Error {
    BadChecksum { transmitted: u16, computed: u16 },
    InvalidFrame,
    ShortRead { expected: usize },
    ReadFailure,
    WriteFailure,
    Protocol(ProtocolError),
    SyncAttemptsExhausted { attempts: u32 },
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

// Writes bytes as "0x42 0x4d ..." for diagnostics.
struct Hex<'a>(&'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "0x{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::ShortWrite { expected, written } => write!(
                f,
                "failed to write command: {} of {} bytes written",
                written, expected
            ),
            ProtocolError::UnexpectedResponse { expected, received } => write!(
                f,
                "wrong response, expecting: [{}], getting: [{}]",
                Hex(expected),
                Hex(received.as_bytes())
            ),
            ProtocolError::IncompleteResponse { expected } => write!(
                f,
                "incomplete response, expecting: [{}]",
                Hex(expected)
            ),
            ProtocolError::ResponseTooLong { len, max } => write!(
                f,
                "expected response of {} bytes exceeds the {} byte limit",
                len, max
            ),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadChecksum {
                transmitted,
                computed,
            } => write!(
                f,
                "bad checksum: frame carries {:#06x}, computed {:#06x}",
                transmitted, computed
            ),
            Error::InvalidFrame => f.write_str("invalid frame"),
            Error::ShortRead { expected } => {
                write!(f, "short read: port ran dry before {} bytes", expected)
            }
            Error::ReadFailure => f.write_str("serial read failed"),
            Error::WriteFailure => f.write_str("serial write failed"),
            Error::Protocol(err) => write!(f, "protocol error: {}", err),
            Error::SyncAttemptsExhausted { attempts } => {
                write!(f, "no valid frame after {} attempts", attempts)
            }
        }
    }
}

impl core::error::Error for Error {}
