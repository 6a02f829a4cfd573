use embedded_io_async::{Read, ReadExactError};
use log::{debug, error};

use crate::{decode_frame, Error, FrameProfile, SensorReading, FRAME_LEN, MAGIC_1, MAGIC_2};

/// Scans a serial byte stream for the next valid telemetry frame.
///
/// Every rejection (wrong magic byte, short read, bad checksum) starts the
/// scan over from the first magic byte. A failed second magic byte is not
/// re-examined as a possible first one.
pub struct FrameSync {
    profile: FrameProfile,
    max_attempts: Option<u32>,
}

impl FrameSync {
    /// Creates a synchronizer decoding frames with `profile`.
    ///
    /// # Arguments
    ///
    /// * `profile` - The `FrameProfile` handed to the decoder.
    /// * `max_attempts` - How many rejected frames to tolerate, `None` for no limit.
    pub fn new(profile: FrameProfile, max_attempts: Option<u32>) -> Self {
        Self {
            profile,
            max_attempts,
        }
    }

    /// Reads until a frame decodes, or until `max_attempts` frames have been
    /// rejected.
    ///
    /// Never consumes bytes past the end of the returned frame.
    pub async fn read_next_frame<R: Read>(&self, serial: &mut R) -> Result<SensorReading, Error> {
        let mut attempts: u32 = 0;
        loop {
            if let Some(max) = self.max_attempts {
                if attempts >= max {
                    error!("Failed to read a valid frame after {} attempts", attempts);
                    return Err(Error::SyncAttemptsExhausted { attempts });
                }
            }
            attempts = attempts.saturating_add(1);

            match self.try_read_frame(serial).await {
                Ok(reading) => {
                    debug!("Valid frame after {} attempt(s): {:?}", attempts, reading);
                    return Ok(reading);
                }
                Err(e @ (Error::ReadFailure | Error::WriteFailure)) => return Err(e),
                Err(e) => debug!("Frame rejected ({}), resynchronizing", e),
            }
        }
    }

    async fn try_read_frame<R: Read>(&self, serial: &mut R) -> Result<SensorReading, Error> {
        if read_byte(serial).await? != MAGIC_1 {
            return Err(Error::InvalidFrame);
        }
        if read_byte(serial).await? != MAGIC_2 {
            return Err(Error::InvalidFrame);
        }

        let mut frame = [0u8; FRAME_LEN];
        frame[0] = MAGIC_1;
        frame[1] = MAGIC_2;
        read_exact(serial, &mut frame[2..]).await?;

        let body = match self.profile {
            FrameProfile::Standard => &frame[2..],
            FrameProfile::WithMagicInBody => &frame[..],
        };
        decode_frame(self.profile, body)
    }
}

async fn read_byte<R: Read>(serial: &mut R) -> Result<u8, Error> {
    let mut buf = [0u8; 1];
    read_exact(serial, &mut buf).await?;
    Ok(buf[0])
}

/// Fills `buf` from the port.
///
/// A port that runs dry first is a `ShortRead`; a transport error is a `ReadFailure`.
pub(crate) async fn read_exact<R: Read>(serial: &mut R, buf: &mut [u8]) -> Result<(), Error> {
    let expected = buf.len();
    serial.read_exact(buf).await.map_err(|e| match e {
        ReadExactError::UnexpectedEof => Error::ShortRead { expected },
        ReadExactError::Other(e) => {
            error!("Serial read error: {:?}", e);
            Error::ReadFailure
        }
    })
}
