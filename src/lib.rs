#![cfg_attr(not(test), no_std)]

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use log::debug;

pub mod aqi;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod frame;
pub use frame::*;

mod sync;
pub use sync::FrameSync;

#[cfg(test)]
mod testutils;

// Represents the power state of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationalState {
    /// Fan and laser are stopped.
    Sleeping,
    /// Sensor is actively taking measurements.
    Working,
}

/// Represents a PMS7003 particulate matter sensor.
///
/// This struct provides methods to switch the sensor between active and
/// passive reporting, put it to sleep, wake it up and read measurement frames.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface used to communicate with the sensor.
///   It must implement `embedded_io_async::Read` and `embedded_io_async::Write`.
/// * `Delay`: Provides the settling delay before acknowledgements are read.
pub struct Pms7003<Serial, Delay> {
    serial: Serial,
    delay: Delay,
    config: Config,
    reporting_mode: DeviceMode,
    state: OperationalState,
}

impl<S, D> Pms7003<S, D>
where
    S: Read + Write,
    D: DelayNs,
{
    /// Creates a new `Pms7003` sensor instance.
    ///
    /// The sensor is assumed to be awake and in its power-on active mode.
    /// Call [`init`](Self::init) to apply the configured mode.
    ///
    /// # Arguments
    ///
    /// * `serial`: The serial interface for communication with the sensor.
    /// * `delay`: The delay provider used while waiting for acknowledgements.
    /// * `config`: The configuration for the sensor.
    ///
    /// # Returns
    ///
    /// A new `Pms7003` instance.
    pub fn new(serial: S, delay: D, config: Config) -> Self {
        Self {
            serial,
            delay,
            config,
            reporting_mode: DeviceMode::Active,
            state: OperationalState::Working,
        }
    }

    /// Applies the configured reporting mode.
    ///
    /// In Passive mode this sends the enter-passive command and checks its
    /// acknowledgement. In Active mode nothing is sent, the sensor already
    /// pushes frames on its own.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the sensor is in the configured mode.
    /// * `Err(Error)` if the enter-passive command was not acknowledged.
    pub async fn init(&mut self) -> Result<(), Error> {
        if self.config.mode == DeviceMode::Passive {
            self.enter_passive_mode().await.map_err(|e| {
                log::error!("Failed to enter passive mode during init: {}", e);
                e
            })?;
        }
        debug!("PMS7003 init sequence complete.");
        Ok(())
    }

    /// Switches the sensor to passive reporting.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the sensor acknowledged the change.
    /// * `Err(Error::Protocol)` if the acknowledgement did not match.
    /// * `Err(Error::WriteFailure)` or `Err(Error::ReadFailure)` for serial communication issues.
    pub async fn enter_passive_mode(&mut self) -> Result<(), Error> {
        self.execute(ModeCommand::EnterPassiveMode).await?;
        self.reporting_mode = DeviceMode::Passive;
        Ok(())
    }

    /// Switches the sensor back to active reporting.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the sensor acknowledged the change.
    /// * `Err(Error)` if the acknowledgement did not match or the serial port failed.
    pub async fn enter_active_mode(&mut self) -> Result<(), Error> {
        self.execute(ModeCommand::EnterActiveMode).await?;
        self.reporting_mode = DeviceMode::Active;
        Ok(())
    }

    /// Puts the sensor to sleep.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the sensor acknowledged the command.
    /// * `Err(Error)` if the acknowledgement did not match or the serial port failed.
    pub async fn sleep(&mut self) -> Result<(), Error> {
        self.execute(ModeCommand::Sleep).await?;
        self.state = OperationalState::Sleeping;
        Ok(())
    }

    /// Wakes the sensor up.
    ///
    /// The sensor does not acknowledge this command and needs time to spin
    /// up its fan before frames are meaningful again.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the command has been written.
    /// * `Err(Error)` if the command could not be written in full.
    pub async fn wake(&mut self) -> Result<(), Error> {
        self.execute(ModeCommand::Wake).await?;
        self.state = OperationalState::Working;
        Ok(())
    }

    /// Reads the next valid measurement frame.
    ///
    /// In Passive mode a single read request is sent first. In Active mode
    /// the next pushed frame is returned.
    ///
    /// # Returns
    ///
    /// * `Ok(SensorReading)` for the first frame that passes its checksum.
    /// * `Err(Error::SyncAttemptsExhausted)` if the configured number of frames were rejected.
    /// * `Err(Error::ReadFailure)` or `Err(Error::WriteFailure)` for serial communication issues.
    pub async fn read(&mut self) -> Result<SensorReading, Error> {
        if self.state == OperationalState::Sleeping {
            log::warn!("Reading while the sensor is asleep, no frame may arrive");
        }
        if self.reporting_mode == DeviceMode::Passive {
            self.execute(ModeCommand::PassiveRead).await?;
        }

        FrameSync::new(self.config.profile, self.config.max_sync_attempts)
            .read_next_frame(&mut self.serial)
            .await
    }

    /// Sends `request` and, when `expected_response` is not empty, waits for
    /// the sensor to settle and checks that it answers with exactly those bytes.
    ///
    /// # Arguments
    ///
    /// * `request`: The raw command frame to write.
    /// * `expected_response`: The literal answer, empty if none is expected.
    ///   At most `MAX_RESPONSE_LEN` bytes.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the command was written and acknowledged.
    /// * `Err(Error::Protocol)` if the response is too long to wait for, the write
    ///   was partial, or the sensor answered anything else.
    /// * `Err(Error::WriteFailure)` or `Err(Error::ReadFailure)` for serial communication issues.
    pub async fn send_command(
        &mut self,
        request: &[u8],
        expected_response: &'static [u8],
    ) -> Result<(), Error> {
        if expected_response.len() > MAX_RESPONSE_LEN {
            log::error!(
                "Expected response of {} bytes exceeds {} bytes",
                expected_response.len(),
                MAX_RESPONSE_LEN
            );
            return Err(ProtocolError::ResponseTooLong {
                len: expected_response.len(),
                max: MAX_RESPONSE_LEN,
            }
            .into());
        }

        debug!("Executing command: {:02X?}", request);
        let written = self
            .serial
            .write(request)
            .await
            .map_err(|_| Error::WriteFailure)?;
        if written != request.len() {
            log::error!(
                "Failed to write command, {} of {} bytes written",
                written,
                request.len()
            );
            return Err(ProtocolError::ShortWrite {
                expected: request.len(),
                written,
            }
            .into());
        }
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?;

        if expected_response.is_empty() {
            return Ok(());
        }

        self.delay.delay_ms(self.config.response_delay_ms).await;

        let mut buffer = [0u8; MAX_RESPONSE_LEN];
        let response = &mut buffer[..expected_response.len()];
        match sync::read_exact(&mut self.serial, response).await {
            Ok(()) => {}
            Err(Error::ShortRead { .. }) => {
                log::error!("Incomplete response, expecting: {:02X?}", expected_response);
                return Err(ProtocolError::IncompleteResponse {
                    expected: expected_response,
                }
                .into());
            }
            Err(e) => return Err(e),
        }
        let response = &*response;
        if response != expected_response {
            log::error!(
                "Unexpected response, expecting: {:02X?}, getting: {:02X?}",
                expected_response,
                response
            );
            return Err(ProtocolError::UnexpectedResponse {
                expected: expected_response,
                received: ResponseBytes::new(response),
            }
            .into());
        }

        debug!("Command acknowledged: {:02X?}", response);
        Ok(())
    }

    async fn execute(&mut self, command: ModeCommand) -> Result<(), Error> {
        debug!("Sending {:?}", command);
        self.send_command(command.request(), command.response()).await
    }

    /// Current reporting mode as tracked by this session.
    pub fn reporting_mode(&self) -> DeviceMode {
        self.reporting_mode
    }

    /// Current power state as tracked by this session.
    pub fn operational_state(&self) -> OperationalState {
        self.state
    }

    /// The configuration this session was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the serial interface and delay provider.
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }
}
