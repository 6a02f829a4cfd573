use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

use crate::SensorReading;

/// A scripted serial port. Reads drain `rx`; writes are recorded in `tx`.
///
/// Once `rx` is empty every read returns `Ok(0)`.
#[derive(Default)]
pub struct MockSerial {
    pub rx: VecDeque<u8>,
    pub tx: Vec<Vec<u8>>,
    pub reads: usize,
    /// Caps the number of bytes accepted by the next writes.
    pub write_limit: Option<usize>,
    /// Fails every read call after the first `n` calls.
    pub fail_read_after: Option<usize>,
    /// Fails every write.
    pub fail_write: bool,
}

/// Transport failure injected by `MockSerial`.
#[derive(Debug)]
pub struct MockError;

impl embedded_io_async::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl MockSerial {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_rx(bytes: &[u8]) -> Self {
        let mut serial = Self::new();
        serial.push_rx(bytes);
        serial
    }

    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn remaining(&self) -> Vec<u8> {
        self.rx.iter().copied().collect()
    }
}

impl ErrorType for MockSerial {
    type Error = MockError;
}

impl Read for MockSerial {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.reads += 1;
        if self.fail_read_after.is_some_and(|after| self.reads > after) {
            return Err(MockError);
        }
        let mut n = 0;
        while n < buf.len() {
            match self.rx.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl Write for MockSerial {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_write {
            return Err(MockError);
        }
        let n = self.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        self.tx.push(buf[..n].to_vec());
        Ok(n)
    }
}

/// Records requested delays without sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}

pub fn sample_reading() -> SensorReading {
    SensorReading {
        frame_length: 28,
        pm1_0: 20,
        pm2_5: 37,
        pm10_0: 44,
        pm1_0_atm: 18,
        pm2_5_atm: 35,
        pm10_0_atm: 41,
        pcnt_0_3: 3150,
        pcnt_0_5: 912,
        pcnt_1_0: 190,
        pcnt_2_5: 12,
        pcnt_5_0: 3,
        pcnt_10_0: 1,
        version: 0x91,
        error: 0,
        checksum: 0,
    }
}
