use log::debug;

use crate::{Error, FrameProfile, FRAME_LEN, MAGIC_1, MAGIC_2};

/// A single, checksum-verified measurement frame from the PMS7003 sensor.
///
/// Concentrations are in µg/m³, particle counts are per 0.1 L of air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorReading {
    /// Number of bytes following the length field, 28 on a PMS7003.
    pub frame_length: u16,
    /// PM1.0 concentration, standard particle.
    pub pm1_0: u16,
    /// PM2.5 concentration, standard particle.
    pub pm2_5: u16,
    /// PM10 concentration, standard particle.
    pub pm10_0: u16,
    /// PM1.0 concentration, atmospheric environment.
    pub pm1_0_atm: u16,
    /// PM2.5 concentration, atmospheric environment.
    pub pm2_5_atm: u16,
    /// PM10 concentration, atmospheric environment.
    pub pm10_0_atm: u16,
    /// Particles with diameter beyond 0.3 µm.
    pub pcnt_0_3: u16,
    /// Particles with diameter beyond 0.5 µm.
    pub pcnt_0_5: u16,
    /// Particles with diameter beyond 1.0 µm.
    pub pcnt_1_0: u16,
    /// Particles with diameter beyond 2.5 µm.
    pub pcnt_2_5: u16,
    /// Particles with diameter beyond 5.0 µm.
    pub pcnt_5_0: u16,
    /// Particles with diameter beyond 10 µm.
    pub pcnt_10_0: u16,
    pub version: u8,
    /// Device status byte.
    pub error: u8,
    pub checksum: u16,
}

impl SensorReading {
    /// Air quality index derived from the atmospheric PM2.5 and PM10 values.
    pub fn aqi(&self) -> f64 {
        crate::aqi::aqi(f64::from(self.pm2_5_atm), f64::from(self.pm10_0_atm))
    }

    /// Serializes the reading into a full wire frame, magic bytes included.
    ///
    /// The checksum is recomputed from the fields; `self.checksum` is ignored.
    pub fn to_frame(&self) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = MAGIC_1;
        frame[1] = MAGIC_2;
        let words = [
            self.frame_length,
            self.pm1_0,
            self.pm2_5,
            self.pm10_0,
            self.pm1_0_atm,
            self.pm2_5_atm,
            self.pm10_0_atm,
            self.pcnt_0_3,
            self.pcnt_0_5,
            self.pcnt_1_0,
            self.pcnt_2_5,
            self.pcnt_5_0,
            self.pcnt_10_0,
        ];
        for (i, word) in words.iter().enumerate() {
            frame[2 + i * 2..4 + i * 2].copy_from_slice(&word.to_be_bytes());
        }
        frame[28] = self.version;
        frame[29] = self.error;
        let checksum = sum_bytes(0, &frame[..30]);
        frame[30..].copy_from_slice(&checksum.to_be_bytes());
        frame
    }
}

// Adds bytes into a 16-bit running sum, wrapping on overflow.
fn sum_bytes(seed: u16, bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(seed, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Computes the frame checksum over everything in `body` that precedes the
/// trailing 2-byte checksum field.
///
/// With the standard profile the magic bytes are not part of `body` and are
/// added to the sum separately.
pub fn checksum(profile: FrameProfile, body: &[u8]) -> u16 {
    let payload = &body[..body.len().saturating_sub(2)];
    match profile {
        FrameProfile::Standard => sum_bytes(u16::from(MAGIC_1) + u16::from(MAGIC_2), payload),
        FrameProfile::WithMagicInBody => sum_bytes(0, payload),
    }
}

/// Validates and decodes a frame body.
///
/// `body` must be exactly `profile.body_len()` bytes long. A checksum
/// mismatch yields `Error::BadChecksum`.
pub fn decode_frame(profile: FrameProfile, body: &[u8]) -> Result<SensorReading, Error> {
    if body.len() != profile.body_len() {
        debug!(
            "Frame body has {} bytes, expected {} for {:?}",
            body.len(),
            profile.body_len(),
            profile
        );
        return Err(Error::InvalidFrame);
    }

    let fields = match profile {
        FrameProfile::Standard => body,
        FrameProfile::WithMagicInBody => {
            if body[0] != MAGIC_1 || body[1] != MAGIC_2 {
                debug!("Frame body does not start with magic bytes: {:02X?}", &body[..2]);
                return Err(Error::InvalidFrame);
            }
            &body[2..]
        }
    };

    let word = |i: usize| u16::from_be_bytes([fields[i * 2], fields[i * 2 + 1]]);
    let transmitted = u16::from_be_bytes([fields[28], fields[29]]);
    let computed = checksum(profile, body);
    if computed != transmitted {
        return Err(Error::BadChecksum {
            transmitted,
            computed,
        });
    }

    Ok(SensorReading {
        frame_length: word(0),
        pm1_0: word(1),
        pm2_5: word(2),
        pm10_0: word(3),
        pm1_0_atm: word(4),
        pm2_5_atm: word(5),
        pm10_0_atm: word(6),
        pcnt_0_3: word(7),
        pcnt_0_5: word(8),
        pcnt_1_0: word(9),
        pcnt_2_5: word(10),
        pcnt_5_0: word(11),
        pcnt_10_0: word(12),
        version: fields[26],
        error: fields[27],
        checksum: transmitted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::sample_reading;

    #[test]
    fn decodes_standard_body() {
        let reading = sample_reading();
        let frame = reading.to_frame();
        let decoded = decode_frame(FrameProfile::Standard, &frame[2..]).unwrap();
        assert_eq!(decoded.pm2_5_atm, 35);
        assert_eq!(decoded.pcnt_10_0, 1);
        assert_eq!(decoded.version, 0x91);
        assert_eq!(decoded.checksum, u16::from_be_bytes([frame[30], frame[31]]));
        assert_eq!(
            SensorReading {
                checksum: 0,
                ..decoded
            },
            reading
        );
    }

    #[test]
    fn decodes_body_with_magic() {
        let frame = sample_reading().to_frame();
        let standard = decode_frame(FrameProfile::Standard, &frame[2..]).unwrap();
        let with_magic = decode_frame(FrameProfile::WithMagicInBody, &frame).unwrap();
        assert_eq!(standard, with_magic);
    }

    #[test]
    fn decodes_a_literal_frame() {
        let frame: [u8; 32] = [
            0x42, 0x4D, 0x00, 0x1C, 0x00, 0x0B, 0x00, 0x0E, 0x00, 0x10, 0x00, 0x0A, 0x00, 0x0A,
            0x00, 0x10, 0x07, 0x8F, 0x02, 0x3E, 0x00, 0x5E, 0x00, 0x0C, 0x00, 0x04, 0x00, 0x02,
            0x97, 0x00, 0x02, 0xD5,
        ];
        let reading = decode_frame(FrameProfile::Standard, &frame[2..]).unwrap();
        assert_eq!(reading.frame_length, 28);
        assert_eq!(reading.pm1_0, 11);
        assert_eq!(reading.pm2_5, 14);
        assert_eq!(reading.pm10_0, 16);
        assert_eq!(reading.pm2_5_atm, 10);
        assert_eq!(reading.pm10_0_atm, 16);
        assert_eq!(reading.pcnt_0_3, 1935);
        assert_eq!(reading.version, 0x97);
        assert_eq!(reading.error, 0);
        assert_eq!(reading.checksum, 0x02D5);
    }

    #[test]
    fn corrupted_byte_fails_checksum() {
        let mut frame = sample_reading().to_frame();
        frame[13] ^= 0x01;
        assert!(matches!(
            decode_frame(FrameProfile::Standard, &frame[2..]),
            Err(Error::BadChecksum { .. })
        ));
        assert!(matches!(
            decode_frame(FrameProfile::WithMagicInBody, &frame),
            Err(Error::BadChecksum { .. })
        ));
    }

    #[test]
    fn checksum_covers_every_byte_before_the_trailer() {
        let reading = SensorReading {
            pcnt_0_3: 0xFFFF,
            pcnt_0_5: 0xFFFF,
            pcnt_1_0: 0xFFFF,
            pcnt_2_5: 0xFFFF,
            pcnt_5_0: 0xFFFF,
            pcnt_10_0: 0xFFFF,
            pm1_0: 0xFFFF,
            pm2_5: 0xFFFF,
            pm10_0: 0xFFFF,
            pm1_0_atm: 0xFFFF,
            pm2_5_atm: 0xFFFF,
            pm10_0_atm: 0xFFFF,
            frame_length: 0xFFFF,
            version: 0xFF,
            error: 0xFF,
            checksum: 0,
        };
        let frame = reading.to_frame();
        // 0x42 + 0x4D + 28 * 0xFF
        assert_eq!(u16::from_be_bytes([frame[30], frame[31]]), 0x1C73);
        assert!(decode_frame(FrameProfile::Standard, &frame[2..]).is_ok());
    }

    #[test]
    fn rejects_wrong_length_and_missing_magic() {
        let mut frame = sample_reading().to_frame();
        assert_eq!(
            decode_frame(FrameProfile::Standard, &frame),
            Err(Error::InvalidFrame)
        );
        assert_eq!(
            decode_frame(FrameProfile::WithMagicInBody, &frame[2..]),
            Err(Error::InvalidFrame)
        );
        frame[1] = 0x00;
        assert_eq!(
            decode_frame(FrameProfile::WithMagicInBody, &frame),
            Err(Error::InvalidFrame)
        );
    }
}
