//! US EPA air quality index, computed by piecewise-linear interpolation of a
//! concentration against fixed breakpoint tables.

/// One concentration range of a breakpoint table, `(C_low, C_high)`.
pub type Breakpoint = (f64, f64);

/// Index ranges `(I_low, I_high)`, shared by every pollutant table.
pub const INDEX_RANGES: [(f64, f64); 7] = [
    (0.0, 50.0),
    (51.0, 100.0),
    (101.0, 150.0),
    (151.0, 200.0),
    (201.0, 300.0),
    (301.0, 400.0),
    (401.0, 500.0),
];

/// PM2.5 concentration breakpoints in µg/m³.
pub const PM2_5: [Breakpoint; 7] = [
    (0.0, 12.0),
    (12.1, 35.4),
    (35.5, 55.4),
    (55.5, 150.4),
    (150.5, 250.4),
    (250.5, 350.4),
    (350.5, 500.4),
];

/// PM10 concentration breakpoints in µg/m³.
pub const PM10_0: [Breakpoint; 7] = [
    (0.0, 54.0),
    (55.0, 154.0),
    (155.0, 254.0),
    (255.0, 354.0),
    (355.0, 424.0),
    (425.0, 504.0),
    (505.0, 604.0),
];

/// Interpolates `concentration` against `table`.
///
/// The first range whose upper bound is not below `concentration` is used.
/// Values above the last bound extrapolate along the last range.
pub fn interpolate(table: &[Breakpoint; 7], concentration: f64) -> f64 {
    let index = table
        .iter()
        .position(|&(_, c_high)| concentration <= c_high)
        .unwrap_or(table.len() - 1);

    let (c_low, c_high) = table[index];
    let (i_low, i_high) = INDEX_RANGES[index];
    (i_high - i_low) / (c_high - c_low) * (concentration - c_low) + i_low
}

/// Index for a PM2.5 concentration alone.
pub fn pm2_5_index(concentration: f64) -> f64 {
    interpolate(&PM2_5, concentration)
}

/// Index for a PM10 concentration alone.
pub fn pm10_0_index(concentration: f64) -> f64 {
    interpolate(&PM10_0, concentration)
}

/// The overall index: the larger of the PM2.5 and PM10 indices.
pub fn aqi(pm2_5_atm: f64, pm10_0_atm: f64) -> f64 {
    pm2_5_index(pm2_5_atm).max(pm10_0_index(pm10_0_atm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_at_breakpoints() {
        for table in [&PM2_5, &PM10_0] {
            for (i, &(c_low, c_high)) in table.iter().enumerate() {
                assert_eq!(interpolate(table, c_high), INDEX_RANGES[i].1);
                assert_eq!(interpolate(table, c_low), INDEX_RANGES[i].0);
            }
        }
    }

    #[test]
    fn pm2_5_around_the_moderate_boundary() {
        assert_eq!(pm2_5_index(35.4), 100.0);
        assert_eq!(pm2_5_index(35.5), 101.0);
        let above = pm2_5_index(45.0);
        assert!(above > 101.0 && above < 150.0);
    }

    #[test]
    fn overall_index_is_driven_by_dominant_pollutant() {
        assert_eq!(aqi(35.4, 54.0), 100.0);
        assert_eq!(aqi(0.0, 154.0), 100.0);
        assert_eq!(aqi(0.0, 0.0), 0.0);
    }

    #[test]
    fn values_between_ranges_use_the_next_range() {
        // 12.05 is above the first range and below the second range start.
        let index = pm2_5_index(12.05);
        assert!(index < 51.0 && index > 50.0);
    }

    #[test]
    fn values_past_the_table_extrapolate_the_last_range() {
        assert!(pm10_0_index(700.0) > 500.0);
        assert!(pm2_5_index(600.0) > 500.0);
    }
}
