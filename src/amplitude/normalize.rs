//! Mapping of raw signal readings into bounded visual amplitudes.
//!
//! Decibel readings go through a clamp, a linear rescale, a power-law response
//! curve and an optional floor remap. The defaults (-60..0 dB, squared
//! response, 5% floor) give low-level speech a visible height while keeping
//! silence distinguishable from a flat zero line.

use super::error::CurveError;

/// Lowest dBFS value reported for digital silence.
pub const SILENCE_DB: f32 = -160.0;

/// Default lower decibel bound (treated as silence).
pub const DEFAULT_MIN_DB: f32 = -60.0;

/// Default upper decibel bound (full scale).
pub const DEFAULT_MAX_DB: f32 = 0.0;

/// Default response curve exponent.
pub const DEFAULT_EXPONENT: f32 = 2.0;

/// Default floor, the height of a silent reading.
pub const DEFAULT_FLOOR: f32 = 0.05;

/// Configured decibel-to-amplitude response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationCurve {
    min_db: f32,
    max_db: f32,
    exponent: f32,
    floor: f32,
}

impl Default for NormalizationCurve {
    fn default() -> Self {
        Self {
            min_db: DEFAULT_MIN_DB,
            max_db: DEFAULT_MAX_DB,
            exponent: DEFAULT_EXPONENT,
            floor: DEFAULT_FLOOR,
        }
    }
}

impl NormalizationCurve {
    /// Creates a curve after validating its parameters.
    ///
    /// # Errors
    /// - If either bound is not finite
    /// - If `min_db >= max_db`
    /// - If `exponent` is not a positive finite number
    /// - If `floor` is outside `[0, 1)`
    pub fn new(min_db: f32, max_db: f32, exponent: f32, floor: f32) -> Result<Self, CurveError> {
        if !min_db.is_finite() || !max_db.is_finite() {
            return Err(CurveError::NonFiniteBounds);
        }
        if min_db >= max_db {
            return Err(CurveError::InvertedRange { min_db, max_db });
        }
        if !exponent.is_finite() || exponent <= 0.0 {
            return Err(CurveError::InvalidExponent(exponent));
        }
        if !(0.0..1.0).contains(&floor) {
            return Err(CurveError::InvalidFloor(floor));
        }

        Ok(Self {
            min_db,
            max_db,
            exponent,
            floor,
        })
    }

    pub fn min_db(&self) -> f32 {
        self.min_db
    }

    pub fn max_db(&self) -> f32 {
        self.max_db
    }

    pub fn exponent(&self) -> f32 {
        self.exponent
    }

    /// Amplitude of a reading at or below `min_db`.
    pub fn floor(&self) -> f32 {
        self.floor
    }

    /// Normalizes a power reading in decibels into `[floor, 1]`.
    ///
    /// Out-of-range readings are clamped; NaN counts as silence. Computed in
    /// f64 so that both bounds map exactly onto `floor` and `1.0`.
    pub fn normalize_db(&self, db: f32) -> f32 {
        let db = if db.is_nan() { self.min_db } else { db };
        let clamped = f64::from(db.clamp(self.min_db, self.max_db));

        let min = f64::from(self.min_db);
        let range = f64::from(self.max_db) - min;
        let linear = (clamped - min) / range;
        let curved = linear.powf(f64::from(self.exponent));

        let floor = f64::from(self.floor);
        let scaled = floor + (1.0 - floor) * curved;

        (scaled as f32).clamp(0.0, 1.0)
    }

    /// Clamps a linear magnitude (peak detection output) into `[0, 1]`.
    ///
    /// The floor is not applied: silence in a stored file stays at zero.
    pub fn normalize_linear(&self, magnitude: f32) -> f32 {
        normalize_linear(magnitude)
    }
}

/// Clamps a linear magnitude into `[0, 1]`, mapping NaN to zero.
pub fn normalize_linear(magnitude: f32) -> f32 {
    if magnitude.is_nan() {
        0.0
    } else {
        magnitude.abs().clamp(0.0, 1.0)
    }
}

/// Average power of 16-bit PCM samples in dBFS.
///
/// Uses the RMS of the block relative to full scale. An empty or all-zero
/// block reports [`SILENCE_DB`].
pub fn power_db_from_samples(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return SILENCE_DB;
    }

    let sum_of_squares: f64 = samples.iter().map(|&s| f64::from(s).powi(2)).sum();
    let rms = (sum_of_squares / samples.len() as f64).sqrt();

    if rms > 0.0 {
        ((20.0 * (rms / f64::from(i16::MAX)).log10()) as f32).max(SILENCE_DB)
    } else {
        SILENCE_DB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_map_exactly() {
        let curve = NormalizationCurve::default();
        assert_eq!(curve.normalize_db(curve.min_db()), curve.floor());
        assert_eq!(curve.normalize_db(curve.max_db()), 1.0);

        let no_floor = NormalizationCurve::new(-50.0, 0.0, 1.0, 0.0).unwrap();
        assert_eq!(no_floor.normalize_db(-50.0), 0.0);
        assert_eq!(no_floor.normalize_db(0.0), 1.0);
    }

    #[test]
    fn test_out_of_range_readings_are_clamped() {
        let curve = NormalizationCurve::default();
        assert_eq!(curve.normalize_db(-120.0), curve.floor());
        assert_eq!(curve.normalize_db(SILENCE_DB), curve.floor());
        assert_eq!(curve.normalize_db(f32::NEG_INFINITY), curve.floor());
        assert_eq!(curve.normalize_db(12.0), 1.0);
        assert_eq!(curve.normalize_db(f32::INFINITY), 1.0);
        assert_eq!(curve.normalize_db(f32::NAN), curve.floor());
    }

    #[test]
    fn test_output_bounded_and_monotonic() {
        let curves = [
            NormalizationCurve::default(),
            NormalizationCurve::new(-50.0, 0.0, 2.0, 0.2).unwrap(),
            NormalizationCurve::new(-60.0, 0.0, 1.0, 0.0).unwrap(),
            NormalizationCurve::new(-80.0, -10.0, 0.5, 0.0).unwrap(),
        ];

        for curve in curves {
            let mut previous = f32::MIN;
            let mut db = -100.0_f32;
            while db <= 10.0 {
                let value = curve.normalize_db(db);
                assert!((0.0..=1.0).contains(&value), "{value} out of range at {db} dB");
                assert!(value >= previous, "not monotonic at {db} dB");
                previous = value;
                db += 0.1;
            }
        }
    }

    #[test]
    fn test_squared_response_midpoint() {
        let curve = NormalizationCurve::new(-60.0, 0.0, 2.0, 0.0).unwrap();
        // Halfway in dB is a quarter after squaring.
        assert!((curve.normalize_db(-30.0) - 0.25).abs() < 1e-6);

        let floored = NormalizationCurve::default();
        let expected = 0.05 + 0.95 * 0.25;
        assert!((floored.normalize_db(-30.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_curves_are_rejected() {
        assert_eq!(
            NormalizationCurve::new(0.0, -60.0, 2.0, 0.0),
            Err(CurveError::InvertedRange {
                min_db: 0.0,
                max_db: -60.0
            })
        );
        assert_eq!(
            NormalizationCurve::new(-60.0, 0.0, 0.0, 0.0),
            Err(CurveError::InvalidExponent(0.0))
        );
        assert_eq!(
            NormalizationCurve::new(-60.0, 0.0, 2.0, 1.0),
            Err(CurveError::InvalidFloor(1.0))
        );
        assert_eq!(
            NormalizationCurve::new(f32::NEG_INFINITY, 0.0, 2.0, 0.0),
            Err(CurveError::NonFiniteBounds)
        );
    }

    #[test]
    fn test_normalize_linear() {
        assert_eq!(normalize_linear(0.0), 0.0);
        assert_eq!(normalize_linear(0.4), 0.4);
        assert_eq!(normalize_linear(-0.4), 0.4);
        assert_eq!(normalize_linear(3.0), 1.0);
        assert_eq!(normalize_linear(f32::NAN), 0.0);
    }

    #[test]
    fn test_power_db_from_samples() {
        assert_eq!(power_db_from_samples(&[]), SILENCE_DB);
        assert_eq!(power_db_from_samples(&[0; 64]), SILENCE_DB);

        let full_scale = vec![i16::MAX; 64];
        assert!(power_db_from_samples(&full_scale).abs() < 1e-3);

        let half_scale = vec![i16::MAX / 2; 64];
        assert!((power_db_from_samples(&half_scale) + 6.02).abs() < 0.05);
    }
}
