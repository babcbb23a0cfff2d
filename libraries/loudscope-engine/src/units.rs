//! Level conversions and the silence sentinel

/// Offset of the BS.1770 loudness formula
pub const LOUDNESS_OFFSET: f64 = -0.691;

/// Added to linear peaks before taking the logarithm
pub const PEAK_EPSILON: f64 = 1e-5;

/// Reported peak level for digital silence (`20·log10(ε)`, -100 dB)
pub const PEAK_FLOOR_DB: f64 = -100.0;

/// Loudness of a mean-square power: `-0.691 + 10·log10(p)`
///
/// Silence (`p <= 0`) maps to `f64::NEG_INFINITY`.
#[inline]
pub fn power_to_lufs(mean_square: f64) -> f64 {
    if mean_square > 0.0 {
        LOUDNESS_OFFSET + 10.0 * mean_square.log10()
    } else {
        f64::NEG_INFINITY
    }
}

/// Inverse of [`power_to_lufs`]; the silence sentinel maps back to 0
#[inline]
pub fn lufs_to_power(lufs: f64) -> f64 {
    if lufs == f64::NEG_INFINITY {
        0.0
    } else {
        10.0_f64.powf((lufs - LOUDNESS_OFFSET) / 10.0)
    }
}

/// Linear peak to dB with the epsilon floor
#[inline]
pub fn peak_to_db(linear: f64) -> f64 {
    20.0 * (linear + PEAK_EPSILON).log10()
}

/// Serde helpers writing non-finite levels as `null`
///
/// JSON has no representation for infinity; the silence sentinel travels
/// as `null` and reads back as `f64::NEG_INFINITY`.
pub mod sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }

    /// Same mapping for whole series
    pub mod vec {
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for value in values {
                if value.is_finite() {
                    seq.serialize_element(value)?;
                } else {
                    seq.serialize_element(&Option::<f64>::None)?;
                }
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<f64>, D::Error> {
            let values = Vec::<Option<f64>>::deserialize(deserializer)?;
            Ok(values
                .into_iter()
                .map(|v| v.unwrap_or(f64::NEG_INFINITY))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_to_lufs() {
        assert_eq!(power_to_lufs(0.0), f64::NEG_INFINITY);
        assert_eq!(power_to_lufs(-1e-20), f64::NEG_INFINITY);
        assert!((power_to_lufs(1.0) - LOUDNESS_OFFSET).abs() < 1e-12);
        assert!((power_to_lufs(0.01) - (-20.691)).abs() < 1e-12);
    }

    #[test]
    fn test_lufs_power_inverse() {
        for lufs in [-70.0, -23.0, -14.0, -0.691] {
            let back = power_to_lufs(lufs_to_power(lufs));
            assert!((back - lufs).abs() < 1e-9);
        }
        assert_eq!(lufs_to_power(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_peak_floor() {
        assert!((peak_to_db(0.0) - PEAK_FLOOR_DB).abs() < 1e-9);
        assert!(peak_to_db(1.0).abs() < 1e-4);
    }
}
