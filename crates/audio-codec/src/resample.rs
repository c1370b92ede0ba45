/// Linear-interpolation resampling, clipped to `i16` range. This is the
/// fallback path a polyphase/FFT resampler would otherwise take precedence
/// over; no such resampler is used here (see DESIGN.md).
pub fn resample_i16(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let duration = samples.len() as f64 / from_rate as f64;
    let new_length = (duration * to_rate as f64) as usize;
    if new_length == 0 {
        return Vec::new();
    }

    let src_len = samples.len();
    let mut out = Vec::with_capacity(new_length);

    for i in 0..new_length {
        // Position in source-sample space, matching np.linspace(0,1,n)
        // interpolation: both axes span [0, 1] regardless of length.
        let t = if new_length == 1 {
            0.0
        } else {
            i as f64 / (new_length - 1) as f64
        };
        let src_pos = t * (src_len - 1).max(1) as f64;
        let lo = src_pos.floor() as usize;
        let hi = (lo + 1).min(src_len - 1);
        let frac = src_pos - lo as f64;

        let value = samples[lo] as f64 * (1.0 - frac) + samples[hi] as f64 * frac;
        out.push(value.clamp(i16::MIN as f64, i16::MAX as f64) as i16);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_rate_is_identity() {
        let samples = vec![1, 2, 3, 4];
        assert_eq!(resample_i16(&samples, 48_000, 48_000), samples);
    }

    #[test]
    fn downsamples_to_expected_length() {
        let samples = vec![0i16; 48_000 / 10]; // 100ms @ 48kHz
        let out = resample_i16(&samples, 48_000, 16_000);
        assert_eq!(out.len(), 16_000 / 10);
    }

    #[test]
    fn round_trip_preserves_length_within_one_sample() {
        let samples: Vec<i16> = (0..48_000).map(|i| (i % 100) as i16).collect();
        let down = resample_i16(&samples, 48_000, 16_000);
        let back = resample_i16(&down, 16_000, 48_000);
        assert!((back.len() as i64 - samples.len() as i64).abs() <= 1);
    }
}
