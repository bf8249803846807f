//! Captured spike snapshots.

use crate::{Error, MetricPoint, Result, Rgb};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw sample value corresponding to 0 µV.
pub const SAMPLE_BASELINE: u16 = 32768;

/// A single detected spike as delivered by the acquisition pipeline.
///
/// Samples are stored channel-major: channel `c` occupies
/// `samples[c * samples_per_channel..(c + 1) * samples_per_channel]`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spike {
    samples: Vec<u16>,
    channels: usize,
    /// Gain scalar converting raw offsets to millivolts.
    pub gain: f64,
    /// Position in principal-component space (PC1, PC2).
    pub projection: MetricPoint,
    /// Display colour, usually the colour of the unit it was sorted into.
    pub color: Rgb,
}

impl Spike {
    /// Creates a spike from channel-major samples.
    ///
    /// # Errors
    /// Returns [`Error::SampleLayout`] when `channels` is zero or the
    /// sample count is not a multiple of it.
    pub fn new(
        samples: Vec<u16>,
        channels: usize,
        gain: f64,
        projection: MetricPoint,
        color: Rgb,
    ) -> Result<Self> {
        if channels == 0 || samples.len() % channels != 0 {
            return Err(Error::SampleLayout {
                samples: samples.len(),
                channels,
            });
        }
        Ok(Self {
            samples,
            channels,
            gain,
            projection,
            color,
        })
    }

    /// The canonical empty spike used to reset buffer slots.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the spike carries no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of samples per channel.
    pub fn samples_per_channel(&self) -> usize {
        self.samples.len().checked_div(self.channels).unwrap_or(0)
    }

    /// Raw samples of one channel, empty if the channel does not exist.
    pub fn channel(&self, channel: usize) -> &[u16] {
        let n = self.samples_per_channel();
        if channel >= self.channels {
            return &[];
        }
        &self.samples[channel * n..(channel + 1) * n]
    }

    /// Samples of one channel converted to microvolts.
    ///
    /// Yields nothing when the gain is zero.
    pub fn channel_microvolts(&self, channel: usize) -> impl Iterator<Item = f64> + '_ {
        let gain = self.gain;
        let samples = if gain == 0.0 { &[][..] } else { self.channel(channel) };
        samples
            .iter()
            .map(move |&raw| (f64::from(raw) - f64::from(SAMPLE_BASELINE)) / gain * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tetrode_spike() -> Spike {
        let mut samples = Vec::new();
        for c in 0..4u16 {
            for i in 0..40u16 {
                samples.push(SAMPLE_BASELINE + c * 100 + i);
            }
        }
        Spike::new(samples, 4, 2000.0, MetricPoint::new(1.0, 2.0), Rgb::WHITE).unwrap()
    }

    #[test]
    fn test_channel_slicing() {
        let spike = tetrode_spike();
        assert_eq!(spike.channels(), 4);
        assert_eq!(spike.samples_per_channel(), 40);
        assert_eq!(spike.channel(2)[0], SAMPLE_BASELINE + 200);
        assert!(spike.channel(4).is_empty());
    }

    #[test]
    fn test_microvolt_conversion() {
        let spike = tetrode_spike();
        let uv: Vec<f64> = spike.channel_microvolts(1).collect();
        assert_eq!(uv.len(), 40);
        assert_relative_eq!(uv[0], 100.0 / 2000.0 * 1000.0);
    }

    #[test]
    fn test_zero_gain_has_no_trace() {
        let mut spike = tetrode_spike();
        spike.gain = 0.0;
        assert_eq!(spike.channel_microvolts(0).count(), 0);
    }

    #[test]
    fn test_invalid_layout() {
        let err = Spike::new(vec![0; 7], 2, 1.0, MetricPoint::ORIGIN, Rgb::BLACK).unwrap_err();
        assert_eq!(
            err,
            Error::SampleLayout {
                samples: 7,
                channels: 2
            }
        );
        assert!(Spike::new(vec![], 0, 1.0, MetricPoint::ORIGIN, Rgb::BLACK).is_err());
    }

    #[test]
    fn test_empty_spike() {
        let spike = Spike::empty();
        assert!(spike.is_empty());
        assert_eq!(spike.samples_per_channel(), 0);
        assert!(spike.channel(0).is_empty());
    }
}
