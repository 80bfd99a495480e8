//! Turning search histograms into index subsets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qsum_hal::Counts;

use crate::error::{SearchError, SearchResult};
use crate::instance::ProblemInstance;

/// One decoded peak of the search histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subset {
    /// Indicator string, character `i` for number `i`.
    pub bitstring: String,
    /// Indices whose bit is set.
    pub indices: Vec<usize>,
    /// Shots that produced this bitstring.
    pub count: u64,
    /// `count` over total shots.
    pub frequency: f64,
}

impl Subset {
    /// Index mask, bit `i` for number `i`.
    pub fn mask(&self) -> u64 {
        self.indices.iter().fold(0u64, |m, &i| m | (1u64 << i))
    }

    /// Whether the selected numbers really add up to the target.
    pub fn satisfies(&self, instance: &ProblemInstance) -> bool {
        instance.subset_sum(self.mask()) == instance.target()
    }
}

/// Selects the peaks of a histogram over the index register.
///
/// A bitstring is a peak when its count exceeds `baseline_factor` times the
/// uniform expectation `shots / 2^N` and is at least `peak_ratio` times the
/// largest count. Several peaks are normal when there are several solutions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDecoder {
    /// Multiple of the uniform floor a peak must exceed.
    #[serde(default = "default_baseline_factor")]
    pub baseline_factor: f64,

    /// Fraction of the largest count a peak must reach.
    #[serde(default = "default_peak_ratio")]
    pub peak_ratio: f64,
}

fn default_baseline_factor() -> f64 {
    1.5
}

fn default_peak_ratio() -> f64 {
    0.5
}

impl Default for MeasurementDecoder {
    fn default() -> Self {
        Self {
            baseline_factor: default_baseline_factor(),
            peak_ratio: default_peak_ratio(),
        }
    }
}

impl MeasurementDecoder {
    /// Count a bitstring must exceed to clear the uniform floor.
    #[allow(clippy::cast_precision_loss)]
    pub fn floor(&self, shots: u64, index_width: u32) -> f64 {
        self.baseline_factor * shots as f64 / (1u64 << index_width) as f64
    }

    /// Peaks of `counts`, most frequent first.
    ///
    /// Fails with [`SearchError::AmbiguousMeasurement`] when nothing clears
    /// the floor.
    #[allow(clippy::cast_precision_loss)]
    pub fn decode(&self, counts: &Counts, index_width: u32) -> SearchResult<Vec<Subset>> {
        let shots = counts.total_shots();
        let sorted = counts.sorted();
        let Some(&(_, top)) = sorted.first() else {
            return Err(SearchError::AmbiguousMeasurement("histogram is empty".into()));
        };

        let floor = self.floor(shots, index_width);
        let top = *top;
        let cutoff = self.peak_ratio * top as f64;

        let peaks: Vec<Subset> = sorted
            .iter()
            .take_while(|(_, n)| **n as f64 > floor && **n as f64 >= cutoff)
            .map(|(bits, n)| Subset {
                bitstring: (*bits).clone(),
                indices: bits
                    .chars()
                    .enumerate()
                    .filter(|(_, c)| *c == '1')
                    .map(|(i, _)| i)
                    .collect(),
                count: **n,
                frequency: **n as f64 / shots as f64,
            })
            .collect();

        if peaks.is_empty() {
            return Err(SearchError::AmbiguousMeasurement(format!(
                "most frequent outcome has {top} of {shots} shots, floor is {floor:.1}"
            )));
        }

        debug!(peaks = peaks.len(), floor, "decoded histogram");
        Ok(peaks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_near_equal_peaks() {
        let counts = Counts::from_pairs([
            ("1001", 470),
            ("0110", 455),
            ("0000", 10),
            ("1111", 9),
            ("0101", 8),
        ]);
        let subsets = MeasurementDecoder::default().decode(&counts, 4).unwrap();

        assert_eq!(subsets.len(), 2);
        assert_eq!(subsets[0].bitstring, "1001");
        assert_eq!(subsets[0].indices, vec![0, 3]);
        assert_eq!(subsets[1].indices, vec![1, 2]);
        assert_eq!(subsets[1].mask(), 0b0110);
    }

    #[test]
    fn test_uniform_histogram_is_ambiguous() {
        let counts = Counts::from_pairs([("00", 26), ("01", 25), ("10", 24), ("11", 25)]);
        let err = MeasurementDecoder::default().decode(&counts, 2).unwrap_err();
        assert!(matches!(err, SearchError::AmbiguousMeasurement(_)));
    }

    #[test]
    fn test_minor_peak_below_ratio_dropped() {
        let counts = Counts::from_pairs([("100", 700), ("010", 200), ("001", 100)]);
        let subsets = MeasurementDecoder::default().decode(&counts, 3).unwrap();
        assert_eq!(subsets.len(), 1);
        assert!((subsets[0].frequency - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_subset_satisfies() {
        let inst = ProblemInstance::new(vec![1, 2, 3, 4], 5).unwrap();
        let subset = Subset {
            bitstring: "1001".into(),
            indices: vec![0, 3],
            count: 1,
            frequency: 1.0,
        };
        assert!(subset.satisfies(&inst));
    }

    #[test]
    fn test_decoder_defaults_from_yaml() {
        let decoder: MeasurementDecoder = serde_yaml_ng::from_str("peak_ratio: 0.25").unwrap();
        assert!((decoder.baseline_factor - 1.5).abs() < 1e-12);
        assert!((decoder.peak_ratio - 0.25).abs() < 1e-12);
    }
}
