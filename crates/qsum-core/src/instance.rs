//! Problem instances.

use serde::Serialize;
use std::fmt;

use crate::error::{SearchError, SearchResult};

/// Largest list the index register may encode.
pub const MAX_NUMBERS: usize = 32;

/// A subset-sum instance: find index subsets of `numbers` summing to `target`.
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemInstance {
    numbers: Vec<u64>,
    target: u64,
    max_sum: u64,
}

impl ProblemInstance {
    /// Validate and build an instance.
    ///
    /// Rejects empty lists, negative values and targets above the sum of
    /// all numbers with [`SearchError::InfeasibleInstance`].
    pub fn new(numbers: Vec<i64>, target: i64) -> SearchResult<Self> {
        if numbers.is_empty() {
            return Err(SearchError::InfeasibleInstance(
                "the list of numbers is empty".into(),
            ));
        }
        if numbers.len() > MAX_NUMBERS {
            return Err(SearchError::InfeasibleInstance(format!(
                "{} numbers exceed the supported maximum of {MAX_NUMBERS}",
                numbers.len()
            )));
        }
        let target = u64::try_from(target).map_err(|_| {
            SearchError::InfeasibleInstance(format!("target {target} is negative"))
        })?;

        let mut values = Vec::with_capacity(numbers.len());
        let mut max_sum = 0u64;
        for (i, n) in numbers.into_iter().enumerate() {
            let v = u64::try_from(n).map_err(|_| {
                SearchError::InfeasibleInstance(format!("number {i} ({n}) is negative"))
            })?;
            max_sum = max_sum.checked_add(v).ok_or_else(|| {
                SearchError::InfeasibleInstance("sum of the numbers overflows".into())
            })?;
            values.push(v);
        }

        if target > max_sum {
            return Err(SearchError::InfeasibleInstance(format!(
                "target {target} exceeds the largest reachable sum {max_sum}"
            )));
        }

        Ok(Self {
            numbers: values,
            target,
            max_sum,
        })
    }

    /// The numbers, in index order.
    pub fn numbers(&self) -> &[u64] {
        &self.numbers
    }

    /// The target sum.
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Number of numbers, i.e. the width of the index register.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Always false: empty instances are rejected.
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Width of the index register.
    pub fn index_width(&self) -> u32 {
        self.numbers.len() as u32
    }

    /// Sum of every number.
    pub fn max_sum(&self) -> u64 {
        self.max_sum
    }

    /// Qubits needed to hold every reachable sum, at least one.
    pub fn sum_width(&self) -> u32 {
        bit_width(self.max_sum).max(1)
    }

    /// Number of index configurations, `2^N`.
    pub fn search_space(&self) -> u64 {
        1u64 << self.numbers.len()
    }

    /// Sum of the numbers selected by `mask` (bit `i` selects number `i`).
    pub fn subset_sum(&self, mask: u64) -> u64 {
        self.numbers
            .iter()
            .enumerate()
            .filter(|(i, _)| (mask >> i) & 1 == 1)
            .map(|(_, v)| *v)
            .sum()
    }

    /// Every satisfying index mask, by classical enumeration.
    pub fn solutions(&self) -> Vec<u64> {
        (0..self.search_space())
            .filter(|&mask| self.subset_sum(mask) == self.target)
            .collect()
    }

    /// Number of satisfying index masks.
    pub fn solution_count(&self) -> u64 {
        self.solutions().len() as u64
    }

    /// Render `mask` as an indicator string, character `i` for number `i`.
    pub fn indicator(&self, mask: u64) -> String {
        (0..self.numbers.len())
            .map(|i| if (mask >> i) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for ProblemInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} -> {}", self.numbers, self.target)
    }
}

/// Bits needed to write `value` in binary; zero for zero.
pub(crate) fn bit_width(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}
