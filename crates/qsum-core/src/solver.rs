//! The end-to-end search: count, amplify, decode.
//!
//! ```text
//!   instance ──→ GroverIterator ──→ counting circuit ──run──→ M̂
//!                     │                                       │
//!                     │                          k* = round(π/4·√(N/M̂) − 1/2)
//!                     ▼                                       │
//!               search circuit (k* × G) ──run──→ histogram ──→ decoder
//! ```
//!
//! The executor is injected; the solver never creates one.

use std::sync::Arc;

use num_complex::Complex64;
use serde::Serialize;
use tracing::{info, instrument, warn};

use qsum_hal::{Backend, Counts};

use crate::config::SolverConfig;
use crate::counting::{CountEstimate, QuantumCounter};
use crate::decoder::Subset;
use crate::error::{SearchError, SearchResult};
use crate::grover::{GroverIterator, optimal_iterations};
use crate::instance::ProblemInstance;
use crate::layout::{Encoding, RegisterLayout};

/// How a search ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchStatus {
    /// Peaks were found; one subset per peak, most frequent first.
    Found {
        /// Decoded subsets.
        subsets: Vec<Subset>,
    },
    /// Counting estimated zero marked states; no search was run.
    NoSolution,
    /// The histogram had no clear peak.
    Inconclusive {
        /// Why decoding gave up.
        reason: String,
    },
}

/// Everything a search produced.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// The numbers searched.
    pub numbers: Vec<u64>,
    /// The target sum.
    pub target: u64,
    /// Oracle encoding used.
    pub encoding: Encoding,
    /// Work register sizes.
    pub layout: RegisterLayout,
    /// Counting register width, when counting ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counting_qubits: Option<u32>,
    /// Counting result, when counting ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<CountEstimate>,
    /// Grover iterations applied, when the search ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,
    /// Search histogram over the index register.
    pub histogram: Counts,
    /// Outcome.
    #[serde(flatten)]
    pub status: SearchStatus,
}

impl SearchReport {
    fn new(instance: &ProblemInstance, grover: &GroverIterator) -> Self {
        Self {
            numbers: instance.numbers().to_vec(),
            target: instance.target(),
            encoding: grover.encoding(),
            layout: *grover.layout(),
            counting_qubits: None,
            count: None,
            iterations: None,
            histogram: Counts::new(),
            status: SearchStatus::NoSolution,
        }
    }

    /// Decoded subsets; empty unless the search found peaks.
    pub fn subsets(&self) -> &[Subset] {
        match &self.status {
            SearchStatus::Found { subsets } => subsets,
            _ => &[],
        }
    }
}

/// Runs subset-sum searches against an injected executor.
pub struct SubsetSumSolver {
    backend: Arc<dyn Backend>,
    config: SolverConfig,
}

impl SubsetSumSolver {
    /// Create a solver; the configuration is validated here.
    pub fn new(backend: Arc<dyn Backend>, config: SolverConfig) -> SearchResult<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The executor jobs are sent to.
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Build and verify the Grover iterator for `instance`.
    pub fn iterator(&self, instance: &ProblemInstance) -> SearchResult<GroverIterator> {
        let builder = self.config.oracle_builder();
        let grover = GroverIterator::new(builder.as_ref(), instance)?;
        grover.verify()?;
        Ok(grover)
    }

    /// Estimate the number of solutions of `instance`.
    pub async fn count(&self, instance: &ProblemInstance) -> SearchResult<CountEstimate> {
        let grover = self.iterator(instance)?;
        self.count_with(&grover, instance).await
    }

    #[instrument(skip_all, fields(instance = %instance))]
    async fn count_with(
        &self,
        grover: &GroverIterator,
        instance: &ProblemInstance,
    ) -> SearchResult<CountEstimate> {
        let counting_qubits = self.config.counting_qubits_for(instance);
        self.ensure_fits("counting", grover, counting_qubits)?;
        let counter = QuantumCounter::new(counting_qubits);
        let circuit = counter.circuit(grover)?;
        circuit.dag().verify_integrity()?;

        info!(
            qubits = circuit.num_qubits(),
            shots = self.config.counting_shots,
            "running counting circuit"
        );
        let result = self.backend.run(&circuit, self.config.counting_shots).await?;
        counter.estimate(&result.counts, instance.search_space())
    }

    /// Run `iterations` Grover iterations and return the index histogram.
    #[instrument(skip(self, grover))]
    pub async fn search(&self, grover: &GroverIterator, iterations: u64) -> SearchResult<Counts> {
        self.ensure_fits("search", grover, 0)?;
        let circuit = grover.search_circuit(iterations)?;
        circuit.dag().verify_integrity()?;

        info!(
            qubits = circuit.num_qubits(),
            shots = self.config.shots,
            "running search circuit"
        );
        let result = self.backend.run(&circuit, self.config.shots).await?;
        Ok(result.counts)
    }

    /// Reject a circuit of the work registers plus `extra` qubits when the
    /// executor cannot hold it.
    fn ensure_fits(
        &self,
        circuit: &'static str,
        grover: &GroverIterator,
        extra: u32,
    ) -> SearchResult<()> {
        let layout = grover.layout();
        let required = layout.num_qubits() + extra as usize;
        let available = self.backend.capabilities().num_qubits as usize;
        if required <= available {
            return Ok(());
        }
        let breakdown = if extra > 0 {
            format!("{layout} + {extra} counting")
        } else {
            layout.to_string()
        };
        Err(SearchError::ExceedsExecutor {
            circuit,
            encoding: grover.encoding(),
            breakdown,
            required,
            available,
        })
    }

    /// Count, derive the iteration count, search and decode.
    #[instrument(skip_all, fields(instance = %instance, encoding = %self.config.encoding))]
    pub async fn solve(&self, instance: &ProblemInstance) -> SearchResult<SearchReport> {
        let grover = self.iterator(instance)?;
        let mut report = SearchReport::new(instance, &grover);

        let estimate = self.count_with(&grover, instance).await?;
        report.counting_qubits = Some(self.config.counting_qubits_for(instance));
        let marked = estimate.marked;
        report.count = Some(estimate);

        if marked == 0 {
            info!("counting found no solutions");
            report.status = SearchStatus::NoSolution;
            return Ok(report);
        }

        let iterations = optimal_iterations(instance.search_space(), marked);
        self.finish(report, &grover, instance, iterations).await
    }

    /// Search with a fixed iteration count, skipping counting.
    #[instrument(skip_all, fields(instance = %instance, iterations))]
    pub async fn solve_with_iterations(
        &self,
        instance: &ProblemInstance,
        iterations: u64,
    ) -> SearchResult<SearchReport> {
        let grover = self.iterator(instance)?;
        let report = SearchReport::new(instance, &grover);
        self.finish(report, &grover, instance, iterations).await
    }

    async fn finish(
        &self,
        mut report: SearchReport,
        grover: &GroverIterator,
        instance: &ProblemInstance,
        iterations: u64,
    ) -> SearchResult<SearchReport> {
        let counts = self.search(grover, iterations).await?;
        report.iterations = Some(iterations);

        report.status = match self.config.decoder.decode(&counts, instance.index_width()) {
            Ok(subsets) => {
                for subset in subsets.iter().filter(|s| !s.satisfies(instance)) {
                    warn!(bitstring = %subset.bitstring, "peak does not sum to the target");
                }
                SearchStatus::Found { subsets }
            }
            Err(SearchError::AmbiguousMeasurement(reason)) => {
                warn!(%reason, "search inconclusive");
                SearchStatus::Inconclusive { reason }
            }
            Err(e) => return Err(e),
        };
        report.histogram = counts;
        Ok(report)
    }
}

/// Probability of every index configuration in a work-register state.
///
/// `amplitudes` must come from a circuit laid out by `layout` (index
/// register on the lowest qubits), such as [`GroverIterator::state_circuit`].
/// Entry `m` is the probability of index mask `m`.
pub fn index_distribution(amplitudes: &[Complex64], layout: &RegisterLayout) -> Vec<f64> {
    let width = layout.index_width();
    let mask = (1usize << width) - 1;
    let mut dist = vec![0.0; 1usize << width];
    for (i, amp) in amplitudes.iter().enumerate() {
        dist[i & mask] += amp.norm_sqr();
    }
    dist
}
