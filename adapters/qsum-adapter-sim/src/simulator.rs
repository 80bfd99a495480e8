//! Simulator backend implementation.

use async_trait::async_trait;
use num_complex::Complex64;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qsum_hal::{
    Backend, BackendAvailability, Capabilities, ExecutionResult, HalError, HalResult, Job, JobId,
    JobStatus, StatevectorBackend, ValidationResult,
};
use qsum_ir::{Circuit, InstructionKind};

use crate::statevector::Statevector;

/// Default qubit limit: 2^24 amplitudes take 256 MiB.
const DEFAULT_MAX_QUBITS: u32 = 24;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local noiseless statevector executor.
///
/// Jobs run to completion inside `submit`; `status` only reads the job
/// table. A job leaves the table once `result` (or `wait`) has handed it
/// back, so a long-lived simulator holds only uncollected jobs.
pub struct SimulatorBackend {
    capabilities: Capabilities,
    jobs: Mutex<FxHashMap<String, SimJob>>,
    rng: Mutex<StdRng>,
    seed: Option<u64>,
}

impl SimulatorBackend {
    /// Create a simulator seeded from system entropy.
    pub fn new() -> Self {
        Self::build(StdRng::from_entropy(), None)
    }

    /// Create a simulator whose histograms are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(StdRng::seed_from_u64(seed), Some(seed))
    }

    fn build(rng: StdRng, seed: Option<u64>) -> Self {
        Self {
            capabilities: Capabilities::simulator(DEFAULT_MAX_QUBITS),
            jobs: Mutex::new(FxHashMap::default()),
            rng: Mutex::new(rng),
            seed,
        }
    }

    /// Override the largest circuit accepted.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.capabilities.num_qubits = max_qubits;
        self
    }

    fn max_qubits(&self) -> usize {
        self.capabilities.num_qubits as usize
    }

    /// Simulate once and draw every shot from the final distribution.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        let num_qubits = circuit.num_qubits();
        debug!(num_qubits, ops = circuit.num_ops(), shots, "starting simulation");

        let sv = Statevector::simulate(circuit);

        // Without measurements every qubit is read, qubit k into bit k.
        let (measured, width): (Vec<(usize, usize)>, usize) = if circuit.has_measurements() {
            let pairs = circuit
                .dag()
                .topological_ops()
                .filter(|(_, inst)| matches!(inst.kind, InstructionKind::Measure))
                .flat_map(|(_, inst)| {
                    inst.qubits
                        .iter()
                        .zip(&inst.clbits)
                        .map(|(q, c)| (q.index(), c.index()))
                        .collect::<Vec<_>>()
                })
                .collect();
            (pairs, circuit.num_clbits())
        } else {
            ((0..num_qubits).map(|q| (q, q)).collect(), num_qubits)
        };

        let counts = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            sv.sample_counts(&measured, width, shots, &mut *rng)?
        };

        let elapsed = start.elapsed();
        debug!(?elapsed, outcomes = counts.len(), "simulation completed");

        let metadata = serde_json::json!({
            "num_qubits": num_qubits,
            "num_ops": circuit.num_ops(),
            "seed": self.seed,
        });

        Ok(ExecutionResult::new(counts, shots)
            .with_execution_time(elapsed.as_millis() as u64)
            .with_metadata(metadata))
    }

    fn with_job<T>(&self, job_id: &JobId, f: impl FnOnce(&mut SimJob) -> T) -> HalResult<T> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get_mut(&job_id.0)
            .map(f)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    /// Remove a finished job from the table.
    fn take_finished(&self, job_id: &JobId) -> HalResult<SimJob> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let status = jobs
            .get(&job_id.0)
            .map(|sim_job| sim_job.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if !status.is_terminal() {
            return Err(HalError::JobFailed(format!("job {job_id} is still {status}")));
        }
        jobs.remove(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    /// Number of jobs still held in the table.
    pub fn retained_jobs(&self) -> usize {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.capabilities.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = Vec::new();

        if circuit.num_qubits() > self.max_qubits() {
            reasons.push(format!(
                "circuit has {} qubits but simulator supports {}",
                circuit.num_qubits(),
                self.max_qubits()
            ));
        }

        for (_, inst) in circuit.dag().topological_ops() {
            match inst.as_gate() {
                Some(gate) if !self.capabilities.gate_set.supports(gate) => {
                    reasons.push(format!("unsupported gate '{}'", gate.name()));
                }
                _ => {}
            }
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shot count must be positive".into()));
        }
        if circuit.num_qubits() > self.max_qubits() {
            return Err(HalError::CircuitTooLarge(format!(
                "circuit has {} qubits but simulator supports {}",
                circuit.num_qubits(),
                self.max_qubits()
            )));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(job_id.clone(), circuit.name(), shots);
        job.transition(JobStatus::Running);

        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, result: None });
        }
        debug!(job = %job_id, "submitted job");

        let outcome = self.run_simulation(circuit, shots);

        self.with_job(&job_id, |sim_job| match outcome {
            Ok(result) => {
                sim_job.result = Some(result);
                sim_job.job.transition(JobStatus::Completed);
            }
            Err(e) => sim_job.job.transition(JobStatus::Failed(e.to_string())),
        })?;

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.with_job(job_id, |sim_job| sim_job.job.status.clone())
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let SimJob { job, result } = self.take_finished(job_id)?;
        match (job.status, result) {
            (JobStatus::Completed, Some(result)) => Ok(result),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg)),
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            _ => Err(HalError::JobFailed(format!("job {job_id} has no result"))),
        }
    }

    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        // Finished inside submit; nothing to poll.
        self.result(job_id).await
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.with_job(job_id, |sim_job| sim_job.job.transition(JobStatus::Cancelled))
    }
}

impl StatevectorBackend for SimulatorBackend {
    fn statevector(&self, circuit: &Circuit) -> HalResult<Vec<Complex64>> {
        if circuit.num_qubits() > self.max_qubits() {
            return Err(HalError::CircuitTooLarge(format!(
                "circuit has {} qubits but simulator supports {}",
                circuit.num_qubits(),
                self.max_qubits()
            )));
        }
        Ok(Statevector::simulate(circuit).into_amplitudes())
    }
}
