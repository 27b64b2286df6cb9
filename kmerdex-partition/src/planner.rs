//! Balanced partition planning
//!
//! Distributes substrings over a fixed number of partitions so that the summed
//! observation counts per partition are as even as possible. Each trial runs a
//! greedy seed step, a shuffled first-fit pass against a per-partition budget
//! and a min-fill pass for whatever did not fit. Trials are independent and run
//! on the rayon pool; the trial with the smallest spread wins.

use kmerdex_bio::{validate, SubstringRecord};
use kmerdex_core::PartitionName;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("partition count must be at least 1")]
    NoPartitions,

    #[error("repetitions must be at least 1")]
    NoRepetitions,

    #[error("substring corpus is empty")]
    EmptyCorpus,

    #[error("substring '{0}' appears more than once in the corpus")]
    DuplicateSubstring(String),

    #[error("substring '{substring}' is not ACGT")]
    InvalidSubstring { substring: String },

    #[error("substring '{substring}' has width {found}, expected {expected}")]
    InconsistentWidth {
        substring: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone)]
pub struct PlannerOptions {
    pub partitions: usize,
    pub repetitions: usize,
    /// Base seed; trial `i` shuffles with `seed + i`. Random when `None`.
    pub seed: Option<u64>,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            partitions: 10,
            repetitions: 1,
            seed: None,
        }
    }
}

/// A planned partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub name: PartitionName,
    pub members: Vec<String>,
    pub total: u64,
}

impl Partition {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Outcome of one planning trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub trial: usize,
    pub min_total: u64,
    pub max_total: u64,
    pub spread: u64,
}

/// Distribution of member counts across partitions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemberStats {
    pub min: usize,
    pub mean: f64,
    pub median: f64,
    pub max: usize,
}

/// Result of a planning run: the winning trial's partitions plus every trial's summary
#[derive(Debug, Clone, Serialize)]
pub struct PartitionPlan {
    pub partitions: Vec<Partition>,
    /// Per-partition observation budget used by the first-fit pass
    pub budget: u64,
    /// Sum of all observation counts
    pub total: u64,
    pub base_seed: u64,
    pub winning_trial: usize,
    /// Summaries ordered by trial index
    pub trials: Vec<TrialSummary>,
}

impl PartitionPlan {
    pub fn spread(&self) -> u64 {
        self.trials
            .iter()
            .find(|t| t.trial == self.winning_trial)
            .map(|t| t.spread)
            .unwrap_or_default()
    }

    pub fn substring_count(&self) -> usize {
        self.partitions.iter().map(Partition::member_count).sum()
    }

    /// Every `(substring, partition)` pair of the plan
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &PartitionName)> {
        self.partitions
            .iter()
            .flat_map(|p| p.members.iter().map(move |m| (m.as_str(), &p.name)))
    }

    pub fn member_stats(&self) -> MemberStats {
        let mut sizes: Vec<usize> = self.partitions.iter().map(Partition::member_count).collect();
        sizes.sort_unstable();
        if sizes.is_empty() {
            return MemberStats { min: 0, mean: 0.0, median: 0.0, max: 0 };
        }
        let n = sizes.len();
        let mean = sizes.iter().sum::<usize>() as f64 / n as f64;
        let median = if n % 2 == 1 {
            sizes[n / 2] as f64
        } else {
            (sizes[n / 2 - 1] + sizes[n / 2]) as f64 / 2.0
        };
        MemberStats {
            min: sizes[0],
            mean,
            median,
            max: sizes[n - 1],
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Bin {
    seed: Option<usize>,
    members: Vec<usize>,
    total: u64,
}

struct TrialOutcome {
    summary: TrialSummary,
    bins: Vec<Bin>,
}

pub struct Planner {
    options: PlannerOptions,
}

impl Planner {
    pub fn new(options: PlannerOptions) -> Result<Self, PlanError> {
        if options.partitions == 0 {
            return Err(PlanError::NoPartitions);
        }
        if options.repetitions == 0 {
            return Err(PlanError::NoRepetitions);
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    pub fn plan(&self, corpus: &[SubstringRecord]) -> Result<PartitionPlan, PlanError> {
        self.plan_with_progress(corpus, |_| {})
    }

    /// Plan partitions, calling `on_trial` as each trial finishes (in completion order)
    pub fn plan_with_progress<F>(
        &self,
        corpus: &[SubstringRecord],
        on_trial: F,
    ) -> Result<PartitionPlan, PlanError>
    where
        F: Fn(&TrialSummary) + Sync,
    {
        if corpus.is_empty() {
            return Err(PlanError::EmptyCorpus);
        }
        check_corpus(corpus)?;

        let partitions = self.options.partitions;
        let total: u64 = corpus.iter().map(|r| r.count).fold(0, u64::saturating_add);
        let budget = (total / partitions as u64).max(1);
        let base_seed = self
            .options
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());

        tracing::info!(
            "Planning {} substrings into {} partitions ({} trials, budget {}, seed {})",
            corpus.len(),
            partitions,
            self.options.repetitions,
            budget,
            base_seed
        );

        // Stable: equal counts keep corpus order
        let mut seed_order: Vec<usize> = (0..corpus.len()).collect();
        seed_order.sort_by(|&a, &b| corpus[b].count.cmp(&corpus[a].count));
        seed_order.truncate(partitions);

        let summaries = Mutex::new(Vec::with_capacity(self.options.repetitions));
        let best = (0..self.options.repetitions)
            .into_par_iter()
            .map(|trial| {
                let outcome = run_trial(
                    corpus,
                    &seed_order,
                    partitions,
                    budget,
                    trial,
                    base_seed.wrapping_add(trial as u64),
                );
                tracing::debug!(
                    "Trial {}: min {} max {} spread {}",
                    trial,
                    outcome.summary.min_total,
                    outcome.summary.max_total,
                    outcome.summary.spread
                );
                on_trial(&outcome.summary);
                summaries.lock().push(outcome.summary);
                outcome
            })
            .min_by_key(|o| (o.summary.spread, o.summary.trial))
            .ok_or(PlanError::NoRepetitions)?;

        let mut trials = summaries.into_inner();
        trials.sort_by_key(|t| t.trial);

        let partitions = best
            .bins
            .into_iter()
            .enumerate()
            .map(|(slot, bin)| Partition {
                name: match bin.seed {
                    Some(idx) => PartitionName::new(corpus[idx].substring.clone()),
                    None => PartitionName::new(format!("EMPTY{:03}", slot)),
                },
                members: bin
                    .members
                    .into_iter()
                    .map(|idx| corpus[idx].substring.clone())
                    .collect(),
                total: bin.total,
            })
            .collect();

        tracing::info!(
            "Trial {} selected with spread {}",
            best.summary.trial,
            best.summary.spread
        );

        Ok(PartitionPlan {
            partitions,
            budget,
            total,
            base_seed,
            winning_trial: best.summary.trial,
            trials,
        })
    }
}

fn run_trial(
    corpus: &[SubstringRecord],
    seed_order: &[usize],
    partitions: usize,
    budget: u64,
    trial: usize,
    rng_seed: u64,
) -> TrialOutcome {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let mut bins = vec![Bin::default(); partitions];
    let mut processed = vec![false; corpus.len()];

    for (slot, &idx) in seed_order.iter().enumerate() {
        let bin = &mut bins[slot];
        bin.seed = Some(idx);
        bin.members.push(idx);
        bin.total = corpus[idx].count;
        processed[idx] = true;
    }

    // First fit in a freshly shuffled partition order per substring
    let mut visit: Vec<usize> = (0..partitions).collect();
    let mut residual = Vec::new();
    for (idx, record) in corpus.iter().enumerate() {
        if processed[idx] {
            continue;
        }
        visit.shuffle(&mut rng);
        let target = visit
            .iter()
            .copied()
            .find(|&b| bins[b].total.saturating_add(record.count) <= budget);
        match target {
            Some(b) => {
                bins[b].members.push(idx);
                bins[b].total += record.count;
            }
            None => residual.push(idx),
        }
    }

    // Whatever found no headroom goes to the lightest partition
    for idx in residual {
        let lightest = (0..partitions)
            .min_by_key(|&b| bins[b].total)
            .unwrap_or_default();
        bins[lightest].members.push(idx);
        bins[lightest].total = bins[lightest].total.saturating_add(corpus[idx].count);
    }

    let min_total = bins.iter().map(|b| b.total).min().unwrap_or_default();
    let max_total = bins.iter().map(|b| b.total).max().unwrap_or_default();

    TrialOutcome {
        summary: TrialSummary {
            trial,
            min_total,
            max_total,
            spread: max_total - min_total,
        },
        bins,
    }
}

/// Every substring must be distinct `ACGT` of one width, or the membership
/// file could not be loaded back as a routing table.
fn check_corpus(corpus: &[SubstringRecord]) -> Result<(), PlanError> {
    let expected = corpus.first().map_or(0, |r| r.substring.len());
    let mut seen = HashSet::with_capacity(corpus.len());
    for record in corpus {
        let substring = record.substring.as_str();
        if substring.is_empty() || validate(substring).is_err() {
            return Err(PlanError::InvalidSubstring {
                substring: substring.to_string(),
            });
        }
        if substring.len() != expected {
            return Err(PlanError::InconsistentWidth {
                substring: substring.to_string(),
                expected,
                found: substring.len(),
            });
        }
        if !seen.insert(substring) {
            return Err(PlanError::DuplicateSubstring(substring.to_string()));
        }
    }
    Ok(())
}
