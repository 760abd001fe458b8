//! Random values drawn for each recording round.
//!
//! Each recorder task owns its generator; nothing is shared between tasks.

use std::time::Duration;

use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::errors::{Result, SamplerError};
use crate::instruments::METER_ITEMS;

/// Values for one round, drawn up front in instrument order.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundValues {
    /// [1, 4)
    pub counter_two: i64,
    /// [0, 201)
    pub gauge: f64,
    /// [0, 201)
    pub histogram: f64,
    /// [0, 6)
    pub meter_amount: u64,
    pub meter_item: &'static str,
    /// Synthetic work, `[work_min_ms, work_max_ms)` milliseconds
    pub work: Duration,
}

pub struct RoundSampler {
    rng: StdRng,
    counter_two: Uniform<i64>,
    level: Uniform<u32>,
    meter_amount: Uniform<u64>,
    meter_item: Uniform<usize>,
    work_ms: Uniform<u64>,
}

impl RoundSampler {
    /// Seeded once from the process RNG.
    pub fn new(work_min_ms: u64, work_max_ms: u64) -> Result<Self> {
        Self::with_seed(rand::random::<u64>(), work_min_ms, work_max_ms)
    }

    pub fn with_seed(seed: u64, work_min_ms: u64, work_max_ms: u64) -> Result<Self> {
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            counter_two: uniform(1, 4)?,
            level: uniform(0, 201)?,
            meter_amount: uniform(0, 6)?,
            meter_item: uniform(0, METER_ITEMS.len())?,
            work_ms: uniform(work_min_ms, work_max_ms)?,
        })
    }

    pub fn draw(&mut self) -> RoundValues {
        RoundValues {
            counter_two: self.counter_two.sample(&mut self.rng),
            gauge: f64::from(self.level.sample(&mut self.rng)),
            histogram: f64::from(self.level.sample(&mut self.rng)),
            meter_amount: self.meter_amount.sample(&mut self.rng),
            meter_item: METER_ITEMS[self.meter_item.sample(&mut self.rng)],
            work: Duration::from_millis(self.work_ms.sample(&mut self.rng)),
        }
    }
}

fn uniform<T>(low: T, high: T) -> Result<Uniform<T>>
where
    T: rand::distr::uniform::SampleUniform + std::fmt::Debug + Copy,
{
    Uniform::new(low, high).map_err(|e| {
        SamplerError::validation(format!("Invalid range [{:?}, {:?}): {}", low, high, e))
    })
}
