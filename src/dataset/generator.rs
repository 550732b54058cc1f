//! Synthetic datasets for trying out the estimators

use crate::dataset::loader::save_records;
use crate::types::Record;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::path::Path;

/// Range item difficulties are drawn from
pub const DIFFICULTY_RANGE: RangeInclusive<i32> = 1300..=1900;

/// Default number of generated records
pub const DEFAULT_SAMPLES: usize = 100;

/// Draw `samples` records with uniform integer difficulty and a fair pass flag.
pub fn generate_records<R: Rng + ?Sized>(rng: &mut R, samples: usize) -> Vec<Record> {
    (0..samples)
        .map(|_| {
            let difficulty = rng.gen_range(DIFFICULTY_RANGE);
            Record::new(f64::from(difficulty), rng.gen_bool(0.5))
        })
        .collect()
}

/// Generate a dataset and write it to `path`.
///
/// A fixed `seed` makes the output reproducible.
pub fn generate_dataset(path: &Path, samples: usize, seed: Option<u64>) -> Result<Vec<Record>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let records = generate_records(&mut rng, samples);
    save_records(path, &records)?;
    Ok(records)
}
