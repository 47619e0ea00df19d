use anyhow::{bail, Result};
use rand::Rng;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Persistence for a pool's "already used" rotation. The selector only
/// needs load/append/clear, so tests can swap the file for memory.
pub trait UsedStore {
    fn load(&self) -> Result<Vec<String>>;
    fn append(&mut self, value: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// One consumed entry per line, in a `used_<pool>` file next to the binary.
pub struct FileUsedStore {
    path: PathBuf,
    pool: String,
}

impl FileUsedStore {
    pub fn for_pool(pool: &str) -> Self {
        Self {
            path: PathBuf::from(format!("used_{pool}")),
            pool: pool.to_string(),
        }
    }

    pub fn at(path: impl Into<PathBuf>, pool: &str) -> Self {
        Self {
            path: path.into(),
            pool: pool.to_string(),
        }
    }
}

impl UsedStore for FileUsedStore {
    fn load(&self) -> Result<Vec<String>> {
        if self.path.is_file() {
            Ok(fs::read_to_string(&self.path)?
                .lines()
                .map(str::to_owned)
                .collect())
        } else {
            Ok(Vec::new())
        }
    }

    fn append(&mut self, value: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{value}")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        fs::write(&self.path, "")?;
        info!("Cleared used {} list", self.pool);
        Ok(())
    }
}

/// Pick a uniformly random unused entry from `pool`, clearing the rotation
/// once the pool is exhausted. The pick is recorded before returning, so it
/// cannot come up again within the current cycle.
pub fn select<'a, S, R>(pool: &[&'a str], store: &mut S, rng: &mut R) -> Result<&'a str>
where
    S: UsedStore,
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        bail!("cannot select from an empty pool");
    }
    let used = store.load()?;
    let mut available: Vec<&'a str> = pool
        .iter()
        .copied()
        .filter(|item| !used.iter().any(|u| u == item))
        .collect();
    debug!("{} unused entries remaining", available.len());
    if available.is_empty() {
        available = pool.to_vec();
        store.clear()?;
    }
    let chosen = available[rng.gen_range(0..available.len())];
    store.append(chosen)?;
    Ok(chosen)
}
