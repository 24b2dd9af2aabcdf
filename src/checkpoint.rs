//! Checkpoint system for saving and restoring a running automaton.

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::registry::{registry, AutomatonOptions};
use crate::rules::RuleFile;
use crate::stats::StatisticsRecord;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"CALB";

/// Everything needed to rebuild an automaton through the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Registry name the automaton was built from
    pub variant: String,
    pub options: AutomatonOptions,
    pub generation: u64,
    pub grid: Grid,
    /// Active rule set as rule-file JSON, for variants with data-driven rules
    pub rules: Option<String>,
    /// Statistics at capture time
    pub statistics: StatisticsRecord,
}

impl Checkpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 1;

    /// Capture `automaton`, which was built as `variant` with `options`
    pub fn capture(variant: &str, options: &AutomatonOptions, automaton: &mut dyn Automaton) -> Result<Self> {
        let rules = match automaton.export_rules() {
            Some(file) => Some(serde_json::to_string(&file)?),
            None => None,
        };
        Ok(Self {
            version: Self::VERSION,
            variant: variant.to_string(),
            options: options.clone(),
            generation: automaton.generation(),
            grid: automaton.export_grid(),
            rules,
            statistics: automaton.compute_statistics(),
        })
    }

    /// Rebuild the automaton: create it through the registry, reload the
    /// embedded rules if they differ from the variant's, then put back the
    /// grid and generation.
    pub fn restore(&self) -> Result<Box<dyn Automaton>> {
        let mut options = self.options.clone();
        if self.rules.is_some() {
            // embedded rules win over a rule file that may have moved
            options.rule_file = None;
        }

        let mut automaton =
            registry().create_automaton(&self.variant, self.grid.width(), self.grid.height(), &options)?;
        if let Some(json) = &self.rules {
            let file: RuleFile = serde_json::from_str(json)?;
            // the variant's own rule set needs no reload
            if automaton.export_rules().as_ref() != Some(&file) {
                automaton.load_rules(&file)?;
            }
        }
        automaton.restore(&self.grid, self.generation)?;
        debug!("Restored {} at generation {}", self.variant, self.generation);
        Ok(automaton)
    }

    /// Save checkpoint to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;

        Ok(())
    }

    /// Load checkpoint from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|_| Error::InvalidCheckpoint("file too short".to_string()))?;
        if &magic != MAGIC {
            return Err(Error::InvalidCheckpoint("invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let checkpoint: Checkpoint = bincode::deserialize(&buffer)?;

        if checkpoint.version != Self::VERSION {
            return Err(Error::VersionMismatch {
                expected: Self::VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }

    /// Approximate size in bytes
    pub fn size_bytes(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

/// Periodic checkpoints into a directory, keeping the newest few
pub struct CheckpointManager {
    base_dir: PathBuf,
    /// Generations between checkpoints
    interval: u64,
    max_checkpoints: usize,
    last_checkpoint: Option<u64>,
}

impl CheckpointManager {
    /// Create the manager and its directory
    pub fn new(base_dir: impl Into<PathBuf>, interval: u64, max_checkpoints: usize) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;

        Ok(Self {
            base_dir,
            interval,
            max_checkpoints: max_checkpoints.max(1),
            last_checkpoint: None,
        })
    }

    /// True on every non-zero multiple of the interval not yet saved.
    /// An interval of 0 disables periodic checkpoints.
    pub fn should_save(&self, generation: u64) -> bool {
        self.interval > 0
            && generation > 0
            && generation % self.interval == 0
            && self.last_checkpoint != Some(generation)
    }

    pub fn checkpoint_path(&self, generation: u64) -> PathBuf {
        self.base_dir.join(format!("checkpoint_{:08}.bin", generation))
    }

    /// Save and drop the oldest files beyond the limit
    pub fn save(&mut self, checkpoint: &Checkpoint) -> Result<PathBuf> {
        let path = self.checkpoint_path(checkpoint.generation);
        checkpoint.save(&path)?;
        self.last_checkpoint = Some(checkpoint.generation);
        info!("Checkpoint saved: {}", path.display());

        self.cleanup()?;
        Ok(path)
    }

    fn checkpoint_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                // periodic files only; `checkpoint_final.bin` is left alone
                name.strip_prefix("checkpoint_")
                    .and_then(|rest| rest.strip_suffix(".bin"))
                    .is_some_and(|generation| !generation.is_empty() && generation.bytes().all(|b| b.is_ascii_digit()))
            })
            .map(|entry| entry.path())
            .collect();
        // zero-padded generation numbers sort by name
        files.sort();
        Ok(files)
    }

    fn cleanup(&self) -> Result<()> {
        let files = self.checkpoint_files()?;
        if files.len() > self.max_checkpoints {
            let excess = files.len() - self.max_checkpoints;
            for path in files.into_iter().take(excess) {
                debug!("Removing old checkpoint {}", path.display());
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Newest checkpoint in the directory
    pub fn find_latest(&self) -> Option<PathBuf> {
        self.checkpoint_files().ok()?.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternParams;

    fn cyclic_options() -> AutomatonOptions {
        AutomatonOptions::new()
            .with_cyclic(5, 2)
            .with_params(PatternParams::new().with_seed(9))
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cyclic.bin");
        let options = cyclic_options();

        let mut automaton = registry().create_automaton("cyclic_ca", 20, 15, &options).unwrap();
        automaton.run(7).unwrap();
        let checkpoint = Checkpoint::capture("cyclic_ca", &options, automaton.as_mut()).unwrap();
        checkpoint.save(&path).unwrap();

        let loaded = Checkpoint::load(&path).unwrap();
        assert_eq!(loaded.generation, 7);
        assert_eq!(loaded.variant, "cyclic_ca");
        assert_eq!(loaded.statistics, checkpoint.statistics);

        let mut restored = loaded.restore().unwrap();
        assert_eq!(restored.generation(), 7);
        assert_eq!(restored.export_grid(), automaton.export_grid());

        // both continue identically
        automaton.step().unwrap();
        restored.step().unwrap();
        assert_eq!(restored.export_grid(), automaton.export_grid());
    }

    #[test]
    fn test_embedded_rules_restored() {
        let options = AutomatonOptions::new();
        let mut automaton = registry().create_automaton("langton_loop", 30, 30, &options).unwrap();
        automaton.run(3).unwrap();

        let checkpoint = Checkpoint::capture("langton_loop", &options, automaton.as_mut()).unwrap();
        assert!(checkpoint.rules.is_some());

        let restored = checkpoint.restore().unwrap();
        let before = automaton.export_rules().unwrap();
        let after = restored.export_rules().unwrap();
        assert_eq!(before.rule_count(), after.rule_count());
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        std::fs::write(&path, b"PRMDxxxxxxxx").unwrap();
        assert!(matches!(Checkpoint::load(&path), Err(Error::InvalidCheckpoint(_))));

        std::fs::write(&path, b"CA").unwrap();
        assert!(matches!(Checkpoint::load(&path), Err(Error::InvalidCheckpoint(_))));
    }

    #[test]
    fn test_version_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.bin");
        let options = AutomatonOptions::new();
        let mut automaton = registry().create_automaton("wireworld", 10, 10, &options).unwrap();

        let mut checkpoint = Checkpoint::capture("wireworld", &options, automaton.as_mut()).unwrap();
        checkpoint.version = Checkpoint::VERSION + 1;
        checkpoint.save(&path).unwrap();

        assert!(matches!(
            Checkpoint::load(&path),
            Err(Error::VersionMismatch { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn test_manager_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let options = AutomatonOptions::new().with_pattern("glider");
        let mut automaton = registry().create_automaton("game_of_life", 12, 12, &options).unwrap();
        let mut manager = CheckpointManager::new(dir.path().join("ckpt"), 2, 2).unwrap();

        assert!(!manager.should_save(0));
        for _ in 0..6 {
            automaton.step().unwrap();
            let generation = automaton.generation();
            if manager.should_save(generation) {
                let checkpoint = Checkpoint::capture("game_of_life", &options, automaton.as_mut()).unwrap();
                manager.save(&checkpoint).unwrap();
                assert!(!manager.should_save(generation));
            }
        }

        assert_eq!(manager.checkpoint_files().unwrap().len(), 2);
        assert_eq!(manager.find_latest(), Some(manager.checkpoint_path(6)));
        assert!(!manager.checkpoint_path(2).exists());

        std::fs::write(dir.path().join("ckpt").join("checkpoint_final.bin"), b"CALB").unwrap();
        assert_eq!(manager.find_latest(), Some(manager.checkpoint_path(6)));
    }

    #[test]
    fn test_zero_interval_disables() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path(), 0, 3).unwrap();
        assert!(!manager.should_save(10));
        assert_eq!(manager.find_latest(), None);
    }
}
