//! Interning of stack reports into stable integer state ids.
//!
//! Ids start at 1 so that 0 never names a state. A file-backed dictionary is
//! reloaded before a new id is assigned, which lets several controllers share
//! one file, and rewritten atomically after every insertion.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::infrastructure::{InfraError, InfraResult};

#[derive(Debug, Default)]
pub struct StateDict {
    path: Option<PathBuf>,
    states: BTreeMap<String, u32>,
}

impl StateDict {
    /// Dictionary that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Dictionary persisted at `path`. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> InfraResult<Self> {
        let path = path.into();
        let states = load(&path)?;
        debug!(path = %path.display(), states = states.len(), "state dictionary loaded");
        Ok(Self {
            path: Some(path),
            states,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, state: &str) -> Option<u32> {
        self.states.get(state).copied()
    }

    /// Id of `state`, assigning the next free id if it is new.
    pub fn index(&mut self, state: &str) -> InfraResult<u32> {
        if let Some(id) = self.get(state) {
            return Ok(id);
        }

        if let Some(path) = &self.path {
            for (key, id) in load(path)? {
                self.states.entry(key).or_insert(id);
            }
            if let Some(id) = self.get(state) {
                return Ok(id);
            }
        }

        let id = self.next_id();
        self.states.insert(state.to_string(), id);
        info!(id, state, "new state");
        self.save()?;
        Ok(id)
    }

    fn next_id(&self) -> u32 {
        let used = u32::try_from(self.states.len()).unwrap_or(u32::MAX - 1);
        let max = self.states.values().copied().max().unwrap_or(0);
        used.max(max) + 1
    }

    fn save(&self) -> InfraResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = toml::to_string(&self.states).map_err(|e| {
            InfraError::io(
                format!("serialize state dictionary {}", path.display()),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| InfraError::io(format!("create temp file in {}", dir.display()), e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| InfraError::io("write state dictionary", e))?;
        tmp.persist(path)
            .map_err(|e| InfraError::io(format!("persist {}", path.display()), e.error))?;
        Ok(())
    }
}

fn load(path: &Path) -> InfraResult<BTreeMap<String, u32>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
    toml::from_str(&content).map_err(|e| {
        InfraError::io(
            format!("parse {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}
