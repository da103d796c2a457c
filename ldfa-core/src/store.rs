//! Content-addressed persistence (`spec.md` §6): an LDFA is stored as a
//! directory of raw per-layer transition files plus a side-car recording
//! shape, per-layer state counts, and initial state id. A small text index
//! lets symbolic names alias content hashes. Writers always build into a
//! temporary directory and `rename` it into place, so a crash mid-write can
//! never corrupt a previously persisted artifact (`spec.md` §7).
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{info, warn};

use crate::config::SolverConfig;
use crate::error::{LdfaError, Result};
use crate::hash::Hash256;
use crate::ldfa::{Ldfa, StateId};
use crate::shape::Shape;

const SIDECAR_FILE: &str = "meta";
const ALIAS_INDEX_FILE: &str = "aliases";

fn layer_file_name(layer: usize) -> String {
    format!("layer={layer}")
}

fn write_u32_file(path: &Path, words: &[u32]) -> Result<()> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    fs::write(path, bytes).map_err(|e| LdfaError::io(path, e))
}

fn read_u32_file(path: &Path) -> Result<Vec<u32>> {
    let bytes = fs::read(path).map_err(|e| LdfaError::io(path, e))?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn write_sidecar(path: &Path, ldfa: &Ldfa) -> Result<()> {
    let n = ldfa.dimension();
    let mut words = Vec::with_capacity(1 + n + (n + 1) + 1);
    words.push(n as u32);
    words.extend_from_slice(ldfa.shape.widths());
    words.extend_from_slice(&ldfa.state_counts);
    words.push(ldfa.initial_state);
    write_u32_file(path, &words)
}

struct Sidecar {
    widths: Vec<u32>,
    state_counts: Vec<u32>,
    initial_state: StateId,
}

fn read_sidecar(path: &Path) -> Result<Sidecar> {
    let words = read_u32_file(path)?;
    let n = words[0] as usize;
    let widths = words[1..1 + n].to_vec();
    let state_counts = words[1 + n..1 + n + (n + 1)].to_vec();
    let initial_state = words[1 + n + (n + 1)];
    Ok(Sidecar {
        widths,
        state_counts,
        initial_state,
    })
}

fn read_alias_lines(path: &Path) -> Result<Vec<(String, Hash256)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path).map_err(|e| LdfaError::io(path, e))?;
    let mut lines = Vec::new();
    for line in text.lines() {
        if let Some((name, hex)) = line.split_once('\t') {
            let mut bytes = [0u8; 32];
            for (i, byte) in bytes.iter_mut().enumerate() {
                *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap_or(0);
            }
            lines.push((name.to_string(), Hash256(bytes)));
        }
    }
    Ok(lines)
}

fn write_alias_lines(path: &Path, lines: &[(String, Hash256)]) -> Result<()> {
    let text: String = lines
        .iter()
        .map(|(name, hash)| format!("{name}\t{}\n", hash.to_hex()))
        .collect();
    fs::write(path, text).map_err(|e| LdfaError::io(path, e))
}

/// A content-addressed cache of finalized LDFAs, rooted at
/// [`SolverConfig::cache_path`].
pub struct Store {
    config: SolverConfig,
}

impl Store {
    pub fn new(config: SolverConfig) -> Self {
        Store { config }
    }

    fn hash_dir(&self, hash: Hash256) -> PathBuf {
        self.config.cache_path().join(hash.to_hex())
    }

    /// Persists `ldfa`, returning its content hash. A no-op if an artifact
    /// with this hash is already present.
    pub fn save(&self, ldfa: &Ldfa) -> Result<Hash256> {
        let hash = ldfa.content_hash();
        let final_dir = self.hash_dir(hash);
        if final_dir.exists() {
            return Ok(hash);
        }

        let tmp_dir = self
            .config
            .cache_path()
            .join(format!(".tmp-{}", hash.to_hex()));
        fs::create_dir_all(&tmp_dir).map_err(|e| LdfaError::io(&tmp_dir, e))?;

        for layer in 0..ldfa.dimension() {
            let path = tmp_dir.join(layer_file_name(layer));
            write_u32_file(&path, &ldfa.transitions[layer])?;
        }
        write_sidecar(&tmp_dir.join(SIDECAR_FILE), ldfa)?;

        if let Some(parent) = final_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| LdfaError::io(parent, e))?;
        }
        fs::rename(&tmp_dir, &final_dir).map_err(|e| LdfaError::io(&final_dir, e))?;
        info!(
            "persisted LDFA {hash} ({} layers, {} states in layer 0)",
            ldfa.dimension(),
            ldfa.state_count(0)
        );
        Ok(hash)
    }

    /// Loads the LDFA stored under `hash`. Recoverable (`spec.md` §7): a
    /// missing entry returns [`LdfaError::CacheMissHash`], not a panic.
    pub fn load_by_hash(&self, hash: Hash256) -> Result<Ldfa> {
        let dir = self.hash_dir(hash);
        if !dir.exists() {
            return Err(LdfaError::CacheMissHash(hash));
        }

        let sidecar = read_sidecar(&dir.join(SIDECAR_FILE))?;
        let shape = Rc::new(Shape::new(sidecar.widths));
        let n = shape.dimension();

        let mut transitions = Vec::with_capacity(n);
        for layer in 0..n {
            let words = read_u32_file(&dir.join(layer_file_name(layer)))?;
            transitions.push(Rc::<[StateId]>::from(words));
        }

        Ok(Ldfa {
            shape,
            transitions: Rc::new(transitions),
            state_counts: Rc::new(sidecar.state_counts),
            initial_state: sidecar.initial_state,
        })
    }

    /// Maps `name` to `hash` in the alias index, replacing any previous
    /// mapping for the same name.
    pub fn alias(&self, name: &str, hash: Hash256) -> Result<()> {
        fs::create_dir_all(self.config.cache_path())
            .map_err(|e| LdfaError::io(self.config.cache_path(), e))?;
        let path = self.config.cache_path().join(ALIAS_INDEX_FILE);
        let mut lines = read_alias_lines(&path)?;
        lines.retain(|(n, _)| n != name);
        lines.push((name.to_string(), hash));
        write_alias_lines(&path, &lines)
    }

    /// Loads the LDFA aliased to `name`. Recoverable: a missing alias
    /// returns [`LdfaError::CacheMiss`], meant to be handled by falling
    /// back to [`Store::load_or_build`].
    pub fn load(&self, name: &str) -> Result<Ldfa> {
        let path = self.config.cache_path().join(ALIAS_INDEX_FILE);
        let hash = read_alias_lines(&path)?
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h)
            .ok_or_else(|| LdfaError::CacheMiss(name.to_string()))?;
        self.load_by_hash(hash)
    }

    /// Loads `name` if cached; otherwise builds it with `build_fn`,
    /// persists the result under both its content hash and `name`, and
    /// returns it.
    pub fn load_or_build(&self, name: &str, build_fn: impl FnOnce() -> Result<Ldfa>) -> Result<Ldfa> {
        match self.load(name) {
            Ok(ldfa) => Ok(ldfa),
            Err(LdfaError::CacheMiss(_)) => {
                warn!("cache miss for '{name}', building from scratch");
                let ldfa = build_fn()?;
                let hash = self.save(&ldfa)?;
                self.alias(name, hash)?;
                Ok(ldfa)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldfa::constructors;
    use crate::shape::PositionString;

    fn test_config() -> (tempfile::TempDir, SolverConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = SolverConfig::new(dir.path().join("scratch"), dir.path().join("cache"));
        (dir, config)
    }

    #[test]
    fn round_trip_by_hash_preserves_identity() {
        let (_guard, config) = test_config();
        let store = Store::new(config);
        let shape = Shape::new(vec![3, 3]);
        let ldfa = constructors::from_strings(&shape, &[PositionString::from(vec![1, 2])])
            .unwrap()
            .minimize();

        let hash = store.save(&ldfa).unwrap();
        let loaded = store.load_by_hash(hash).unwrap();

        assert_eq!(loaded.content_hash(), ldfa.content_hash());
        assert_eq!(loaded.size_exact_u128(), ldfa.size_exact_u128());
        for layer in 0..=ldfa.dimension() {
            assert_eq!(loaded.state_count(layer), ldfa.state_count(layer));
        }
    }

    #[test]
    fn load_or_build_populates_alias_on_miss() {
        let (_guard, config) = test_config();
        let store = Store::new(config);
        let shape = Shape::new(vec![2, 2]);

        assert!(matches!(store.load("example"), Err(LdfaError::CacheMiss(_))));

        let built = store
            .load_or_build("example", || constructors::accept(shape.clone()))
            .unwrap();
        let reloaded = store.load("example").unwrap();
        assert_eq!(built.content_hash(), reloaded.content_hash());
    }
}
