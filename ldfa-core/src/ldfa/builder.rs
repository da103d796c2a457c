//! Mutable, owning builder for an [`Ldfa`]. Layers are added from the
//! terminal layer backward (layer `dimension()-1` first, then `-2`, ...,
//! down to layer `0`), since a layer's transitions can only reference
//! already-known ids in the next layer — the same direction minimization
//! (`spec.md` §4.2) and the binary set-algebra engine's backward rebuild
//! (`spec.md` §4.3) both build in.
//!
//! Transition arrays are allocated into a file-backed region (`spec.md`
//! §3, Lifecycles): capacity doubles on overflow and is truncated to the
//! exact size at finalization. A builder owns a private scratch directory
//! and deletes it (and therefore its layer files) on drop unless
//! finalized; `Ldfa::persist` (see `crate::store`) renames a finalized
//! LDFA's files into the content-addressed store instead.
use std::collections::HashMap;
use std::rc::Rc;

use tempfile::TempDir;

use crate::error::{LdfaError, Result};
use crate::ldfa::{Ldfa, StateId, ACCEPT, FIRST_REAL_STATE, REJECT};
use crate::shape::Shape;
use crate::storage::MmapArray;

struct LayerBuilder {
    width: u32,
    array: MmapArray<StateId>,
    /// transition row -> already-assigned state id, used for the
    /// per-layer staging dedup (`spec.md` §4.1: "no two state ids in the
    /// same layer have identical transition vectors").
    dedup: HashMap<Vec<StateId>, StateId>,
}

impl LayerBuilder {
    fn new(path: std::path::PathBuf, width: u32) -> Result<Self> {
        Ok(LayerBuilder {
            width,
            array: MmapArray::create(path, 64 * width.max(1) as usize)?,
            dedup: HashMap::new(),
        })
    }

    fn next_id(&self) -> StateId {
        FIRST_REAL_STATE + self.dedup.len() as u32
    }
}

pub struct LdfaBuilder {
    shape: Rc<Shape>,
    _scratch: TempDir,
    /// One entry per variable layer (`0..dimension()`), lazily created as
    /// `start_layer` is called on it — layers are built in descending
    /// order, so entry `dimension()-1` is the first to be populated.
    layers: Vec<Option<LayerBuilder>>,
    /// `state_counts[k]` for `k` in `0..=dimension()`; `[dimension()]` is
    /// fixed at 2 (the terminal layer).
    state_counts: Vec<u32>,
    initial_state: Option<StateId>,
}

impl LdfaBuilder {
    pub fn new(shape: Shape) -> Result<Self> {
        let scratch = tempfile::tempdir().map_err(|e| LdfaError::io("<tempdir>", e))?;
        let n = shape.dimension();
        let mut state_counts = vec![0u32; n + 1];
        state_counts[n] = 2;
        Ok(LdfaBuilder {
            shape: Rc::new(shape),
            _scratch: scratch,
            layers: (0..n).map(|_| None).collect(),
            state_counts,
            initial_state: None,
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of states already committed to `layer` (includes the two
    /// reserved sink ids). Valid for any layer already started, and for
    /// the implicit terminal layer.
    pub fn state_count(&self, layer: usize) -> u32 {
        self.state_counts[layer]
    }

    fn layer_mut(&mut self, layer: usize) -> Result<&mut LayerBuilder> {
        if self.layers[layer].is_none() {
            let path = self._scratch.path().join(format!("layer-{layer}.bin"));
            let width = self.shape.layer_width(layer);
            self.layers[layer] = Some(LayerBuilder::new(path, width)?);
        }
        Ok(self.layers[layer].as_mut().unwrap())
    }

    /// Adds a state to `layer` with the given transition row (one entry
    /// per character of `shape.layer_width(layer)`, each an id valid in
    /// `layer + 1`). Returns the existing id if an identical row was
    /// already added to this layer (the staging dedup). `layer + 1` must
    /// already be fully built (or be the implicit terminal layer, if
    /// `layer == dimension() - 1`).
    pub fn add_state(&mut self, layer: usize, transitions: &[StateId]) -> Result<StateId> {
        let width = self.shape.layer_width(layer);
        assert_eq!(
            transitions.len(),
            width as usize,
            "layer {layer} expects {width} transitions, got {}",
            transitions.len()
        );
        let next_layer_count = self.state_counts[layer + 1];
        for (c, &target) in transitions.iter().enumerate() {
            if target >= next_layer_count {
                return Err(LdfaError::InvalidStateId {
                    layer,
                    target,
                    state_count: next_layer_count,
                });
            }
            let _ = c;
        }

        // constant collapse: if every transition is the same sink, the
        // state itself is that sink and is not added to the layer.
        if transitions.iter().all(|&t| t == REJECT) {
            return Ok(REJECT);
        }
        if transitions.iter().all(|&t| t == ACCEPT) {
            return Ok(ACCEPT);
        }

        let row = transitions.to_vec();
        let layer_builder = self.layer_mut(layer)?;
        if let Some(&existing) = layer_builder.dedup.get(&row) {
            return Ok(existing);
        }
        let id = layer_builder.next_id();
        layer_builder.array.extend_from_slice(&row)?;
        layer_builder.dedup.insert(row, id);
        self.state_counts[layer] = id + 1;
        Ok(id)
    }

    /// Publishes the initial state (must be a valid id in layer 0),
    /// finalizing the builder into an immutable [`Ldfa`]. Fatal
    /// (`spec.md` §7, "Finalization race") to call twice.
    pub fn finalize(mut self, initial_state: StateId) -> Result<Ldfa> {
        if self.initial_state.is_some() {
            return Err(LdfaError::InitialStateAlreadySet);
        }
        if initial_state >= self.state_counts[0].max(FIRST_REAL_STATE) && initial_state > ACCEPT {
            return Err(LdfaError::InvalidStateId {
                layer: 0,
                target: initial_state,
                state_count: self.state_counts[0],
            });
        }
        self.initial_state = Some(initial_state);

        let n = self.shape.dimension();
        let mut transitions = Vec::with_capacity(n);
        for layer in 0..n {
            match &mut self.layers[layer] {
                Some(lb) => {
                    let exact_len = (lb.next_id() - FIRST_REAL_STATE) as usize * lb.width as usize;
                    lb.array.truncate(exact_len)?;
                    transitions.push(Rc::<[StateId]>::from(lb.array.as_slice()));
                }
                None => transitions.push(Rc::<[StateId]>::from(Vec::new())),
            }
        }

        Ok(Ldfa {
            shape: self.shape.clone(),
            transitions: Rc::new(transitions),
            state_counts: Rc::new(self.state_counts.clone()),
            initial_state,
        })
    }
}
