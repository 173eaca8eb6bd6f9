//! Entities backed by native bridges, and the bridges each one depends on.

use std::collections::{BTreeMap, BTreeSet};

use crate::signature::BridgeId;

/// Opaque handle for a higher-level entity that needs bridges to exist.
///
/// Handles carry identity only. They are minted by a [`NativeBackedArena`]
/// and stay valid for the whole compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeBacked(usize);

impl NativeBacked {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Mints [`NativeBacked`] handles and remembers a label for each, for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct NativeBackedArena {
    labels: Vec<String>,
}

impl NativeBackedArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, label: impl Into<String>) -> NativeBacked {
        let handle = NativeBacked(self.labels.len());
        self.labels.push(label.into());
        handle
    }

    pub fn label(&self, handle: NativeBacked) -> &str {
        self.labels
            .get(handle.index())
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NativeBacked> + '_ {
        (0..self.labels.len()).map(NativeBacked)
    }
}

/// Which bridge definitions each entity depends on.
///
/// Registration is idempotent and order-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeMap<NativeBacked, BTreeSet<BridgeId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, caller: NativeBacked, bridge: BridgeId) {
        self.edges.entry(caller).or_default().insert(bridge);
    }

    /// Bridges registered under `caller`, ascending.
    pub fn dependencies(&self, caller: NativeBacked) -> impl Iterator<Item = BridgeId> + '_ {
        self.edges.get(&caller).into_iter().flatten().copied()
    }

    pub fn callers(&self) -> impl Iterator<Item = NativeBacked> + '_ {
        self.edges.keys().copied()
    }

    /// Callers that depend on at least one bridge outside `emitted`.
    pub fn callers_missing(&self, emitted: &BTreeSet<BridgeId>) -> BTreeSet<NativeBacked> {
        self.edges
            .iter()
            .filter(|(_, deps)| !deps.is_subset(emitted))
            .map(|(caller, _)| *caller)
            .collect()
    }
}
