//! Storage, deduplication and finalization of bridge definitions.
//!
//! The manager owns the only mutable state shared between bridge requests:
//! the ordered log of definitions, the symbol counter and the dependency
//! graph. Everything else reaches that state through this API.

use std::collections::{BTreeSet, HashMap};

use crate::backed::{DependencyGraph, NativeBacked};
use crate::error::{BridgeError, Result};
use crate::signature::{BridgeId, BridgeSignature, BridgeSymbol, SymbolNaming};

/// One generated definition, as stored in the insertion log.
#[derive(Debug, Clone)]
struct BridgeEntry {
    /// `None` for hand-written definitions inserted with [`BridgeManager::insert_raw`].
    signature: Option<BridgeSignature>,
    managed: Vec<String>,
    native: Vec<String>,
}

#[derive(Debug, Clone)]
struct SignatureSlot {
    symbol: BridgeSymbol,
    /// Set once text for this signature has been logged.
    id: Option<BridgeId>,
}

/// Accumulates bridge definitions for one compilation unit.
#[derive(Debug)]
pub struct BridgeManager {
    naming: SymbolNaming,
    log: Vec<BridgeEntry>,
    slots: HashMap<BridgeSignature, SignatureSlot>,
    next_ordinal: usize,
    graph: DependencyGraph,
    finalized: bool,
}

impl BridgeManager {
    pub fn new(naming: SymbolNaming) -> Self {
        Self {
            naming,
            log: Vec::new(),
            slots: HashMap::new(),
            next_ordinal: 0,
            graph: DependencyGraph::new(),
            finalized: false,
        }
    }

    pub fn naming(&self) -> &SymbolNaming {
        &self.naming
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Symbol for `signature`, allocating the next one if it is new.
    ///
    /// Returns `true` alongside the symbol when it was freshly allocated.
    pub fn reserve(&mut self, signature: &BridgeSignature) -> Result<(BridgeSymbol, bool)> {
        if self.finalized {
            return Err(BridgeError::AlreadyFinalized);
        }
        if let Some(slot) = self.slots.get(signature) {
            return Ok((slot.symbol.clone(), false));
        }
        let symbol = self.naming.symbol(self.next_ordinal);
        self.next_ordinal += 1;
        self.slots.insert(
            signature.clone(),
            SignatureSlot {
                symbol: symbol.clone(),
                id: None,
            },
        );
        Ok((symbol, true))
    }

    /// Symbol previously reserved for `signature`.
    pub fn symbol_of(&self, signature: &BridgeSignature) -> Option<&BridgeSymbol> {
        self.slots.get(signature).map(|slot| &slot.symbol)
    }

    /// Record a definition for `signature` and make `caller` depend on it.
    ///
    /// Only the first definition for a signature is kept; later ones only
    /// add the dependency edge and their text is dropped.
    pub fn insert_native_bridge(
        &mut self,
        caller: NativeBacked,
        signature: BridgeSignature,
        managed: Vec<String>,
        native: Vec<String>,
    ) -> Result<BridgeId> {
        if self.finalized {
            return Err(BridgeError::InsertAfterFinalize {
                caller: caller.index(),
            });
        }
        self.reserve(&signature)?;

        if let Some(id) = self.slots.get(&signature).and_then(|slot| slot.id) {
            tracing::debug!(%signature, bridge = id.index(), "reusing existing bridge definition");
            self.graph.register(caller, id);
            return Ok(id);
        }

        let id = BridgeId(self.log.len());
        self.log.push(BridgeEntry {
            signature: Some(signature.clone()),
            managed,
            native,
        });
        if let Some(slot) = self.slots.get_mut(&signature) {
            slot.id = Some(id);
        }
        self.graph.register(caller, id);
        Ok(id)
    }

    /// Append a hand-written definition. Raw definitions are never deduplicated.
    pub fn insert_raw(
        &mut self,
        caller: NativeBacked,
        managed: Vec<String>,
        native: Vec<String>,
    ) -> Result<BridgeId> {
        if self.finalized {
            return Err(BridgeError::InsertAfterFinalize {
                caller: caller.index(),
            });
        }
        let id = BridgeId(self.log.len());
        self.log.push(BridgeEntry {
            signature: None,
            managed,
            native,
        });
        self.graph.register(caller, id);
        Ok(id)
    }

    /// Number of definitions logged so far.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Freeze the log and dependency graph into their final text form.
    ///
    /// Callable once; afterwards every mutating call fails.
    pub fn finalize(&mut self) -> Result<NativeTextBridges> {
        if self.finalized {
            return Err(BridgeError::AlreadyFinalized);
        }
        self.finalized = true;

        let log = std::mem::take(&mut self.log);
        let graph = std::mem::take(&mut self.graph);
        let emitted: BTreeSet<BridgeId> = (0..log.len()).map(BridgeId).collect();
        let excluded = graph.callers_missing(&emitted);

        let keyed = log.iter().filter(|e| e.signature.is_some()).count();
        let mut managed = Vec::new();
        let mut native = Vec::new();
        for entry in log {
            managed.extend(entry.managed);
            native.extend(entry.native);
        }

        tracing::info!(
            bridges = emitted.len(),
            keyed,
            raw = emitted.len() - keyed,
            managed_lines = managed.len(),
            native_lines = native.len(),
            excluded = excluded.len(),
            "finalized native bridges"
        );

        Ok(NativeTextBridges {
            managed,
            native,
            bridge_count: emitted.len(),
            graph,
            excluded,
        })
    }
}

/// Finalized bridge text for one compilation unit.
///
/// Lines appear in first-insertion order on both sides.
#[derive(Debug, Clone)]
pub struct NativeTextBridges {
    managed: Vec<String>,
    native: Vec<String>,
    bridge_count: usize,
    graph: DependencyGraph,
    excluded: BTreeSet<NativeBacked>,
}

impl NativeTextBridges {
    /// Whether every bridge `caller` depends on was generated.
    ///
    /// Entities that never requested a bridge are trivially supported.
    pub fn is_supported(&self, caller: NativeBacked) -> bool {
        !self.excluded.contains(&caller)
    }

    pub fn managed_lines(&self) -> impl Iterator<Item = &str> {
        self.managed.iter().map(String::as_str)
    }

    pub fn native_lines(&self) -> impl Iterator<Item = &str> {
        self.native.iter().map(String::as_str)
    }

    /// Number of distinct definitions emitted.
    pub fn bridge_count(&self) -> usize {
        self.bridge_count
    }

    pub fn dependencies(&self, caller: NativeBacked) -> impl Iterator<Item = BridgeId> + '_ {
        self.graph.dependencies(caller)
    }
}
