use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::chain::{OutputPointer, ValueTransferOutput};

/// Unspent Outputs Pool
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnspentOutputsPool {
    /// Map of output pointer to value transfer output
    map: HashMap<OutputPointer, ValueTransferOutput>,
}

impl UnspentOutputsPool {
    pub fn get(&self, k: &OutputPointer) -> Option<&ValueTransferOutput> {
        self.map.get(k)
    }

    pub fn contains_key(&self, k: &OutputPointer) -> bool {
        self.map.contains_key(k)
    }

    /// Insert an output. Returns the previous output with the same pointer, which in a
    /// consistent ledger is always `None`.
    pub fn insert(
        &mut self,
        k: OutputPointer,
        v: ValueTransferOutput,
    ) -> Option<ValueTransferOutput> {
        self.map.insert(k, v)
    }

    pub fn remove(&mut self, k: &OutputPointer) -> Option<ValueTransferOutput> {
        self.map.remove(k)
    }

    pub fn drain(
        &mut self,
    ) -> std::collections::hash_map::Drain<'_, OutputPointer, ValueTransferOutput> {
        self.map.drain()
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, OutputPointer, ValueTransferOutput> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Sum of the values of all the unspent outputs
    pub fn total_value(&self) -> f64 {
        self.map.values().map(|vto| vto.value).sum()
    }
}

impl FromIterator<(OutputPointer, ValueTransferOutput)> for UnspentOutputsPool {
    fn from_iter<I: IntoIterator<Item = (OutputPointer, ValueTransferOutput)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// Outputs that were spent after the ledger was created.
///
/// Only used to tell apart "already spent" from "never existed" in error messages, it has no
/// say on whether an output can be spent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpentOutputsPool {
    map: HashMap<OutputPointer, ValueTransferOutput>,
}

impl SpentOutputsPool {
    pub fn contains_key(&self, k: &OutputPointer) -> bool {
        self.map.contains_key(k)
    }

    pub fn insert(&mut self, k: OutputPointer, v: ValueTransferOutput) {
        self.map.insert(k, v);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Extend<(OutputPointer, ValueTransferOutput)> for SpentOutputsPool {
    fn extend<I: IntoIterator<Item = (OutputPointer, ValueTransferOutput)>>(&mut self, iter: I) {
        self.map.extend(iter)
    }
}

/// Diffs to apply to an utxo set. This type does not contains a
/// reference to the original utxo set.
#[derive(Debug, Default)]
pub struct Diff {
    utxos_to_add: UnspentOutputsPool,
    utxos_to_remove: HashSet<OutputPointer>,
    // Created and spent inside the diff, never reach the utxo set
    utxos_spent_in_diff: UnspentOutputsPool,
}

impl Diff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the insertions and deletions to `utxo_set`, returning every output spent by the
    /// diff: the ones removed from `utxo_set` and the ones created and spent inside the diff.
    pub fn apply(
        mut self,
        utxo_set: &mut UnspentOutputsPool,
    ) -> Vec<(OutputPointer, ValueTransferOutput)> {
        for (output_pointer, output) in self.utxos_to_add.drain() {
            let previous = utxo_set.insert(output_pointer.clone(), output);
            if previous.is_some() {
                log::error!("Output {} was overwritten", output_pointer);
            }
        }

        let mut removed = Vec::with_capacity(self.utxos_to_remove.len());
        for output_pointer in self.utxos_to_remove {
            match utxo_set.remove(&output_pointer) {
                Some(output) => removed.push((output_pointer, output)),
                None => log::error!("Output {} was not in the utxo set", output_pointer),
            }
        }
        removed.extend(self.utxos_spent_in_diff.drain());

        removed
    }

    /// Whether applying the diff leaves the utxo set unchanged
    pub fn is_empty(&self) -> bool {
        self.utxos_to_add.is_empty() && self.utxos_to_remove.is_empty()
    }

    /// Iterate over all the utxos_to_add and utxos_to_remove while applying a function.
    ///
    /// Any shared mutable state used by `F1` and `F2` can be used as the first argument:
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use ledger_data_structures::utxo_pool::Diff;
    ///
    /// let diff = Diff::new();
    /// let mut hashmap = HashMap::new();
    /// diff.visit(&mut hashmap, |hashmap, output_pointer, output| {
    ///     hashmap.insert(output_pointer.clone(), output.clone());
    /// }, |hashmap, output_pointer| {
    ///     hashmap.remove(output_pointer);
    /// });
    /// ```
    pub fn visit<A, F1, F2>(&self, args: &mut A, fn_add: F1, fn_remove: F2)
    where
        F1: Fn(&mut A, &OutputPointer, &ValueTransferOutput),
        F2: Fn(&mut A, &OutputPointer),
    {
        for (output_pointer, output) in self.utxos_to_add.iter() {
            fn_add(args, output_pointer, output);
        }

        for output_pointer in self.utxos_to_remove.iter() {
            fn_remove(args, output_pointer);
        }
    }
}

/// Contains a reference to an UnspentOutputsPool plus subsequent
/// insertions and deletions to performed on that pool.
/// Use `.take_diff()` to obtain an instance of the `Diff` type.
pub struct UtxoDiff<'a> {
    diff: Diff,
    utxo_set: &'a UnspentOutputsPool,
    spent_outputs: Option<&'a SpentOutputsPool>,
}

impl<'a> UtxoDiff<'a> {
    /// Create a new UtxoDiff without additional insertions or deletions
    pub fn new(utxo_set: &'a UnspentOutputsPool) -> Self {
        UtxoDiff {
            diff: Diff::new(),
            utxo_set,
            spent_outputs: None,
        }
    }

    /// Like `new`, also keeping track of the outputs spent before this diff
    pub fn with_spent_outputs(
        utxo_set: &'a UnspentOutputsPool,
        spent_outputs: &'a SpentOutputsPool,
    ) -> Self {
        UtxoDiff {
            diff: Diff::new(),
            utxo_set,
            spent_outputs: Some(spent_outputs),
        }
    }

    /// Record an insertion to perform on the utxo set
    pub fn insert_utxo(&mut self, output_pointer: OutputPointer, output: ValueTransferOutput) {
        self.diff.utxos_to_add.insert(output_pointer, output);
    }

    /// Record a deletion to perform on the utxo set
    pub fn remove_utxo(&mut self, output_pointer: OutputPointer) {
        match self.diff.utxos_to_add.remove(&output_pointer) {
            Some(output) => {
                self.diff.utxos_spent_in_diff.insert(output_pointer, output);
            }
            None => {
                self.diff.utxos_to_remove.insert(output_pointer);
            }
        }
    }

    /// Get an utxo from the original utxo set or one that has been
    /// recorded as inserted later. If the same utxo has been recorded
    /// as removed, None will be returned.
    pub fn get(&self, output_pointer: &OutputPointer) -> Option<&ValueTransferOutput> {
        self.utxo_set
            .get(output_pointer)
            .or_else(|| self.diff.utxos_to_add.get(output_pointer))
            .and_then(|output| {
                if self.diff.utxos_to_remove.contains(output_pointer) {
                    None
                } else {
                    Some(output)
                }
            })
    }

    /// Whether the output is currently spendable
    pub fn contains_key(&self, output_pointer: &OutputPointer) -> bool {
        self.get(output_pointer).is_some()
    }

    /// Whether the output existed and was spent, either by this diff or before it
    pub fn was_spent(&self, output_pointer: &OutputPointer) -> bool {
        self.diff.utxos_to_remove.contains(output_pointer)
            || self.diff.utxos_spent_in_diff.contains_key(output_pointer)
            || self
                .spent_outputs
                .is_some_and(|spent| spent.contains_key(output_pointer))
    }

    /// Consumes the UtxoDiff and returns only the diffs, without the
    /// reference to the utxo set.
    pub fn take_diff(self) -> Diff {
        self.diff
    }
}
