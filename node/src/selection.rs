use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use ledger_config::config::Selection;
use ledger_data_structures::{
    chain::{FeeOrder, Hash, Hashable, SelectionStrategy},
    error::TransactionError,
    transaction::Transaction,
    utxo_pool::UtxoDiff,
};
use ledger_validations::validations::{
    SignatureVerifier, update_utxo_diff, validate_inputs_unspent, validate_new_outputs,
    validate_transaction,
};

/// Summary of the candidates handled in one epoch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpochReport {
    /// Hashes of the committed transactions, in commit order
    pub accepted: Vec<Hash>,
    /// Sum of the fees of the committed transactions
    pub total_fee: f64,
    /// Candidates that were not committed: position in the submitted batch and reason,
    /// sorted by position
    pub rejected: Vec<(usize, TransactionError)>,
}

impl EpochReport {
    fn accept(&mut self, tx_hash: Hash, fee: f64) {
        self.accepted.push(tx_hash);
        self.total_fee += fee;
    }

    fn reject(&mut self, index: usize, error: TransactionError) {
        log::debug!("Candidate #{} rejected ({:?}): {}", index, error.rule(), error);
        self.rejected.push((index, error));
    }
}

/// Policy used to pick, from a batch of candidates, the transactions committed in an epoch
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EpochSelector {
    /// Validate and commit candidates one by one, in the submitted order. A candidate sees the
    /// outputs created and spent by the candidates committed before it.
    #[default]
    OrderPreserving,
    /// Validate every candidate against the state at the start of the epoch, then commit the
    /// valid ones sorted by fee, skipping those that conflict with an earlier commit.
    FeeGreedy(FeeOrder),
}

impl EpochSelector {
    /// Selector for `strategy`. `fee_order` is only used by the fee-greedy strategy.
    pub fn new(strategy: SelectionStrategy, fee_order: FeeOrder) -> Self {
        match strategy {
            SelectionStrategy::OrderPreserving => EpochSelector::OrderPreserving,
            SelectionStrategy::FeeGreedy => EpochSelector::FeeGreedy(fee_order),
        }
    }

    /// Run one epoch over `candidates`.
    ///
    /// Commits are recorded in `utxo_diff`, which must describe the ledger state at the start
    /// of the epoch. Every committed transaction is finalized and returned in commit order.
    pub fn run_epoch<V: SignatureVerifier>(
        &self,
        candidates: Vec<Transaction>,
        utxo_diff: &mut UtxoDiff<'_>,
        verifier: &V,
    ) -> (Vec<Transaction>, EpochReport) {
        let mut report = EpochReport::default();

        let accepted = match *self {
            EpochSelector::OrderPreserving => {
                run_order_preserving(candidates, utxo_diff, verifier, &mut report)
            }
            EpochSelector::FeeGreedy(fee_order) => {
                run_fee_greedy(candidates, fee_order, utxo_diff, verifier, &mut report)
            }
        };
        report.rejected.sort_by_key(|(index, _)| *index);

        (accepted, report)
    }
}

impl From<&Selection> for EpochSelector {
    fn from(selection: &Selection) -> Self {
        EpochSelector::new(selection.strategy, selection.fee_order)
    }
}

/// Finalize `tx` and record its inputs as spent and its outputs as created.
/// Nothing is modified if a transaction with the same hash was already committed.
fn commit(
    tx: &mut Transaction,
    utxo_diff: &mut UtxoDiff<'_>,
) -> Result<Hash, TransactionError> {
    validate_new_outputs(Hashable::hash(&*tx), tx.outputs().len(), utxo_diff)?;
    let tx_hash = tx.finalize()?;
    update_utxo_diff(utxo_diff, tx.inputs(), tx.outputs(), tx_hash);

    Ok(tx_hash)
}

fn run_order_preserving<V: SignatureVerifier>(
    candidates: Vec<Transaction>,
    utxo_diff: &mut UtxoDiff<'_>,
    verifier: &V,
    report: &mut EpochReport,
) -> Vec<Transaction> {
    let mut accepted = Vec::with_capacity(candidates.len());

    for (index, mut tx) in candidates.into_iter().enumerate() {
        let committed = validate_transaction(&tx, utxo_diff, verifier)
            .and_then(|fee| commit(&mut tx, utxo_diff).map(|tx_hash| (tx_hash, fee)));

        match committed {
            Ok((tx_hash, fee)) => {
                log::trace!("Committed transaction {} with fee {}", tx_hash, fee);
                report.accept(tx_hash, fee);
                accepted.push(tx);
            }
            Err(e) => report.reject(index, e),
        }
    }

    accepted
}

fn run_fee_greedy<V: SignatureVerifier>(
    candidates: Vec<Transaction>,
    fee_order: FeeOrder,
    utxo_diff: &mut UtxoDiff<'_>,
    verifier: &V,
    report: &mut EpochReport,
) -> Vec<Transaction> {
    // Screen every candidate against the state at the start of the epoch
    let mut retained = Vec::with_capacity(candidates.len());
    for (index, tx) in candidates.into_iter().enumerate() {
        match validate_transaction(&tx, utxo_diff, verifier) {
            Ok(fee) => retained.push((index, tx, fee)),
            Err(e) => report.reject(index, e),
        }
    }

    // Stable sorts, equal fees keep the submitted order
    match fee_order {
        FeeOrder::Descending => retained.sort_by_key(|(_, _, fee)| Reverse(OrderedFloat(*fee))),
        FeeOrder::Ascending => retained.sort_by_key(|(_, _, fee)| OrderedFloat(*fee)),
    }

    let mut accepted = Vec::with_capacity(retained.len());
    for (index, mut tx, fee) in retained {
        // Only the claimed outputs can have changed since screening
        let committed = validate_inputs_unspent(tx.inputs(), utxo_diff)
            .inspect_err(|e| {
                log::warn!(
                    "Candidate #{} with fee {} conflicts with a transaction committed earlier in this epoch: {}",
                    index,
                    fee,
                    e
                )
            })
            .and_then(|()| commit(&mut tx, utxo_diff));

        match committed {
            Ok(tx_hash) => {
                log::trace!("Committed transaction {} with fee {}", tx_hash, fee);
                report.accept(tx_hash, fee);
                accepted.push(tx);
            }
            Err(e) => report.reject(index, e),
        }
    }

    accepted
}
