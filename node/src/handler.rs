use std::sync::{Mutex, MutexGuard, PoisonError};

use ledger_config::config::Config;
use ledger_data_structures::{
    chain::OutputPointer,
    error::TransactionError,
    transaction::Transaction,
    utxo_pool::{SpentOutputsPool, UnspentOutputsPool, UtxoDiff},
};
use ledger_validations::validations::{
    Secp256k1Verifier, SignatureVerifier, is_valid_transaction, transaction_fee,
    validate_transaction,
};

use crate::selection::{EpochReport, EpochSelector};

/// Ledger state guarded by the handler lock
#[derive(Debug, Default)]
struct LedgerState {
    unspent_outputs_pool: UnspentOutputsPool,
    spent_outputs_pool: SpentOutputsPool,
}

impl LedgerState {
    fn utxo_diff(&self) -> UtxoDiff<'_> {
        UtxoDiff::with_spent_outputs(&self.unspent_outputs_pool, &self.spent_outputs_pool)
    }
}

/// Owner of a ledger: validates candidate transactions and commits, epoch after epoch, the
/// ones picked by its [`EpochSelector`].
///
/// Every operation holds an internal lock for its whole duration, so a handler can be shared
/// between threads.
pub struct TxHandler<V = Secp256k1Verifier> {
    state: Mutex<LedgerState>,
    selector: EpochSelector,
    verifier: V,
}

impl TxHandler<Secp256k1Verifier> {
    /// Create a handler that starts from a copy of `utxo_pool` and commits transactions in
    /// submission order
    pub fn new(utxo_pool: &UnspentOutputsPool) -> Self {
        Self::with_strategy(utxo_pool, EpochSelector::default())
    }

    /// Create a handler that starts from a copy of `utxo_pool` and uses `selector`
    pub fn with_strategy(utxo_pool: &UnspentOutputsPool, selector: EpochSelector) -> Self {
        Self::with_verifier(utxo_pool, selector, Secp256k1Verifier)
    }

    /// Create a handler with the selection policy of `config`
    pub fn from_config(utxo_pool: &UnspentOutputsPool, config: &Config) -> Self {
        Self::with_strategy(utxo_pool, EpochSelector::from(&config.selection))
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    /// Create a handler that checks input signatures with `verifier`
    pub fn with_verifier(
        utxo_pool: &UnspentOutputsPool,
        selector: EpochSelector,
        verifier: V,
    ) -> Self {
        let state = LedgerState {
            unspent_outputs_pool: utxo_pool.clone(),
            spent_outputs_pool: SpentOutputsPool::default(),
        };

        TxHandler {
            state: Mutex::new(state),
            selector,
            verifier,
        }
    }

    // The state is only modified by applying a complete diff, so it is consistent even if a
    // previous holder of the lock panicked
    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The selection policy of this handler
    pub fn selector(&self) -> EpochSelector {
        self.selector
    }

    /// Whether `tx` is valid against the current state
    pub fn is_valid(&self, tx: &Transaction) -> bool {
        let state = self.lock_state();

        is_valid_transaction(tx, &state.utxo_diff(), &self.verifier)
    }

    /// Validate `tx` against the current state, returning its fee
    pub fn validate(&self, tx: &Transaction) -> Result<f64, TransactionError> {
        let state = self.lock_state();

        validate_transaction(tx, &state.utxo_diff(), &self.verifier)
    }

    /// Inputs minus outputs of `tx` against the current state, negative if the outputs are
    /// worth more. Fails only if an input claims an output that is not unspent.
    pub fn transaction_fee(&self, tx: &Transaction) -> Result<f64, TransactionError> {
        let state = self.lock_state();

        transaction_fee(tx, &state.utxo_diff())
    }

    /// Handle one epoch: commit the transactions picked from `txs` and return them, finalized,
    /// in commit order
    pub fn handle_txs(&self, txs: Vec<Transaction>) -> Vec<Transaction> {
        self.handle_txs_with_report(txs).0
    }

    /// Like [`handle_txs`](Self::handle_txs), also returning why every other candidate was
    /// rejected
    pub fn handle_txs_with_report(
        &self,
        txs: Vec<Transaction>,
    ) -> (Vec<Transaction>, EpochReport) {
        let candidates_n = txs.len();
        let mut state = self.lock_state();

        let mut utxo_diff = state.utxo_diff();
        let (accepted, report) = self.selector.run_epoch(txs, &mut utxo_diff, &self.verifier);
        let diff = utxo_diff.take_diff();

        let LedgerState {
            unspent_outputs_pool,
            spent_outputs_pool,
        } = &mut *state;
        let spent = diff.apply(unspent_outputs_pool);
        spent_outputs_pool.extend(spent);

        log::info!(
            "Epoch handled: {} of {} transactions committed, total fee {}, {} unspent outputs",
            accepted.len(),
            candidates_n,
            report.total_fee,
            unspent_outputs_pool.len()
        );

        (accepted, report)
    }

    /// Copy of the current unspent outputs pool
    pub fn utxo_pool(&self) -> UnspentOutputsPool {
        self.lock_state().unspent_outputs_pool.clone()
    }

    /// Whether `output_pointer` is currently unspent
    pub fn contains_utxo(&self, output_pointer: &OutputPointer) -> bool {
        self.lock_state()
            .unspent_outputs_pool
            .contains_key(output_pointer)
    }
}
