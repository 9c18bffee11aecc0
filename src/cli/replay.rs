use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};
use structopt::StructOpt;

use ledger_config::config::Config;
use ledger_data_structures::{
    chain::{FeeOrder, SelectionStrategy},
    transaction::Transaction,
    utxo_pool::UnspentOutputsPool,
};
use ledger_node::{EpochReport, TxHandler};

#[derive(Debug, StructOpt)]
pub struct Command {
    /// JSON file with the initial unspent outputs and the transactions submitted in every epoch
    #[structopt(parse(from_os_str))]
    pub scenario: PathBuf,
    /// Override the selection strategy of the configuration: order_preserving or fee_greedy
    #[structopt(long = "strategy", parse(try_from_str = parse_strategy))]
    pub strategy: Option<SelectionStrategy>,
    /// Override the fee order of the configuration: descending or ascending
    #[structopt(long = "fee-order", parse(try_from_str = parse_fee_order))]
    pub fee_order: Option<FeeOrder>,
}

/// Scenario file contents
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Scenario {
    /// Unspent outputs before the first epoch, keyed by "<transaction hash>:<output index>"
    #[serde(default)]
    utxos: UnspentOutputsPool,
    /// Candidate transactions of every epoch
    epochs: Vec<Vec<Transaction>>,
}

pub fn exec_cmd(command: Command, mut config: Config) -> anyhow::Result<()> {
    if let Some(strategy) = command.strategy {
        config.selection.strategy = strategy;
    }
    if let Some(fee_order) = command.fee_order {
        config.selection.fee_order = fee_order;
    }

    let scenario = read_scenario(&command.scenario)?;
    log::info!(
        "Replaying {} epochs over {} unspent outputs with {:?}",
        scenario.epochs.len(),
        scenario.utxos.len(),
        config.selection
    );

    let (reports, utxos) = replay(scenario, &config);
    for (epoch, (candidates_n, report)) in reports.iter().enumerate() {
        print_report(epoch, *candidates_n, report);
    }
    println!(
        "Unspent outputs: {}, total value: {}",
        utxos.len(),
        utxos.total_value()
    );

    Ok(())
}

fn read_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let file = File::open(path)
        .with_context(|| format!("Could not open scenario file {}", path.display()))?;

    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid scenario file {}", path.display()))
}

/// Handle every epoch of `scenario`, returning the number of candidates and the report of
/// each epoch together with the final unspent outputs
fn replay(scenario: Scenario, config: &Config) -> (Vec<(usize, EpochReport)>, UnspentOutputsPool) {
    let handler = TxHandler::from_config(&scenario.utxos, config);

    let reports = scenario
        .epochs
        .into_iter()
        .map(|candidates| {
            let candidates_n = candidates.len();
            let (_accepted, report) = handler.handle_txs_with_report(candidates);

            (candidates_n, report)
        })
        .collect();

    (reports, handler.utxo_pool())
}

fn print_report(epoch: usize, candidates_n: usize, report: &EpochReport) {
    println!(
        "Epoch #{}: {} of {} transactions committed, total fee: {}",
        epoch,
        report.accepted.len(),
        candidates_n,
        report.total_fee
    );
    for tx_hash in &report.accepted {
        println!("  committed {}", tx_hash);
    }
    for (index, error) in &report.rejected {
        println!("  rejected #{}: {}", index, error);
    }
}

fn parse_json_str<T: DeserializeOwned>(s: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
}

fn parse_strategy(s: &str) -> Result<SelectionStrategy, serde_json::Error> {
    parse_json_str(s)
}

fn parse_fee_order(s: &str) -> Result<FeeOrder, serde_json::Error> {
    parse_json_str(s)
}
