use account_book::cli::{BlockView, TransactionView};
use account_book::{AccountBook, BlockchainError, Command, Opt, Wallets, GLOBAL_CONFIG};
use clap::Parser;
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use log::{error, LevelFilter};
use std::process;

fn main() {
    // Info by default; RUST_LOG still wins
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();
    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn open_book() -> Result<AccountBook, BlockchainError> {
    AccountBook::open_path(GLOBAL_CONFIG.get_data_dir(), GLOBAL_CONFIG.get_bits()?)
}

// --miner, then MINING_ADDRESS, else no block reward
fn miner_address(miner: Option<String>) -> String {
    miner
        .or_else(|| GLOBAL_CONFIG.get_mining_addr())
        .unwrap_or_default()
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Createwallet => {
            let mut wallets = Wallets::load(GLOBAL_CONFIG.get_wallet_file())?;
            let address = wallets.create_wallet()?;
            println!("Your new address: {address}")
        }
        Command::ListAddresses => {
            let wallets = Wallets::load(GLOBAL_CONFIG.get_wallet_file())?;
            for address in wallets.get_addresses() {
                println!("{address}")
            }
        }
        Command::GetBalance { address } => {
            let balance = open_book()?.balance(&address)?;
            println!("Balance of {address}: {balance}");
        }
        Command::ListUtxo { address } => {
            for utxo in open_book()?.list_utxo(&address)? {
                println!(
                    "txid = {}, vout = {}, value = {}",
                    HEXLOWER.encode(&utxo.txid),
                    utxo.vout,
                    utxo.value
                );
            }
        }
        Command::Reward {
            address,
            note,
            miner,
        } => {
            let book = open_book()?;
            let tx = book.reward(&address, note.as_deref().unwrap_or(""))?;
            book.mine(&miner_address(miner))?;
            println!("Rewarded {address} in {}", HEXLOWER.encode(tx.get_id()));
        }
        Command::Send {
            from,
            to,
            amount,
            miner,
        } => {
            let wallets = Wallets::load(GLOBAL_CONFIG.get_wallet_file())?;
            let wallet = wallets
                .get_wallet(&from)
                .ok_or_else(|| BlockchainError::Wallet(format!("No local wallet for {from}")))?;
            let book = open_book()?;
            let tx = book.transfer(&from, &to, amount, wallet)?;
            book.mine(&miner_address(miner))?;
            println!("Success! txid {}", HEXLOWER.encode(tx.get_id()))
        }
        Command::Printchain { json } => {
            let book = open_book()?;
            let views: Vec<BlockView> = book
                .blocks()?
                .iter()
                .enumerate()
                .rev()
                .map(|(height, block)| BlockView::new(height, block))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                for view in views {
                    println!("{view}");
                }
            }
        }
        Command::FindTx { txid } => {
            let id = HEXLOWER_PERMISSIVE.decode(txid.as_bytes())?;
            match open_book()?.find_transaction(&id)? {
                Some(tx) => print!("{}", TransactionView::new(&tx)),
                None => return Err(format!("Transaction {txid} not found").into()),
            }
        }
        Command::Validate => {
            let book = open_book()?;
            book.validate()?;
            println!("Chain valid at height {}", book.height()?);
        }
    }
    Ok(())
}
