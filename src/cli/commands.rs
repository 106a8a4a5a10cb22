use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "account-book")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "createwallet", about = "Create a new wallet")]
    Createwallet,
    #[command(name = "listaddresses", about = "Print local wallet addresses")]
    ListAddresses,
    #[command(
        name = "getbalance",
        about = "Get the wallet balance of the target address"
    )]
    GetBalance {
        #[arg(help = "The wallet address")]
        address: String,
    },
    #[command(name = "listutxo", about = "List unspent outputs paying an address")]
    ListUtxo {
        #[arg(help = "The wallet address")]
        address: String,
    },
    #[command(name = "reward", about = "Mine a block rewarding an address")]
    Reward {
        #[arg(help = "Address that receives the reward")]
        address: String,
        #[arg(long = "note", help = "Text carried by the reward input")]
        note: Option<String>,
        #[arg(long = "miner", help = "Also pay a block reward to this address")]
        miner: Option<String>,
    },
    #[command(name = "send", about = "Send value between addresses and mine it")]
    Send {
        #[arg(help = "Source wallet address")]
        from: String,
        #[arg(help = "Destination wallet address")]
        to: String,
        #[arg(help = "Amount to send")]
        amount: u64,
        #[arg(long = "miner", help = "Pay the block reward to this address")]
        miner: Option<String>,
    },
    #[command(name = "printchain", about = "Print all blocks in the ledger")]
    Printchain {
        #[arg(long = "json", help = "Print as JSON")]
        json: bool,
    },
    #[command(name = "findtx", about = "Look up a transaction by id")]
    FindTx {
        #[arg(help = "Transaction id in hex")]
        txid: String,
    },
    #[command(name = "validate", about = "Check the whole chain")]
    Validate,
}
