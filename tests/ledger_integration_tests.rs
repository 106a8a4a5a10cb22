//! Ledger integration tests
//!
//! End-to-end flows against a sled store in a temporary directory: rewards,
//! transfers, persistence across reopen and damaged stores.

use account_book::core::{Blockchain, ProofOfWork, ZERO_HASH};
use account_book::error::BlockchainError;
use account_book::storage::{BlockStore, SledStore, TxPool, UTXOSet};
use account_book::wallet::{hash_pub_key, Wallet, Wallets};
use account_book::AccountBook;
use tempfile::tempdir;

const EASY_BITS: [u8; 4] = [0x20, 0x7f, 0xff, 0xff];

fn reward_and_mine(book: &AccountBook, wallet: &Wallet) {
    book.reward(&wallet.get_address(), "").unwrap();
    book.mine("").unwrap().unwrap();
}

#[test]
fn test_balance_conservation_on_disk() {
    let temp_dir = tempdir().unwrap();
    let book = AccountBook::open_path(temp_dir.path().join("chain"), EASY_BITS).unwrap();
    let a = Wallet::new().unwrap();
    let b = Wallet::new().unwrap();

    reward_and_mine(&book, &a);
    reward_and_mine(&book, &b);
    let reward_id = book.list_utxo(&a.get_address()).unwrap()[0].txid.clone();

    book.transfer(&a.get_address(), &b.get_address(), 40, &a)
        .unwrap();
    book.mine("").unwrap().unwrap();

    assert_eq!(book.balance(&a.get_address()).unwrap(), 60);
    assert_eq!(book.balance(&b.get_address()).unwrap(), 140);
    assert!(book
        .list_utxo(&a.get_address())
        .unwrap()
        .iter()
        .all(|utxo| utxo.txid != reward_id));
    book.validate().unwrap();
}

#[test]
fn test_reopen_round_trip() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("chain");
    let a = Wallet::new().unwrap();
    let b = Wallet::new().unwrap();

    let (blocks, tip) = {
        let book = AccountBook::open_path(&path, EASY_BITS).unwrap();
        reward_and_mine(&book, &a);
        book.transfer(&a.get_address(), &b.get_address(), 25, &a)
            .unwrap();
        book.mine(&b.get_address()).unwrap().unwrap();
        (book.blocks().unwrap(), book.tip_hash().unwrap())
    };

    let reopened = AccountBook::open_path(&path, EASY_BITS).unwrap();
    assert_eq!(reopened.blocks().unwrap(), blocks);
    assert_eq!(reopened.tip_hash().unwrap(), tip);
    assert_eq!(reopened.height().unwrap(), 2);
    assert_eq!(reopened.balance(&a.get_address()).unwrap(), 75);
    assert_eq!(reopened.balance(&b.get_address()).unwrap(), 125);
    reopened.validate().unwrap();
}

#[test]
fn test_hash_chain_integrity() {
    let temp_dir = tempdir().unwrap();
    let store = SledStore::open(temp_dir.path().join("chain")).unwrap();
    let mut chain = Blockchain::open(Box::new(store), EASY_BITS).unwrap();
    let wallet = Wallet::new().unwrap();

    for round in 0..4 {
        let mut pool = TxPool::new();
        pool.add(
            account_book::Transaction::new_coinbase_tx(
                &wallet.get_address(),
                &format!("round {round}"),
            )
            .unwrap(),
        );
        chain.add_block(&mut pool, &wallet.get_address()).unwrap();
    }

    let blocks = chain.blocks();
    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks[0].get_previous_hash(), &ZERO_HASH);
    for pair in blocks.windows(2) {
        assert_eq!(pair[1].get_previous_hash(), &pair[0].hash());
        assert!(ProofOfWork::validate(&pair[1]));
        assert!(pair[1].verify_merkle_root().unwrap());
    }
    assert_eq!(
        UTXOSet::new(&chain).get_balance(&hash_pub_key(wallet.get_public_key())),
        800
    );
}

#[test]
fn test_double_spend_and_insufficient_funds() {
    let temp_dir = tempdir().unwrap();
    let book = AccountBook::open_path(temp_dir.path().join("chain"), EASY_BITS).unwrap();
    let a = Wallet::new().unwrap();
    let b = Wallet::new().unwrap();
    reward_and_mine(&book, &a);

    let first = book
        .create_transaction(&a.get_address(), &b.get_address(), 100, &a)
        .unwrap();
    book.submit_transaction(first.clone()).unwrap();
    book.mine("").unwrap().unwrap();

    assert!(book.submit_transaction(first).is_err());
    let err = book
        .transfer(&a.get_address(), &b.get_address(), 1, &a)
        .unwrap_err();
    assert_eq!(
        err,
        BlockchainError::InsufficientFunds {
            required: 1,
            available: 0
        }
    );
    assert_eq!(book.pending_count().unwrap(), 0);
    assert_eq!(book.mine("").unwrap(), None);
    assert_eq!(book.balance(&b.get_address()).unwrap(), 100);
}

#[test]
fn test_corrupted_store_is_malformed() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("chain");
    let tip = {
        let book = AccountBook::open_path(&path, EASY_BITS).unwrap();
        reward_and_mine(&book, &Wallet::new().unwrap());
        book.tip_hash().unwrap()
    };

    {
        let db = sled::open(&path).unwrap();
        let tree = db.open_tree("blocks").unwrap();
        tree.insert(tip, &b"garbage"[..]).unwrap();
        db.flush().unwrap();
    }

    assert!(matches!(
        AccountBook::open_path(&path, EASY_BITS),
        Err(BlockchainError::MalformedChainData(_))
    ));
}

#[test]
fn test_store_survives_without_ledger() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("chain");
    let genesis = {
        let chain = Blockchain::open(Box::new(SledStore::open(&path).unwrap()), EASY_BITS).unwrap();
        chain.tip_hash()
    };

    let store = SledStore::open(&path).unwrap();
    assert_eq!(store.get_last_hash().unwrap(), Some(genesis));
    assert!(store.get_block(&genesis).unwrap().unwrap().is_genesis());
}

#[test]
fn test_wallet_file_feeds_transfers() {
    let temp_dir = tempdir().unwrap();
    let wallet_path = temp_dir.path().join("wallet.dat");
    let (from, to) = {
        let mut wallets = Wallets::load(&wallet_path).unwrap();
        (wallets.create_wallet().unwrap(), wallets.create_wallet().unwrap())
    };

    let wallets = Wallets::load(&wallet_path).unwrap();
    let wallet = wallets.get_wallet(&from).unwrap();
    let book = AccountBook::open_path(temp_dir.path().join("chain"), EASY_BITS).unwrap();
    book.reward(&from, "").unwrap();
    book.mine("").unwrap();

    book.transfer(&from, &to, 30, wallet).unwrap();
    book.mine("").unwrap();
    assert_eq!(book.balance(&from).unwrap(), 70);
    assert_eq!(book.balance(&to).unwrap(), 30);
}
