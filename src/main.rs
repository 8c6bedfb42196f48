//! Wager Marketplace Settlement Simulation.
//!
//! Demonstrates the settlement core lifecycle: listing a pending wager
//! position for sale, atomic purchase with funds transfer, the rejection
//! taxonomy, and a concurrent buyer race over one listing.

use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;
use wager_market::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wager_market=info".into()),
        )
        .init();

    println!("Wager Marketplace Settlement Core Simulation");
    println!("Atomic Listing Purchase, Versioned Store, Bounded Retries\n");

    scenario_1_list_and_settle();
    scenario_2_rejection_gallery();
    scenario_3_contended_settlement();

    println!("\nAll simulations completed successfully.");
}

fn seed(store: &MemoryStore, account: &str, balance: rust_decimal::Decimal) -> AccountId {
    let id = AccountId::new(account);
    store.insert_account(Account::with_balance(
        id.clone(),
        Money::new(balance),
        Timestamp::now(),
    ));
    id
}

fn seed_position(store: &MemoryStore, id: &str, owner: &AccountId) -> PositionId {
    let position_id = PositionId::new(id);
    store.insert_position(Position::new(
        position_id.clone(),
        owner.clone(),
        EventRef::new("lakers-celtics-2026-01-15"),
        Side::Home,
        Money::new(dec!(80)),
        Timestamp::now(),
    ));
    position_id
}

/// Happy path: seller lists, buyer settles, money and ownership move together.
fn scenario_1_list_and_settle() {
    println!("Scenario 1: List and Settle\n");

    let store = MemoryStore::new();
    let market = Marketplace::with_default_config(store.clone());

    let alice = seed(&store, "alice", dec!(0));
    let bob = seed(&store, "bob", dec!(150));
    let pos = seed_position(&store, "wager-1", &alice);

    println!("  Alice holds an $80 stake on the home side, balance $0");
    println!("  Bob has $150\n");

    let receipt = market
        .list_for_sale(Some(&alice), pos.as_str(), dec!(100))
        .expect("listing succeeds");
    println!("  Alice lists {} at ${}", receipt.position_id, receipt.asking_price);
    println!("  Marketplace now shows {} listing(s)", store.listings().len());

    let settled = market
        .settle(Some(&bob), pos.as_str())
        .expect("settlement succeeds");
    println!(
        "  Bob buys {} for ${} in {} attempt(s)",
        settled.position_id, settled.price, settled.attempts
    );

    let alice_after = store.get_account(&alice).expect("alice exists").record;
    let bob_after = store.get_account(&bob).expect("bob exists").record;
    let pos_after = store.get_position(&pos).expect("position exists").record;

    println!(
        "  Balances: Alice ${}, Bob ${}; owner is now {}, listed: {}\n",
        alice_after.balance,
        bob_after.balance,
        pos_after.owner,
        pos_after.is_listed()
    );
}

/// Every rejection kind the operations can return.
fn scenario_2_rejection_gallery() {
    println!("Scenario 2: Rejection Gallery\n");

    let store = MemoryStore::new();
    let market = Marketplace::with_default_config(store.clone());

    let alice = seed(&store, "alice", dec!(0));
    let bob = seed(&store, "bob", dec!(50));
    let pos = seed_position(&store, "wager-1", &alice);

    let mut cases: Vec<(&str, MarketError)> = vec![
        (
            "unauthenticated listing",
            market
                .list_for_sale(None, pos.as_str(), dec!(100))
                .unwrap_err(),
        ),
        (
            "non-positive price",
            market
                .list_for_sale(Some(&alice), pos.as_str(), dec!(0))
                .unwrap_err(),
        ),
        (
            "listing by non-owner",
            market
                .list_for_sale(Some(&bob), pos.as_str(), dec!(100))
                .unwrap_err(),
        ),
        (
            "buying an unlisted position",
            market.settle(Some(&bob), pos.as_str()).unwrap_err(),
        ),
    ];

    market
        .list_for_sale(Some(&alice), pos.as_str(), dec!(100))
        .expect("listing succeeds");

    cases.push((
        "double listing",
        market
            .list_for_sale(Some(&alice), pos.as_str(), dec!(90))
            .unwrap_err(),
    ));
    cases.push((
        "buying own position",
        market.settle(Some(&alice), pos.as_str()).unwrap_err(),
    ));
    cases.push((
        "insufficient funds ($50 vs $100)",
        market.settle(Some(&bob), pos.as_str()).unwrap_err(),
    ));
    cases.push((
        "unknown position",
        market.settle(Some(&bob), "no-such-wager").unwrap_err(),
    ));

    for (label, err) in &cases {
        println!("  {:?}: {} ({})", err.status(), label, err);
    }
    println!("  Audit log recorded {} event(s)\n", market.events().len());
}

/// Concurrent buyers race one listing; exactly one wins.
fn scenario_3_contended_settlement() {
    println!("Scenario 3: Contended Settlement\n");

    let store = MemoryStore::new();
    let market = Arc::new(Marketplace::with_default_config(store.clone()));

    let seller = seed(&store, "seller", dec!(0));
    let pos = seed_position(&store, "wager-1", &seller);
    market
        .list_for_sale(Some(&seller), pos.as_str(), dec!(100))
        .expect("listing succeeds");

    let buyer_count = 8;
    let mut handles = Vec::new();
    for i in 0..buyer_count {
        let buyer = seed(&store, &format!("buyer-{i}"), dec!(500));
        let market = Arc::clone(&market);
        let pos = pos.clone();
        handles.push(thread::spawn(move || {
            (buyer.clone(), market.settle(Some(&buyer), pos.as_str()))
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        let (buyer, result) = handle.join().expect("buyer thread");
        match result {
            Ok(receipt) => {
                winners += 1;
                println!("  {} won in {} attempt(s)", buyer, receipt.attempts);
            }
            Err(err) => {
                losers += 1;
                println!("  {} lost: {:?}", buyer, err.status());
            }
        }
    }

    let owner = store.get_position(&pos).expect("position exists").record.owner;
    let seller_balance = store.get_account(&seller).expect("seller exists").record.balance;

    println!(
        "\n  {buyer_count} buyers raced: {winners} winner, {losers} losers"
    );
    println!("  Final owner: {owner}, seller balance: ${seller_balance}\n");
}
