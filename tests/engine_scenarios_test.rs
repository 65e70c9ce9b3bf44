//! End-to-end scenarios through the pure recompute pipeline:
//! normalize, resolve splits, build positions.

use chrono::NaiveDate;
use portfolio_api::engine::{build_positions, normalize, SplitResolver};
use portfolio_api::{AccountId, Action, Decimal, StockSplit, Symbol, Transaction};
use std::str::FromStr;

const ACCOUNT: AccountId = AccountId(1);

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[allow(clippy::too_many_arguments)]
fn tx(
    id: i64,
    date_str: &str,
    action: Action,
    symbol: &str,
    description: &str,
    quantity: &str,
    price: &str,
    amount: &str,
) -> Transaction {
    Transaction {
        id,
        account_id: ACCOUNT,
        date: date(date_str),
        action,
        symbol: Symbol::new(symbol.to_string()),
        description: description.to_string(),
        quantity: d(quantity),
        price: d(price),
        fees: Decimal::zero(),
        amount: d(amount),
        processed: false,
    }
}

fn run_pipeline(mut log: Vec<Transaction>, splits: &[StockSplit]) -> Vec<portfolio_api::Position> {
    normalize(&mut log);
    SplitResolver::new(splits).resolve(&mut log);
    build_positions(ACCOUNT, &log)
}

fn check_invariants(positions: &[portfolio_api::Position]) {
    for p in positions {
        if p.opened {
            assert!(!p.quantity.is_zero(), "{}: open position with zero quantity", p.symbol);
            assert!(p.gain_loss.is_zero(), "{}: open position with gain_loss", p.symbol);
        } else {
            assert!(p.quantity.is_zero(), "{}: closed position with quantity", p.symbol);
            assert!(p.cost_basis.is_zero(), "{}: closed position with cost_basis", p.symbol);
        }
    }
}

#[test]
fn test_simple_round_trip() {
    let log = vec![
        tx(1, "2023-01-10", Action::Buy, "AAPL", "APPLE INC", "10", "150", "-1500"),
        tx(2, "2023-02-10", Action::Sell, "AAPL", "APPLE INC", "10", "160", "1600"),
    ];

    let positions = run_pipeline(log, &[]);
    check_invariants(&positions);

    assert_eq!(positions.len(), 1);
    let p = &positions[0];
    assert_eq!(p.symbol.as_str(), "AAPL");
    assert!(p.quantity.is_zero());
    assert!(!p.opened);
    assert!(p.cost_basis.is_zero());
    assert_eq!(p.gain_loss, d("100"));
}

#[test]
fn test_two_buys_then_close() {
    let log = vec![
        tx(1, "2023-01-10", Action::Buy, "GOOG", "ALPHABET INC", "5", "200", "-1000"),
        tx(2, "2023-01-20", Action::Buy, "GOOG", "ALPHABET INC", "5", "210", "-1050"),
        tx(3, "2023-02-10", Action::Sell, "GOOG", "ALPHABET INC", "10", "220", "2200"),
    ];

    let positions = run_pipeline(log, &[]);
    check_invariants(&positions);

    assert_eq!(positions.len(), 1);
    let p = &positions[0];
    assert!(p.quantity.is_zero());
    assert!(!p.opened);
    assert_eq!(p.gain_loss, d("150"));
}

#[test]
fn test_stock_split_rebases_cost() {
    let log = vec![
        tx(1, "2022-07-25", Action::Buy, "TSLA", "TESLA INC", "200", "300", "-60000"),
        tx(2, "2022-08-25", Action::StockSplit, "TSLA", "TESLA INC", "400", "200", "0"),
    ];

    let positions = run_pipeline(log, &[]);
    check_invariants(&positions);

    assert_eq!(positions.len(), 1);
    let p = &positions[0];
    assert_eq!(p.quantity, d("600"));
    assert!(p.opened);
    assert_eq!(p.cost_basis, d("100"));
}

#[test]
fn test_options_forward_split() {
    let splits = vec![StockSplit {
        symbol: "TSLA".to_string(),
        split_date: date("2022-08-25"),
        ratio: d("3"),
    }];

    let log = vec![
        tx(
            1,
            "2021-11-15",
            Action::SellToOpen,
            "TSLA 01/20/2023 1000.00 C",
            "CALL TESLA INC",
            "1",
            "283.93",
            "283.93",
        ),
        tx(
            2,
            "2022-08-25",
            Action::OptionsFrwdSplit,
            "TSLA 01/20/2023 333.33 C",
            "CALL TESLA INC",
            "-2",
            "94.64",
            "0",
        ),
    ];

    let positions = run_pipeline(log, &splits);
    check_invariants(&positions);

    assert_eq!(positions.len(), 1);
    let p = &positions[0];
    assert_eq!(p.symbol.as_str(), "TSLA 01/20/2023 333.33 C");
    assert_eq!(p.underlying_symbol, "TSLA");
    assert_eq!(p.quantity, d("-3"));
    assert!(p.opened);
    assert!(p.short);

    // -283.93 cost over -3 contracts
    let expected = d("94.64");
    let delta = (p.cost_basis - expected).abs();
    assert!(delta < d("0.01"), "cost_basis {} not within 0.01 of 94.64", p.cost_basis);
}

#[test]
fn test_reverse_split_closes_old_ticker_and_opens_new() {
    let log = vec![
        tx(1, "2023-01-10", Action::Buy, "ACB", "AURORA CANNABIS INC", "2000", "10", "-20000"),
        tx(
            2,
            "2023-05-10",
            Action::ReverseSplit,
            "ACB_OLD",
            "AURORA CANNABIS INC XXXREVERSE SPLIT EFF: 05/10/2023",
            "-2000",
            "0",
            "0",
        ),
        tx(3, "2023-05-10", Action::ReverseSplit, "ACBNEW", "AURORA CANNABIS INC", "200", "0", "0"),
    ];

    let positions = run_pipeline(log, &[]);
    check_invariants(&positions);

    assert_eq!(positions.len(), 2);

    let acb = positions.iter().find(|p| p.symbol.as_str() == "ACB").unwrap();
    assert!(acb.quantity.is_zero());
    assert!(!acb.opened);

    let acbnew = positions.iter().find(|p| p.symbol.as_str() == "ACBNEW").unwrap();
    assert_eq!(acbnew.quantity, d("200"));
    assert!(acbnew.opened);
}

#[test]
fn test_orphan_sell_creates_no_position() {
    let log = vec![tx(1, "2023-01-10", Action::Sell, "AAPL", "APPLE INC", "-10", "150", "1500")];

    let positions = run_pipeline(log, &[]);
    assert!(positions.is_empty());
}

#[test]
fn test_normalized_sign_invariants() {
    let mut log = vec![
        tx(1, "2023-01-10", Action::Buy, "AAPL", "APPLE INC", "10", "150", "1500"),
        tx(2, "2023-02-10", Action::Sell, "AAPL", "APPLE INC", "10", "160", "1600"),
        tx(3, "2023-03-10", Action::BuyToOpen, "MSFT", "MICROSOFT CORP", "5", "300", "1500"),
        tx(4, "2023-04-10", Action::SellToClose, "MSFT", "MICROSOFT CORP", "5", "320", "1600"),
    ];
    normalize(&mut log);

    for t in &log {
        if t.action.is_buy() {
            assert!(!t.amount.is_positive(), "{}: buy amount must be <= 0", t.action);
        }
        if t.action.is_sell() {
            assert!(!t.quantity.is_positive(), "{}: sell quantity must be <= 0", t.action);
        }
    }
}

#[test]
fn test_position_quantity_matches_contributor_sum() {
    let log = vec![
        tx(1, "2023-01-10", Action::Buy, "AAPL", "APPLE INC", "10", "150", "-1500"),
        tx(2, "2023-02-10", Action::Sell, "AAPL", "APPLE INC", "4", "160", "640"),
        tx(3, "2023-03-10", Action::Buy, "MSFT", "MICROSOFT CORP", "5", "300", "-1500"),
    ];

    let positions = run_pipeline(log, &[]);
    check_invariants(&positions);

    let aapl = positions.iter().find(|p| p.symbol.as_str() == "AAPL").unwrap();
    assert_eq!(aapl.quantity, d("6"));
    assert!(aapl.opened);

    let msft = positions.iter().find(|p| p.symbol.as_str() == "MSFT").unwrap();
    assert_eq!(msft.quantity, d("5"));
}

#[test]
fn test_reopen_after_close_yields_two_positions() {
    let log = vec![
        tx(1, "2023-01-10", Action::Buy, "AAPL", "APPLE INC", "10", "150", "-1500"),
        tx(2, "2023-02-10", Action::Sell, "AAPL", "APPLE INC", "10", "160", "1600"),
        tx(3, "2023-03-10", Action::Buy, "AAPL", "APPLE INC", "20", "140", "-2800"),
    ];

    let positions = run_pipeline(log, &[]);
    check_invariants(&positions);

    assert_eq!(positions.len(), 2);
    let closed = positions.iter().find(|p| !p.opened).unwrap();
    assert_eq!(closed.gain_loss, d("100"));
    let open = positions.iter().find(|p| p.opened).unwrap();
    assert_eq!(open.quantity, d("20"));
    assert_eq!(open.cost_basis, d("140"));
    assert_eq!(open.open_date, date("2023-03-10"));
}

#[test]
fn test_pipeline_is_idempotent() {
    let splits = vec![StockSplit {
        symbol: "TSLA".to_string(),
        split_date: date("2022-08-25"),
        ratio: d("3"),
    }];

    let mut log = vec![
        tx(
            1,
            "2021-11-15",
            Action::SellToOpen,
            "TSLA 01/20/2023 1000.00 C",
            "CALL TESLA INC",
            "1",
            "283.93",
            "283.93",
        ),
        tx(
            2,
            "2022-08-25",
            Action::OptionsFrwdSplit,
            "TSLA 01/20/2023 333.33 C",
            "CALL TESLA INC",
            "-2",
            "94.64",
            "0",
        ),
    ];

    normalize(&mut log);
    SplitResolver::new(&splits).resolve(&mut log);
    let first = build_positions(ACCOUNT, &log);

    normalize(&mut log);
    SplitResolver::new(&splits).resolve(&mut log);
    let second = build_positions(ACCOUNT, &log);

    assert_eq!(first, second);
}
