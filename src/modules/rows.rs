//! Row templates for blocks and transactions

use crate::domain::{format_timestamp, Template, TimestampStyle};
use crate::infrastructure::ledger::types::scalar_display;
use crate::infrastructure::ledger::{Block, Transaction};

pub const BLOCK_COLUMNS: &[&str] = &["Height", "Nonce", "Hash", "Difficulty", "Timestamp"];
pub const TRANSACTION_COLUMNS: &[&str] = &["TxID", "Item", "Amount", "Timestamp"];

pub fn block_template(style: TimestampStyle) -> Template<Block> {
    let summary: fn(&Block) -> Vec<String> = match style {
        TimestampStyle::UnixSeconds => |b| block_cells(b, TimestampStyle::UnixSeconds),
        TimestampStyle::AsIs => |b| block_cells(b, TimestampStyle::AsIs),
    };
    Template {
        columns: BLOCK_COLUMNS,
        id: block_id,
        summary,
        detail: block_detail,
    }
}

pub fn transaction_template(style: TimestampStyle) -> Template<Transaction> {
    let summary: fn(&Transaction) -> Vec<String> = match style {
        TimestampStyle::UnixSeconds => |tx| transaction_cells(tx, TimestampStyle::UnixSeconds),
        TimestampStyle::AsIs => |tx| transaction_cells(tx, TimestampStyle::AsIs),
    };
    Template {
        columns: TRANSACTION_COLUMNS,
        id: transaction_id,
        summary,
        detail: transaction_detail,
    }
}

/// The item's own `id`, or its height when the service sent none
fn block_id(block: &Block) -> String {
    explicit_id(block.id.as_ref()).unwrap_or_else(|| block.height.to_string())
}

/// The item's own `id`, or its txID when the service sent none
fn transaction_id(tx: &Transaction) -> String {
    explicit_id(tx.id.as_ref()).unwrap_or_else(|| tx.tx_id.clone())
}

fn explicit_id(id: Option<&serde_json::Value>) -> Option<String> {
    id.map(scalar_display).filter(|id| !id.is_empty())
}

fn block_cells(block: &Block, style: TimestampStyle) -> Vec<String> {
    vec![
        block.height.to_string(),
        block.nonce.to_string(),
        block.block_hash.clone(),
        block.difficulty_display(),
        format_timestamp(&block.timestamp, style),
    ]
}

fn block_detail(block: &Block) -> Vec<(&'static str, String)> {
    vec![
        ("Hash", block.block_hash.clone()),
        ("Difficulty", block.difficulty_display()),
        ("Nonce", block.nonce.to_string()),
    ]
}

fn transaction_cells(tx: &Transaction, style: TimestampStyle) -> Vec<String> {
    vec![
        tx.tx_id.clone(),
        tx.item_hash.clone(),
        tx.amount_display(),
        format_timestamp(&tx.timestamp, style),
    ]
}

fn transaction_detail(tx: &Transaction) -> Vec<(&'static str, String)> {
    vec![("From", tx.seller().to_string()), ("To", tx.buyer().to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collection::rows;
    use serde_json::json;

    #[test]
    fn test_transaction_rows() {
        let txs: Vec<Transaction> = serde_json::from_value(json!([
            {"txID": "t1", "itemHash": "i1", "amount": 10, "timestamp": "42",
             "sellerHash": "s", "buyerHash": "b"},
            {"id": 7, "txID": "t2", "itemHash": "i2", "amount": 2.5, "timestamp": "43"}
        ]))
        .unwrap();
        let rows = rows(&transaction_template(TimestampStyle::AsIs), &txs);
        assert_eq!(rows[0].id, "t1");
        assert_eq!(rows[0].cells, vec!["t1", "i1", "10", "42"]);
        assert_eq!(
            rows[0].detail,
            vec![("From", "s".to_string()), ("To", "b".to_string())]
        );
        assert_eq!(rows[1].id, "7");
        assert_eq!(rows[1].detail_key, "7_expand");
        assert_eq!(rows[1].cells[2], "2.5");
    }

    #[test]
    fn test_block_rows_fall_back_to_height() {
        let blocks: Vec<Block> = serde_json::from_value(json!([
            {"height": 4, "nonce": 9, "block_hash": "00ff", "difficulty": 3, "timestamp": "now"},
            {"id": "b-5", "height": 5, "block_hash": "00aa", "difficulty": "0x10", "timestamp": "then"}
        ]))
        .unwrap();
        let rows = rows(&block_template(TimestampStyle::AsIs), &blocks);
        assert_eq!(rows[0].id, "4");
        assert_eq!(rows[0].cells, vec!["4", "9", "00ff", "3", "now"]);
        assert_eq!(rows[1].id, "b-5");
        assert_eq!(rows[1].cells[3], "0x10");
    }
}
