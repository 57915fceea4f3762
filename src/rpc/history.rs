//! Transaction history reconstruction
//!
//! Flattens the wallet service's ledger transactions into bitcoind-shaped
//! `listtransactions` records. The service reports whole transactions with
//! per-account ledger entries and per-output `isMine` flags; the node RPC
//! wants one flat record per external leg.

use serde::Serialize;

use crate::amount::to_btc;
use crate::api::RemoteTransaction;

/// One reconstructed send/receive record. `account` is always empty: the
/// gateway surfaces a single-account wallet.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub account: String,
    pub address: String,
    pub category: &'static str,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    pub vout: u32,
    pub confirmations: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockhash: Option<String>,
    pub txid: String,
    pub time: i64,
    pub timereceived: i64,
}

/// Reconstruct the page `[from, from+count)` of flattened history records.
///
/// The transaction's net value is the ledger entry matching the wallet id.
/// Outputs that are not a genuine external leg are skipped: the wallet's own
/// output on a spend is change, and a counter-party output on a receive is
/// irrelevant. Scanning stops once enough legs are retained to cover the
/// page; the source order is newest-first from the wallet service and is not
/// re-sorted before truncation. The final page is re-sorted by descending
/// confirmations (stable, so ties keep source order).
pub fn reconstruct(
    wallet_id: &str,
    transactions: &[RemoteTransaction],
    count: usize,
    from: usize,
) -> Vec<HistoryEntry> {
    let mut retained = Vec::new();

    for tx in transactions {
        let net = tx
            .entries
            .iter()
            .find(|entry| entry.account == wallet_id)
            .map(|entry| entry.value)
            .unwrap_or(0);

        for output in &tx.outputs {
            if (net < 0 && output.is_mine) || (net > 0 && !output.is_mine) {
                continue;
            }
            let net_value = if output.is_mine {
                output.value
            } else {
                -output.value
            };
            let timestamp = tx.date.timestamp();
            retained.push(HistoryEntry {
                account: String::new(),
                address: output.account.clone(),
                category: if output.is_mine { "receive" } else { "send" },
                amount: to_btc(net_value),
                fee: (net < 0).then(|| to_btc(-tx.fee)),
                vout: output.vout,
                confirmations: tx.confirmations,
                blockhash: tx.blockhash.clone(),
                txid: tx.id.clone(),
                time: timestamp,
                timereceived: timestamp,
            });
        }

        if retained.len() >= count + from {
            break;
        }
    }

    let mut page: Vec<HistoryEntry> = retained.into_iter().skip(from).take(count).collect();
    page.sort_by(|a, b| b.confirmations.cmp(&a.confirmations));
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LedgerEntry, TxOutput};
    use chrono::{TimeZone, Utc};

    const WALLET: &str = "wallet-1";

    fn entry(account: &str, value: i64) -> LedgerEntry {
        LedgerEntry {
            account: account.into(),
            value,
        }
    }

    fn output(address: &str, value: i64, is_mine: bool, vout: u32) -> TxOutput {
        TxOutput {
            account: address.into(),
            value,
            is_mine,
            vout,
        }
    }

    fn tx(
        id: &str,
        net: i64,
        fee: i64,
        confirmations: i64,
        outputs: Vec<TxOutput>,
    ) -> RemoteTransaction {
        RemoteTransaction {
            id: id.into(),
            entries: vec![entry("counterparty", -net), entry(WALLET, net)],
            outputs,
            fee,
            confirmations,
            blockhash: Some(format!("block-{id}")),
            date: Utc.with_ymd_and_hms(2015, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn receive_keeps_own_output_and_drops_counterparty_leg() {
        let txs = vec![tx(
            "a",
            50_000_000,
            0,
            3,
            vec![
                output("mine-addr", 50_000_000, true, 0),
                output("change-of-sender", 10_000_000, false, 1),
            ],
        )];
        let page = reconstruct(WALLET, &txs, 10, 0);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].category, "receive");
        assert_eq!(page[0].address, "mine-addr");
        assert_eq!(page[0].amount, 0.5);
        assert!(page[0].fee.is_none());
        assert_eq!(page[0].account, "");
    }

    #[test]
    fn send_drops_change_and_negates_amount() {
        let txs = vec![tx(
            "b",
            -30_010_000,
            10_000,
            2,
            vec![
                output("their-addr", 30_000_000, false, 0),
                output("my-change", 69_990_000, true, 1),
            ],
        )];
        let page = reconstruct(WALLET, &txs, 10, 0);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].category, "send");
        assert_eq!(page[0].address, "their-addr");
        assert_eq!(page[0].amount, -0.3);
        // Fee is the negated transaction fee in BTC, only on spends.
        assert_eq!(page[0].fee, Some(-0.0001));
    }

    #[test]
    fn scan_stops_once_page_is_covered() {
        // Three transactions, one retained output each; count=2, from=0 must
        // never look at the third.
        let txs = vec![
            tx("t1", 100, 0, 1, vec![output("a1", 100, true, 0)]),
            tx("t2", 100, 0, 5, vec![output("a2", 100, true, 0)]),
            tx("t3", 100, 0, 9, vec![output("a3", 100, true, 0)]),
        ];
        let page = reconstruct(WALLET, &txs, 2, 0);
        assert_eq!(page.len(), 2);
        // Page re-sorted by descending confirmations.
        assert_eq!(page[0].txid, "t2");
        assert_eq!(page[0].confirmations, 5);
        assert_eq!(page[1].txid, "t1");
        assert!(!page.iter().any(|e| e.txid == "t3"));
    }

    #[test]
    fn from_offsets_into_retained_list() {
        let txs = vec![
            tx("t1", 100, 0, 1, vec![output("a1", 100, true, 0)]),
            tx("t2", 100, 0, 5, vec![output("a2", 100, true, 0)]),
            tx("t3", 100, 0, 9, vec![output("a3", 100, true, 0)]),
        ];
        let page = reconstruct(WALLET, &txs, 2, 1);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].txid, "t3");
        assert_eq!(page[1].txid, "t2");
    }

    #[test]
    fn missing_ledger_entry_retains_all_outputs_without_fee() {
        let mut transaction = tx("c", 0, 500, 1, vec![output("x", 100, true, 0)]);
        transaction.entries = vec![entry("someone-else", 100)];
        let page = reconstruct(WALLET, &[transaction], 10, 0);
        assert_eq!(page.len(), 1);
        assert!(page[0].fee.is_none());
    }

    #[test]
    fn time_fields_derive_from_upstream_date() {
        let txs = vec![tx("d", 100, 0, 1, vec![output("a", 100, true, 0)])];
        let page = reconstruct(WALLET, &txs, 1, 0);
        let expected = Utc.with_ymd_and_hms(2015, 3, 1, 12, 0, 0).unwrap().timestamp();
        assert_eq!(page[0].time, expected);
        assert_eq!(page[0].timereceived, expected);
    }
}
