//! Choosing the amount a customer hands over.
//!
//! Two selectors exist. [`select_payment`] works from a concrete [`Wallet`] and finds
//! the smallest amount the customer can actually put together. [`calculate_payment`]
//! skips the wallet and models how people round a bill when reaching for cash.

use crate::domain::money::{DENOMINATIONS, Wallet, Yen, greedy_coin_count};
use crate::error::{RegisterError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

/// Smallest sum reachable from a sub-multiset of `wallet` that covers `subtotal`.
///
/// Every denomination may be used up to its held count. Coins left in the wallet are
/// the complement of coins paid, so the search runs over what stays behind: the
/// largest reachable sum not above `total - subtotal`. The reachability table spans
/// only that surplus, which for a generated wallet is small however large the bill.
pub fn select_payment(subtotal: i64, wallet: &Wallet) -> Result<Yen> {
    let subtotal = Yen::try_from(subtotal).map_err(|_| RegisterError::InvalidSubtotal(subtotal))?;
    let total = wallet.checked_total().ok_or(RegisterError::WalletOverflow)?;
    if total < subtotal {
        return Err(RegisterError::InsufficientWallet {
            required: subtotal,
            available: total,
        });
    }

    let surplus = total - subtotal;
    let size = usize::try_from(surplus)
        .ok()
        .and_then(|s| s.checked_add(1))
        .ok_or(RegisterError::WalletOverflow)?;
    let mut reachable = vec![false; size];
    reachable[0] = true;

    // used[s]: coins of the current denomination spent to first reach s.
    let mut used = vec![0u64; size];
    for (denomination, count) in wallet.iter() {
        let step = usize::try_from(denomination).unwrap_or(usize::MAX);
        if count == 0 || step >= size {
            continue;
        }
        used.fill(0);
        for sum in step..size {
            if !reachable[sum] && reachable[sum - step] && used[sum - step] < count {
                reachable[sum] = true;
                used[sum] = used[sum - step] + 1;
            }
        }
    }

    // Keeping nothing back is always possible, so index 0 is always a hit.
    let kept = reachable.iter().rposition(|hit| *hit).unwrap_or(0) as Yen;
    Ok(total - kept)
}

/// Candidate amounts a customer plausibly pays for `bill`.
fn payment_candidates(bill: Yen) -> BTreeSet<Yen> {
    let mut candidates = BTreeSet::from([bill]);

    if bill % 10 != 0 {
        candidates.insert(bill.div_ceil(10) * 10);
        candidates.insert(bill / 10 * 10);
    }
    if bill % 5 != 0 {
        candidates.insert(bill + (5 - bill % 5));
        candidates.insert(bill - bill % 5);
    }
    if bill % 100 != 0 {
        candidates.insert(bill.div_ceil(100) * 100);
        candidates.insert(bill / 100 * 100);
    }
    if bill < 1_000 {
        candidates.insert(1_000);
    }
    if bill < 10_000 {
        candidates.insert(10_000);
    }
    candidates.extend([bill + 5, bill + 10, bill + 100]);
    candidates
}

/// Simulates the cash a customer hands over for `bill_amount`.
///
/// With probability `error_rate` the exact amount is taken off the table, which models
/// a customer who does not count out exact change. Among the remaining candidates the
/// ones whose change needs the fewest coins (greedy count) win; ties are broken at
/// random. When `max_payment` is given no candidate above it is considered.
pub fn calculate_payment<R: Rng + ?Sized>(
    bill_amount: i64,
    error_rate: f64,
    max_payment: Option<i64>,
    rng: &mut R,
) -> Result<Yen> {
    let bill =
        Yen::try_from(bill_amount).map_err(|_| RegisterError::InvalidBillAmount(bill_amount))?;
    if !(0.0..=1.0).contains(&error_rate) {
        return Err(RegisterError::InvalidErrorRate(error_rate));
    }

    let mut valid: Vec<Yen> = payment_candidates(bill)
        .into_iter()
        .filter(|amount| *amount >= bill)
        .collect();

    if let Some(max) = max_payment {
        valid.retain(|amount| i128::from(*amount) <= i128::from(max));
        if valid.is_empty() {
            valid.push(bill);
        }
    }

    if valid.contains(&bill) && rng.gen_bool(error_rate) {
        valid.retain(|amount| *amount != bill);
        if valid.is_empty() {
            valid.push(bill);
        }
    }

    let score = |amount: Yen| greedy_coin_count(amount - bill, &DENOMINATIONS);
    valid.sort_by_key(|amount| (score(*amount), amount - bill));

    let best_score = score(valid[0]);
    let best: Vec<Yen> = valid
        .iter()
        .copied()
        .take_while(|amount| score(*amount) == best_score)
        .collect();

    best.choose(rng).copied().ok_or_else(|| {
        RegisterError::Internal(Box::new(std::io::Error::other(
            "no payment candidate left after scoring",
        )))
    })
}
