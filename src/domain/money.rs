use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integral yen. Every price, payment and change amount in the game uses it.
pub type Yen = u64;

/// Face values a customer can carry, smallest first.
pub const DENOMINATIONS: [Yen; 9] = [1, 5, 10, 50, 100, 500, 1000, 5000, 10000];

/// The coins and notes a customer carries for one round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    counts: BTreeMap<Yen, u64>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a wallet from `(denomination, count)` pairs. Zero denominations are ignored.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (Yen, u64)>,
    {
        let mut wallet = Self::new();
        for (denomination, count) in counts {
            wallet.add(denomination, count);
        }
        wallet
    }

    /// Adds `count` pieces of `denomination`. Counts saturate at `u64::MAX`.
    pub fn add(&mut self, denomination: Yen, count: u64) {
        if denomination == 0 {
            return;
        }
        let held = self.counts.entry(denomination).or_insert(0);
        *held = held.saturating_add(count);
    }

    pub fn count(&self, denomination: Yen) -> u64 {
        self.counts.get(&denomination).copied().unwrap_or(0)
    }

    /// Total face value held, or `None` if it does not fit in [`Yen`].
    pub fn checked_total(&self) -> Option<Yen> {
        self.counts
            .iter()
            .try_fold(0 as Yen, |sum, (denomination, count)| {
                sum.checked_add(denomination.checked_mul(*count)?)
            })
    }

    /// Total face value held, saturating at `Yen::MAX`.
    pub fn total(&self) -> Yen {
        self.checked_total().unwrap_or(Yen::MAX)
    }

    /// Iterates `(denomination, count)` smallest first, including zero counts.
    pub fn iter(&self) -> impl Iterator<Item = (Yen, u64)> + '_ {
        self.counts.iter().map(|(d, c)| (*d, *c))
    }
}

/// Draws a wallet whose total value strictly exceeds `subtotal`.
///
/// Each denomination gets an independent count in `0..=max_draw`. When the draw
/// falls short, the smallest denomination is topped up until the total clears
/// the subtotal. The guarantee holds for any subtotal up to `Yen::MAX` minus the
/// smallest denomination; beyond that no wallet can be worth more.
pub fn generate_wallet<R: Rng + ?Sized>(
    subtotal: Yen,
    denominations: &[Yen],
    max_draw: u32,
    rng: &mut R,
) -> Wallet {
    let mut wallet = Wallet::new();
    for &denomination in denominations.iter().filter(|d| **d > 0) {
        wallet.add(denomination, u64::from(rng.gen_range(0..=max_draw)));
    }

    let smallest = denominations.iter().copied().filter(|d| *d > 0).min().unwrap_or(1);
    let total = wallet.total();
    if total <= subtotal {
        // Same result as incrementing one coin at a time until total > subtotal.
        let missing = (subtotal - total).saturating_add(1);
        wallet.add(smallest, missing.div_ceil(smallest));
    }
    wallet
}

/// Number of coins and notes needed for `amount`, reducing greedily from the largest
/// denomination down.
///
/// Greedy reduction is optimal for the default yen set but not for arbitrary sets;
/// callers use it as a ranking heuristic only.
pub fn greedy_coin_count(amount: Yen, denominations: &[Yen]) -> u64 {
    let mut sorted: Vec<Yen> = denominations.iter().copied().filter(|d| *d > 0).collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut remaining = amount;
    let mut count = 0;
    for denomination in sorted {
        count += remaining / denomination;
        remaining %= denomination;
    }
    // A remainder the set cannot express counts as single units.
    count + remaining
}
