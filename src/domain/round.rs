use crate::domain::money::{Wallet, Yen};
use crate::domain::order::{CustomerOrder, OperatorOrder, orders_match};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// How a round ended.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    TimedOut,
    Mismatched,
    CoinOverflow,
    Correct,
}

impl Outcome {
    pub fn is_failure(self) -> bool {
        !matches!(self, Outcome::Correct)
    }
}

/// Single-acquisition flag: the first caller of [`ResolutionGate::try_acquire`] wins,
/// every later caller sees `false`.
///
/// It is a real compare-and-swap so that triggers running on separate threads still
/// resolve a round exactly once.
#[derive(Debug, Default)]
pub struct ResolutionGate {
    resolved: AtomicBool,
}

impl ResolutionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> bool {
        self.resolved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }
}

/// What the customer hands over this round, plus the wallet it came from when the
/// payment was drawn from one.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct Tender {
    pub amount: Yen,
    pub wallet: Option<Wallet>,
    /// Cash on hand when the payment was synthesized without a wallet.
    pub max_payment: Option<Yen>,
}

impl Tender {
    pub fn exact(amount: Yen) -> Self {
        Self {
            amount,
            wallet: None,
            max_payment: None,
        }
    }
}

/// Everything that belongs to one round and is discarded when the next one starts.
#[derive(Debug)]
pub struct Round {
    generation: u64,
    order: CustomerOrder,
    tender: Tender,
    operator_order: OperatorOrder,
    change_tendered: Yen,
    coin_selections: u32,
    countdown: u32,
    remaining: u32,
    gate: ResolutionGate,
}

impl Round {
    pub fn new(generation: u64, order: CustomerOrder, tender: Tender, countdown: u32) -> Self {
        Self {
            generation,
            order,
            tender,
            operator_order: OperatorOrder::new(),
            change_tendered: 0,
            coin_selections: 0,
            countdown,
            remaining: countdown,
            gate: ResolutionGate::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn order(&self) -> &CustomerOrder {
        &self.order
    }

    pub fn tender(&self) -> &Tender {
        &self.tender
    }

    pub fn payment(&self) -> Yen {
        self.tender.amount
    }

    /// Change the operator owes the customer.
    pub fn expected_change(&self) -> Yen {
        self.tender.amount.saturating_sub(self.order.subtotal())
    }

    pub fn operator_order(&self) -> &OperatorOrder {
        &self.operator_order
    }

    pub fn operator_order_mut(&mut self) -> &mut OperatorOrder {
        &mut self.operator_order
    }

    pub fn change_tendered(&self) -> Yen {
        self.change_tendered
    }

    pub fn coin_selections(&self) -> u32 {
        self.coin_selections
    }

    /// Records one coin or note handed back; returns how many have been handed so far.
    pub fn select_coin(&mut self, value: Yen) -> u32 {
        self.change_tendered += value;
        self.coin_selections += 1;
        self.coin_selections
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.countdown - self.remaining
    }

    /// Counts one tick down; returns the ticks left.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn gate(&self) -> &ResolutionGate {
        &self.gate
    }

    pub fn is_resolved(&self) -> bool {
        self.gate.is_resolved()
    }

    /// Judges the operator's work at checkout: the order first, then the change.
    pub fn evaluate_checkout(&self) -> Outcome {
        if !orders_match(self.order.lines(), self.operator_order.lines()) {
            return Outcome::Mismatched;
        }
        if self.change_tendered != self.expected_change() {
            return Outcome::Mismatched;
        }
        Outcome::Correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Category, MenuItem};
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn round() -> (Round, Vec<MenuItem>) {
        let items = vec![
            MenuItem::new("A", 100, Category::Shelf),
            MenuItem::new("B", 200, Category::Drink),
        ];
        let order = CustomerOrder::from_items(&items);
        (Round::new(1, order, Tender::exact(500), 60), items)
    }

    #[test]
    fn test_gate_acquires_once() {
        let gate = ResolutionGate::new();
        assert!(!gate.is_resolved());
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        assert!(gate.is_resolved());
    }

    #[test]
    fn test_gate_single_winner_across_threads() {
        for _ in 0..200 {
            let gate = Arc::new(ResolutionGate::new());
            let barrier = Arc::new(Barrier::new(3));
            let handles: Vec<_> = (0..3)
                .map(|_| {
                    let gate = Arc::clone(&gate);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        gate.try_acquire()
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(winners, 1);
        }
    }

    #[test]
    fn test_checkout_correct() {
        let (mut round, items) = round();
        round.operator_order_mut().add(&items[1]);
        round.operator_order_mut().add(&items[0]);
        round.select_coin(100);
        round.select_coin(100);
        assert_eq!(round.expected_change(), 200);
        assert_eq!(round.evaluate_checkout(), Outcome::Correct);
    }

    #[test]
    fn test_checkout_wrong_change() {
        let (mut round, items) = round();
        round.operator_order_mut().add(&items[0]);
        round.operator_order_mut().add(&items[1]);
        round.select_coin(100);
        assert_eq!(round.evaluate_checkout(), Outcome::Mismatched);
    }

    #[test]
    fn test_checkout_missing_line() {
        let (mut round, items) = round();
        round.operator_order_mut().add(&items[0]);
        round.select_coin(100);
        round.select_coin(100);
        assert_eq!(round.evaluate_checkout(), Outcome::Mismatched);
    }

    #[test]
    fn test_tick_saturates() {
        let (mut round, _) = round();
        for _ in 0..100 {
            round.tick();
        }
        assert_eq!(round.remaining(), 0);
        assert_eq!(round.elapsed(), 60);
    }
}
