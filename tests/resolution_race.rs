mod common;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use register_drill::application::events::Signal;
use register_drill::application::machine::RoundMachine;
use register_drill::config::GameConfig;
use register_drill::domain::order::CustomerOrder;
use register_drill::domain::round::{Round, Tender};
use register_drill::domain::session::Session;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

fn machine(countdown_ticks: u32) -> RoundMachine<StdRng> {
    let config = GameConfig {
        countdown_ticks,
        ..GameConfig::default()
    };
    RoundMachine::new(config, common::ab_catalog(), StdRng::seed_from_u64(5)).unwrap()
}

/// Opens a round for A + B paid exactly and rings both items up.
fn ready_round(machine: &mut RoundMachine<StdRng>) -> u64 {
    machine.begin_round(
        CustomerOrder::from_items(&common::ab_catalog()),
        Tender::exact(300),
    );
    machine.add_item("A").unwrap();
    machine.add_item("B").unwrap();
    machine.round().unwrap().generation()
}

#[test]
fn test_checkout_first_then_final_tick() {
    let mut machine = machine(1);
    let generation = ready_round(&mut machine);

    machine.checkout().unwrap();
    let late = machine.tick(generation);

    assert!(late.is_empty());
    assert_eq!(machine.session().score, 300);
    assert_eq!(machine.session().lives, 3);
    assert_eq!(machine.session().rounds_played, 1);
}

#[test]
fn test_final_tick_first_then_checkout() {
    let mut machine = machine(1);
    let generation = ready_round(&mut machine);

    let step = machine.tick(generation);
    assert!(step.signals.contains(&Signal::Timeout));
    let late = machine.checkout().unwrap();

    assert!(late.is_empty());
    assert_eq!(machine.session().score, 0);
    assert_eq!(machine.session().lives, 2);
    assert_eq!(machine.session().rounds_played, 1);
}

#[test]
fn test_gate_admits_one_thread() {
    for _ in 0..500 {
        let round = Arc::new(Round::new(
            1,
            CustomerOrder::from_items(&common::ab_catalog()),
            Tender::exact(300),
            1,
        ));
        let session = Arc::new(Mutex::new(Session::new(3)));
        let barrier = Arc::new(Barrier::new(2));

        let timeout = {
            let (round, session, barrier) = (round.clone(), session.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                if round.gate().try_acquire() {
                    session.lock().unwrap().penalize();
                }
            })
        };
        let checkout = {
            let (round, session, barrier) = (round.clone(), session.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                if round.gate().try_acquire() {
                    session.lock().unwrap().award(300);
                }
            })
        };
        timeout.join().unwrap();
        checkout.join().unwrap();

        let session = session.lock().unwrap();
        let timed_out = session.lives == 2 && session.score == 0;
        let checked_out = session.lives == 3 && session.score == 300;
        assert!(timed_out ^ checked_out, "both or neither applied: {session:?}");
    }
}

proptest! {
    #[test]
    fn prop_exactly_one_resolution(
        countdown in 1u32..8,
        ticks_before_checkout in 0u32..10,
        complete_order in any::<bool>(),
    ) {
        let mut machine = machine(countdown);
        machine.begin_round(
            CustomerOrder::from_items(&common::ab_catalog()),
            Tender::exact(300),
        );
        let generation = machine.round().unwrap().generation();
        machine.add_item("A").unwrap();
        if complete_order {
            machine.add_item("B").unwrap();
        }

        for _ in 0..ticks_before_checkout {
            machine.tick(generation);
        }
        machine.checkout().unwrap();
        for _ in 0..countdown {
            machine.tick(generation);
        }

        let session = machine.session();
        prop_assert_eq!(session.rounds_played, 1);
        let checkout_won = ticks_before_checkout < countdown;
        if checkout_won && complete_order {
            prop_assert_eq!((session.score, session.lives), (300, 3));
        } else {
            prop_assert_eq!((session.score, session.lives), (0, 2));
            prop_assert_eq!(session.mistakes, 1);
        }
    }
}
