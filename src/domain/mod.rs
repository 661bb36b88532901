//! Domain types and the pure algorithms of the register drill: catalog items, orders,
//! wallets, payment selection and the per-round bookkeeping.

pub mod catalog;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod ranking;
pub mod round;
pub mod session;
