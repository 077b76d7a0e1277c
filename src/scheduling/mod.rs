//! Scheduling rules that do not depend on storage: the booking policy, the
//! capacity ledger and the wait-time simulator.

pub mod ledger;
pub mod policy;
pub mod simulator;

pub use ledger::CapacityLedger;
pub use policy::{parse_date, parse_time, BookingPolicy, WindowPosition};
pub use simulator::{simulate, Appointment, Simulation, WalkIn};
