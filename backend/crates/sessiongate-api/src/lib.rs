// SessionGate API Library
//
// HTTP surface of the gate: the two check endpoints, the health probe,
// request models and route wiring.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

pub use state::GateState;
