//! Core abstractions for Notelock: the gate code, lock state, session logic,
//! and the storage contract the front ends persist through.

pub mod gate;
pub mod session;
pub mod store;
