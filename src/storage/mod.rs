//! Durable state primitives shared by the coordinator and the participant.
//!
//! Both sides keep an in-memory "current state" table (§4.1 of the spec) that
//! is always fully rebuildable by replaying an append-only WAL file. This
//! module holds the low-level, format-agnostic line WAL; the coordinator and
//! participant crates each layer their own record format (and recovery
//! semantics) on top of it.

pub mod wal;
