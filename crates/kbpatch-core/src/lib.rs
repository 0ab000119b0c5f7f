//! kbpatch core library — reconciliation of two API-compatibility knowledge bases.
//!
//! Two independently-maintained JSON knowledge bases describe the same universe
//! of platform API methods: one keyed by a flat canonical signature string with
//! a flat condition map, the other by a nested method descriptor with a nested
//! context object.  This crate canonicalizes both bases to a schema-neutral
//! signature key, computes the asymmetric differences, and synthesizes the
//! missing records in each direction so the two bases converge on the same
//! method set.
//!
//! The `rank` module is an unrelated standalone utility that orders third-party
//! library package identifiers by a weighted popularity score; it shares only
//! the error type with the rest of the crate.

pub mod errors;
pub mod models;
pub mod rank;
pub mod reconcile;
pub mod signature;
