//! Newline-framed JSON endpoint for a vantage environment session.
//!
//! This crate is the thin transport adapter around the core library: an
//! [`endpoint::EnvironmentEndpoint`] feeds inbound JSON records to an
//! `EnvironmentSession`, and [`endpoint::JsonLinesChannel`] frames outbound
//! reports onto any writer. The binary wires both to stdio.

pub mod endpoint;
