//! Test suites for the server.

mod bootstrap_behaviour;
mod support;
