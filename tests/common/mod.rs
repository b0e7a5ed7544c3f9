//! Shared test doubles.
#![allow(dead_code)]

pub mod mocks;
