//! Test suite for the vehicle control kernel.

#[cfg(test)]
mod e2e;
