//! Routing of permutations through Benes networks.
//!
//! `route` computes the state of every switch needed to realize a permutation, and `verify`
//! checks a configuration by replaying it.  The router's output should be treated as unverified
//! until `verify` accepts it.
use crate::error::InvalidPermutation;

pub mod benes;
pub mod config;
pub mod sim;
pub mod svg;
pub mod topology;

pub use self::benes::{route, Color};
pub use self::config::{render, SwitchConfiguration, SwitchFlags};
pub use self::sim::{simulate, simulate_by_tracing, trace_output, verify};
pub use self::topology::{stages_and_width, Topology, Wiring};


/// Check that `perm` is a bijection on `0 .. n`.  Problems are reported for the lowest-numbered
/// offending input.
pub fn validate_permutation(n: usize, perm: &[u32]) -> Result<(), InvalidPermutation> {
    if perm.len() != n {
        return Err(InvalidPermutation::Length { expected: n, actual: perm.len() });
    }

    // `seen[o]` holds the input that was sent to output `o`, if any.
    let mut seen = vec![None; n];
    for (i, &o) in perm.iter().enumerate() {
        let slot = match seen.get_mut(o as usize) {
            Some(x) => x,
            None => return Err(InvalidPermutation::OutOfRange { input: i, output: o }),
        };
        if let Some(first) = *slot {
            return Err(InvalidPermutation::Duplicate { output: o, first, second: i });
        }
        *slot = Some(i);
    }
    Ok(())
}

/// The identity permutation on `n` wires.
pub fn identity(n: usize) -> Vec<u32> {
    (0 .. n as u32).collect()
}
