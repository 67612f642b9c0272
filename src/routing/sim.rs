//! Replay of a configured network, used to check the router's output.
//!
//! Two independent replays are provided.  `simulate` pushes the whole set of wire labels through
//! the recursive structure of the network, one sub-network at a time.  `trace_output` instead
//! walks a single output backwards through the flat stage-to-stage `Wiring`.  Both use the same
//! switch rule: a crossed switch exchanges its two wires, a straight one passes them through.
use super::config::SwitchConfiguration;
use super::topology::Wiring;

/// Run the network on wires labeled with their own input index.  In the result, `w[j]` is the
/// input that arrives at output `j`.
///
/// Panics if `config` is not a configuration for a network on `n` wires.
pub fn simulate(config: &SwitchConfiguration, n: usize) -> Vec<u32> {
    assert_eq!(
        config.num_wires(), n,
        "configuration is for {} wires, not {}", config.num_wires(), n,
    );
    let mut w = (0 .. n as u32).collect::<Vec<_>>();
    sim_rec(config, 0, 0, &mut w);
    w
}

/// Check that `config` sends each input `i` to output `perm[i]`.
pub fn verify(config: &SwitchConfiguration, n: usize, perm: &[u32]) -> bool {
    if perm.len() != n {
        return false;
    }
    let w = simulate(config, n);
    perm.iter().enumerate().all(|(i, &o)| w.get(o as usize) == Some(&(i as u32)))
}

/// Replay the sub-network with first stage `stage_off` and first switch `switch_base` on the
/// wires `w`.
fn sim_rec(config: &SwitchConfiguration, stage_off: usize, switch_base: usize, w: &mut [u32]) {
    let n = w.len();
    if n < 2 {
        return;
    }

    let m = n / 2;
    apply_stage(config, stage_off, switch_base, w);
    if n == 2 {
        // The first and last stage are the same single switch.
        return;
    }

    // Output 0 of each first-stage switch feeds the upper subnetwork, output 1 the lower.
    let mut split = Vec::with_capacity(n);
    split.extend((0 .. m).map(|p| w[2 * p]));
    split.extend((0 .. m).map(|p| w[2 * p + 1]));

    {
        let (upper, lower) = split.split_at_mut(m);
        sim_rec(config, stage_off + 1, switch_base, upper);
        sim_rec(config, stage_off + 1, switch_base + m / 2, lower);
    }

    // Re-interleave: last-stage switch `p` takes output `p` of each subnetwork.
    for p in 0 .. m {
        w[2 * p] = split[p];
        w[2 * p + 1] = split[m + p];
    }

    let k = n.trailing_zeros() as usize;
    apply_stage(config, stage_off + 2 * k - 2, switch_base, w);
}

fn apply_stage(config: &SwitchConfiguration, stage: usize, switch_base: usize, w: &mut [u32]) {
    for p in 0 .. w.len() / 2 {
        if config.is_cross(stage, switch_base + p) {
            w.swap(2 * p, 2 * p + 1);
        }
    }
}


/// Find the input that is connected to output `b`, by following the wire backwards through every
/// stage of `wiring`.
pub fn trace_output(config: &SwitchConfiguration, wiring: &Wiring, b: u32) -> u32 {
    let mut x = b;
    for s in (0 .. config.num_stages()).rev() {
        x = step_back(config, wiring, s, x);
    }
    x
}

/// Like `trace_output`, but returns the wire index at every stage boundary: element 0 is the
/// network input, and element `s + 1` is the output wire of stage `s`.
pub fn trace_steps(config: &SwitchConfiguration, wiring: &Wiring, b: u32) -> Vec<u32> {
    let mut xs = Vec::with_capacity(config.num_stages() + 1);
    let mut x = b;
    xs.push(x);
    for s in (0 .. config.num_stages()).rev() {
        x = step_back(config, wiring, s, x);
        xs.push(x);
    }
    xs.reverse();
    xs
}

fn step_back(config: &SwitchConfiguration, wiring: &Wiring, stage: usize, x: u32) -> u32 {
    let i = x as usize / 2;
    let mut side = x % 2;
    if config.is_cross(stage, i) {
        side ^= 1;
    }
    wiring.switch(stage, i)[side as usize]
}

/// Compute the same result as `simulate`, one output at a time, using `trace_output`.
pub fn simulate_by_tracing(config: &SwitchConfiguration, wiring: &Wiring) -> Vec<u32> {
    assert_eq!(config.topology(), wiring.topology());
    (0 .. config.num_wires() as u32).map(|b| trace_output(config, wiring, b)).collect()
}
