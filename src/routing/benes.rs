//! Lee-Paull routing of an arbitrary permutation through a Benes network.
//!
//! Each level of the recursion views a sub-network on `n` wires as a first stage, a last stage,
//! and two independent half-size sub-networks in between (the upper and lower subnetworks).
//! Every wire is assigned to one of the two halves, the first and last stages are set to send
//! each wire into its half, and the two halves are routed recursively.
//!
//! The assignment comes from 2-coloring a graph over the sub-network's inputs with two kinds of
//! edges: inputs that share a first-stage switch ("siblings", `i` and `i ^ 1`), and inputs whose
//! outputs share a last-stage switch ("output partners").  Both edge sets are perfect matchings,
//! so the graph is a union of cycles, and every cycle alternates between the two kinds of edges
//! and therefore has even length.  Coloring each cycle alternately puts the two inputs of each
//! first-stage switch in different halves and the two outputs of each last-stage switch in
//! different halves, which is exactly what the outer stages can implement.
use log::{debug, trace};
use crate::error::Error;
use super::config::{SwitchConfiguration, SwitchView};
use super::topology::Topology;
use super::validate_permutation;

/// Which of the two half-size subnetworks a wire is routed through.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    Upper,
    Lower,
}

impl Color {
    pub fn flip(self) -> Color {
        match self {
            Color::Upper => Color::Lower,
            Color::Lower => Color::Upper,
        }
    }
}

/// Compute a switch configuration that sends each input `i` to output `perm[i]`.
///
/// The result is a pure function of `perm`: ties are always broken by scanning wires in
/// ascending order, so routing the same permutation twice gives identical configurations.
pub fn route(n: usize, perm: &[u32]) -> Result<SwitchConfiguration, Error> {
    route_with_threshold(n, perm, PARALLEL_THRESHOLD)
}

/// Like `route`, but sub-networks of at least `parallel_threshold` wires route their two halves
/// on separate threads.  Without the `parallel` feature the threshold is ignored.
fn route_with_threshold(
    n: usize,
    perm: &[u32],
    parallel_threshold: usize,
) -> Result<SwitchConfiguration, Error> {
    let topology = Topology::new(n)?;
    validate_permutation(n, perm)?;

    let mut config = SwitchConfiguration::new(topology);
    if n >= 2 {
        route_rec(perm, 0, config.view_mut(), parallel_threshold);
    }
    assert!(config.is_complete(), "some switches were left unset after routing");
    debug!("routed {} wires through {} stages", n, topology.num_stages);
    Ok(config)
}

/// Route the sub-network whose first stage is `stage_off` and whose switches are covered by
/// `view`.  `perm` must be a permutation of `0 .. perm.len()`, and `perm.len()` must be a power
/// of two no smaller than 2; both are checked once by `route`.
fn route_rec(
    perm: &[u32],
    stage_off: usize,
    mut view: SwitchView<'_>,
    parallel_threshold: usize,
) {
    let n = perm.len();
    debug_assert_eq!(view.width(), n / 2);

    if n == 2 {
        // A single switch: cross it iff it has to swap its two wires.
        view.set(stage_off, 0, perm[0] == 1);
        return;
    }

    let m = n / 2;
    let k = n.trailing_zeros() as usize;
    let stage_last = stage_off + 2 * k - 2;
    trace!("routing {} wires at stages {} ..= {}", n, stage_off, stage_last);

    let partners = output_partners(perm);
    let in_colors = color_inputs(&partners);

    let num_upper = in_colors.iter().filter(|&&c| c == Color::Upper).count();
    assert_eq!(
        num_upper, m,
        "coloring split {} wires unevenly: {} upper, {} lower", n, num_upper, n - num_upper,
    );

    // Each output takes the color of the input routed to it.
    let mut out_colors = vec![Color::Upper; n];
    for (i, &o) in perm.iter().enumerate() {
        out_colors[o as usize] = in_colors[i];
    }

    // Output 0 of each first-stage switch feeds the upper subnetwork, and input 0 of each
    // last-stage switch is fed by it.  A switch goes straight when its even wire is upper.
    for p in 0 .. m {
        debug_assert_ne!(in_colors[2 * p], in_colors[2 * p + 1]);
        debug_assert_ne!(out_colors[2 * p], out_colors[2 * p + 1]);
        view.set(stage_off, p, in_colors[2 * p] != Color::Upper);
        view.set(stage_last, p, out_colors[2 * p] != Color::Upper);
    }

    let (upper_perm, lower_perm) = split_permutation(perm, &in_colors, &out_colors);
    let (upper, lower) = view.split();
    join(
        n >= parallel_threshold,
        || route_rec(&upper_perm, stage_off + 1, upper, parallel_threshold),
        || route_rec(&lower_perm, stage_off + 1, lower, parallel_threshold),
    );
}

/// For each input `i`, find the other input whose output shares a last-stage switch with
/// `perm[i]`.
fn output_partners(perm: &[u32]) -> Vec<u32> {
    let n = perm.len();
    let mut first = vec![None; n / 2];
    let mut partners = vec![0; n];
    for (i, &o) in perm.iter().enumerate() {
        let pair = o as usize / 2;
        match first[pair] {
            None => first[pair] = Some(i),
            Some(j) => {
                partners[i] = j as u32;
                partners[j] = i as u32;
            },
        }
    }
    partners
}

/// 2-color the union of the sibling matching (`i ^ 1`) and the output-partner matching.  Each
/// cycle is traced from its lowest-numbered input, which is colored `Upper`, stepping first to
/// its sibling and then alternating between the two matchings until the cycle closes.
fn color_inputs(partners: &[u32]) -> Vec<Color> {
    let n = partners.len();
    let mut colors: Vec<Option<Color>> = vec![None; n];

    for start in 0 .. n {
        if colors[start].is_some() {
            continue;
        }

        let mut cur = start;
        let mut color = Color::Upper;
        let mut via_sibling = true;
        loop {
            colors[cur] = Some(color);
            let next = if via_sibling { cur ^ 1 } else { partners[cur] as usize };
            via_sibling = !via_sibling;
            color = color.flip();

            match colors[next] {
                None => cur = next,
                Some(c) => {
                    // The cycle has closed.  Since it alternates between the two matchings, it
                    // can only close at `start`, and only with a consistent color.
                    assert!(
                        next == start && c == color,
                        "odd cycle through wire {} while coloring {} wires", next, n,
                    );
                    break;
                },
            }
        }
    }

    colors.into_iter().map(|c| c.unwrap_or(Color::Upper)).collect()
}

/// Build the permutations for the upper and lower subnetworks.  The `r`th upper input (in
/// ascending order) is sent to the rank of its output among the upper outputs, and likewise for
/// the lower half.  Each first-stage switch has exactly one upper input, so the `r`th upper input
/// arrives on wire `r` of the upper subnetwork.
fn split_permutation(
    perm: &[u32],
    in_colors: &[Color],
    out_colors: &[Color],
) -> (Vec<u32>, Vec<u32>) {
    let n = perm.len();
    let mut rank = vec![0; n];
    let (mut num_upper, mut num_lower) = (0, 0);
    for (o, &c) in out_colors.iter().enumerate() {
        let count = match c {
            Color::Upper => &mut num_upper,
            Color::Lower => &mut num_lower,
        };
        rank[o] = *count;
        *count += 1;
    }

    let mut upper = Vec::with_capacity(n / 2);
    let mut lower = Vec::with_capacity(n / 2);
    for (i, &o) in perm.iter().enumerate() {
        debug_assert_eq!(in_colors[i], out_colors[o as usize]);
        match in_colors[i] {
            Color::Upper => upper.push(rank[o as usize]),
            Color::Lower => lower.push(rank[o as usize]),
        }
    }
    (upper, lower)
}

/// Sub-networks smaller than this are always routed on the current thread.
const PARALLEL_THRESHOLD: usize = 1 << 12;

#[cfg(feature = "parallel")]
fn join<A, B>(parallel: bool, a: A, b: B)
where A: FnOnce() + Send, B: FnOnce() + Send {
    if parallel {
        rayon::join(a, b);
    } else {
        a();
        b();
    }
}

#[cfg(not(feature = "parallel"))]
fn join<A, B>(_parallel: bool, a: A, b: B)
where A: FnOnce(), B: FnOnce() {
    a();
    b();
}


#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use crate::error::InvalidPermutation;
    use crate::routing::sim::{simulate, verify};
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn check_route(perm: &[u32]) -> SwitchConfiguration {
        let config = route(perm.len(), perm).unwrap();
        assert!(verify(&config, perm.len(), perm), "failed to route {:?}", perm);
        config
    }

    /// Decode `idx` (in `0 .. n!`) into a permutation of `0 .. n`.
    fn nth_permutation(n: usize, idx: usize) -> Vec<u32> {
        let mut pool = (0 .. n as u32).collect::<Vec<_>>();
        let mut perm = vec![0; n];
        let mut x = idx;
        for j in (0 .. n).rev() {
            let k = x % (j + 1);
            x /= j + 1;
            // Like `perm[j] = pool.swap_remove(k)`
            perm[j] = pool[k];
            pool[k] = pool[j];
        }
        perm
    }

    /// Route every permutation of size 2, 4, and 8.
    #[test]
    fn test_route_all_perms() {
        init();
        for &n in &[2, 4, 8] {
            let count: usize = (1 ..= n).product();
            for i in 0 .. count {
                check_route(&nth_permutation(n, i));
            }
        }
    }

    #[test]
    fn test_route_random() {
        init();
        let mut rng = StdRng::seed_from_u64(0);
        for &n in &[16, 32, 64] {
            for _ in 0 .. 200 {
                let mut perm = (0 .. n).collect::<Vec<u32>>();
                perm.shuffle(&mut rng);
                check_route(&perm);
            }
        }
    }

    #[test]
    fn test_route_big() {
        init();
        let mut rng = StdRng::seed_from_u64(1);
        let mut perm = (0 .. 1 << 10).collect::<Vec<u32>>();
        perm.shuffle(&mut rng);
        let config = check_route(&perm);
        assert_eq!(config.num_stages(), 19);
        assert_eq!(config.stage_size(), 512);
    }

    /// Splitting down to the smallest sub-networks on separate threads must give the same
    /// configuration as routing everything on one thread.
    #[cfg(feature = "parallel")]
    #[test]
    fn test_route_parallel_matches_serial() {
        init();
        let mut rng = StdRng::seed_from_u64(5);
        let n = 1 << 13;
        let mut perm = (0 .. n as u32).collect::<Vec<_>>();
        perm.shuffle(&mut rng);

        let serial = route_with_threshold(n, &perm, usize::MAX).unwrap();
        let parallel = route_with_threshold(n, &perm, 2).unwrap();
        assert!(verify(&parallel, n, &perm));
        assert_eq!(parallel, serial);
        assert_eq!(route(n, &perm).unwrap(), serial);
    }

    #[test]
    fn test_route_pairwise_swap() {
        init();
        let config = check_route(&[1, 0, 3, 2, 5, 4, 7, 6]);
        assert_eq!(config.num_stages(), 5);
    }

    #[test]
    fn test_route_block_swap() {
        init();
        check_route(&[2, 3, 0, 1]);
    }

    #[test]
    fn test_route_identity() {
        init();
        let perm = (0 .. 8).collect::<Vec<u32>>();
        let config = check_route(&perm);
        assert_eq!(simulate(&config, 8), perm);
    }

    #[test]
    fn test_route_trivial() {
        init();
        let config = route(1, &[0]).unwrap();
        assert_eq!(config.num_stages(), 0);
        assert!(verify(&config, 1, &[0]));

        assert_eq!(route(2, &[1, 0]).unwrap().rows(), vec![vec![1]]);
        assert_eq!(route(2, &[0, 1]).unwrap().rows(), vec![vec![0]]);
    }

    #[test]
    fn test_route_deterministic() {
        init();
        let mut rng = StdRng::seed_from_u64(2);
        let mut perm = (0 .. 64).collect::<Vec<u32>>();
        perm.shuffle(&mut rng);
        assert_eq!(route(64, &perm).unwrap(), route(64, &perm).unwrap());
    }

    #[test]
    fn test_route_errors() {
        init();
        assert_eq!(route(6, &[0, 1, 2, 3, 4, 5]), Err(Error::NotPowerOfTwo(6)));
        assert_eq!(route(0, &[]), Err(Error::NotPowerOfTwo(0)));
        assert_eq!(
            route(4, &[0, 0, 1, 2]),
            Err(Error::InvalidPermutation(
                InvalidPermutation::Duplicate { output: 0, first: 0, second: 1 },
            )),
        );
        assert_eq!(
            route(4, &[0, 1, 2]),
            Err(Error::InvalidPermutation(
                InvalidPermutation::Length { expected: 4, actual: 3 },
            )),
        );
        assert_eq!(
            route(4, &[0, 1, 2, 4]),
            Err(Error::InvalidPermutation(
                InvalidPermutation::OutOfRange { input: 3, output: 4 },
            )),
        );
    }

    /// Every cycle of the coloring graph alternates colors, so siblings and output partners
    /// always land in different halves.
    #[test]
    fn test_coloring_balanced() {
        init();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0 .. 100 {
            let mut perm = (0 .. 32).collect::<Vec<u32>>();
            perm.shuffle(&mut rng);
            let partners = output_partners(&perm);
            let colors = color_inputs(&partners);
            for i in 0 .. 32 {
                assert_ne!(colors[i], colors[i ^ 1]);
                assert_ne!(colors[i], colors[partners[i] as usize]);
            }
            let mut out_colors = vec![Color::Upper; 32];
            for (i, &o) in perm.iter().enumerate() {
                out_colors[o as usize] = colors[i];
            }
            let (upper, lower) = split_permutation(&perm, &colors, &out_colors);
            assert_eq!(upper.len(), 16);
            assert_eq!(lower.len(), 16);
            let mut sorted = upper.clone();
            sorted.sort();
            assert_eq!(sorted, (0 .. 16).collect::<Vec<u32>>());
        }
    }

    #[test]
    fn test_coloring_small() {
        // Inputs 0 and 1 go to outputs 2 and 3, which share a switch, so 0 and 1 are both
        // siblings and output partners.
        let perm = [2, 3, 0, 1];
        let partners = output_partners(&perm);
        assert_eq!(partners, vec![1, 0, 3, 2]);
        let colors = color_inputs(&partners);
        assert_eq!(colors, vec![Color::Upper, Color::Lower, Color::Upper, Color::Lower]);
    }
}
