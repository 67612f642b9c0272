//! Shape and wiring of a Benes network.
use std::convert::TryFrom;
use crate::error::Error;

/// The dimensions of a Benes network on `num_wires` inputs and outputs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Topology {
    pub num_wires: usize,
    /// `log2(num_wires)`.
    pub k: u32,
    pub num_stages: usize,
    /// The number of switches in each stage.  Every stage spans all `2 * stage_size` wires,
    /// except in the single-wire network, which has no switches at all.
    pub stage_size: usize,
}

impl Topology {
    pub fn new(num_wires: usize) -> Result<Topology, Error> {
        if num_wires == 0 || !num_wires.is_power_of_two() {
            return Err(Error::NotPowerOfTwo(num_wires));
        }
        // Wires are labeled with `u32`s throughout, and so is the wire count.
        if u32::try_from(num_wires).is_err() {
            return Err(Error::TooLarge(num_wires));
        }

        let k = num_wires.trailing_zeros();
        if num_wires == 1 {
            return Ok(Topology { num_wires, k, num_stages: 0, stage_size: 0 });
        }
        Ok(Topology {
            num_wires,
            k,
            num_stages: 2 * k as usize - 1,
            stage_size: num_wires / 2,
        })
    }

    pub fn num_switches(&self) -> usize {
        self.num_stages * self.stage_size
    }
}

/// Compute `(k, stages, switches_per_stage)` for a network on `n` wires.
pub fn stages_and_width(n: usize) -> Result<(u32, usize, usize), Error> {
    let t = Topology::new(n)?;
    Ok((t.k, t.num_stages, t.stage_size))
}


/// The explicit connections between consecutive stages of a Benes network.  This is the flat,
/// non-recursive counterpart of the recursive construction used by the router: the upper
/// subnetwork of each sub-network takes output 0 of every one of its first-stage switches, the
/// lower subnetwork takes output 1, and the last stage re-interleaves the two halves.
pub struct Wiring {
    topology: Topology,
    /// A matrix of `stage_size` by `num_stages` switch nodes.  The first `stage_size` elements are
    /// the contents of stage 0.  Each node takes two inputs from the previous stage (from the
    /// wire indices indicated by the two `u32`s) and produces two outputs.
    switches: Vec<[u32; 2]>,
}

impl Wiring {
    pub fn new(topology: Topology) -> Wiring {
        let mut w = Wiring {
            topology,
            switches: vec![[0, 0]; topology.num_switches()],
        };
        if topology.num_stages > 0 {
            w.init();
        }
        w
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    fn node_index(&self, stage: usize, index: usize) -> usize {
        self.topology.stage_size * stage + index
    }

    /// Retrieve the wires feeding switch `index` of stage `stage`.  For stage 0 these are network
    /// inputs; otherwise they are outputs of the previous stage.
    pub fn switch(&self, stage: usize, index: usize) -> [u32; 2] {
        self.switches[self.node_index(stage, index)]
    }

    fn switch_mut(&mut self, stage: usize, index: usize) -> &mut [u32; 2] {
        let i = self.node_index(stage, index);
        &mut self.switches[i]
    }

    fn init(&mut self) {
        // A Benes network on 8 inputs has 5 stages.  Stage 0 just takes in all the network's
        // inputs in order.  The remaining stages come in mirror-image pairs: the connections
        // into stage 1 are the reverse of the connections into stage 4, and similarly for
        // stages 2 and 3.  We generate each pair together.
        //
        // Each stage is built out of "chunks", one per sub-network at that recursion depth,
        // each with the same arrangement of connections.  Stage 1 is a single chunk, stage 2
        // has 2 chunks of half the size, and so on.
        let stage_size = self.topology.stage_size;
        let num_stages = self.topology.num_stages;

        for i in 0 .. stage_size {
            *self.switch_mut(0, i) = [i as u32 * 2, i as u32 * 2 + 1];
        }

        let mut buf = Vec::new();
        for l in 0 .. (num_stages - 1) / 2 {
            let l1 = 1 + l;
            let l2 = num_stages - 1 - l;

            let num_chunks = 1 << l;
            // Number of switches in a single chunk.
            let chunk_size = stage_size >> l;
            debug_assert_eq!(num_chunks * chunk_size, stage_size);

            // Wire `y` of the chunk's next stage reads wire `buf[y]` of the previous one: first
            // all the even (upper) outputs, then all the odd (lower) ones.
            buf.clear();
            buf.extend((0 .. chunk_size).map(|i| i as u32 * 2));
            buf.extend((0 .. chunk_size).map(|i| i as u32 * 2 + 1));

            for chunk in 0 .. num_chunks {
                let base = (chunk * chunk_size * 2) as u32;
                for (y, &x) in buf.iter().enumerate() {
                    let y = y as u32;
                    // The roles of `x` and `y` are reversed for the mirrored stage `l2`.
                    self.switch_mut(l1, (base + y) as usize / 2)[y as usize % 2] = base + x;
                    self.switch_mut(l2, (base + x) as usize / 2)[x as usize % 2] = base + y;
                }
            }
        }
    }
}
