use std::fmt;
use bitflags::bitflags;
use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;
use super::topology::Topology;

bitflags! {
    pub struct SwitchFlags: u8 {
        /// This switch is configured to cross its two wires instead of passing them straight
        /// through.
        const F_SWAP = 1;
        /// The state of this switch has been set and can no longer be changed.
        const F_SET = 2;
    }
}

/// The state of every switch in a routed Benes network.
///
/// Cells are stored switch-major: the `num_stages` cells of switch index 0 come first, then those
/// of switch index 1, and so on.  With this layout, the switches owned by one sub-network of the
/// recursive construction form a single contiguous range, which lets the router hand each
/// recursive call its own exclusive slice.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SwitchConfiguration {
    topology: Topology,
    cells: Vec<SwitchFlags>,
}

impl SwitchConfiguration {
    /// Create a configuration for `topology` with no switches set yet.
    pub(crate) fn new(topology: Topology) -> SwitchConfiguration {
        SwitchConfiguration {
            topology,
            cells: vec![SwitchFlags::empty(); topology.num_switches()],
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn num_wires(&self) -> usize {
        self.topology.num_wires
    }

    pub fn num_stages(&self) -> usize {
        self.topology.num_stages
    }

    pub fn stage_size(&self) -> usize {
        self.topology.stage_size
    }

    fn cell_index(&self, stage: usize, index: usize) -> usize {
        assert!(stage < self.topology.num_stages, "stage {} out of range", stage);
        assert!(index < self.topology.stage_size, "switch {} out of range", index);
        index * self.topology.num_stages + stage
    }

    pub fn flags(&self, stage: usize, index: usize) -> SwitchFlags {
        self.cells[self.cell_index(stage, index)]
    }

    /// The configuration bit of switch `index` in stage `stage`: 1 for cross, 0 for straight.
    pub fn get(&self, stage: usize, index: usize) -> u8 {
        self.is_cross(stage, index) as u8
    }

    pub fn is_cross(&self, stage: usize, index: usize) -> bool {
        self.flags(stage, index).contains(SwitchFlags::F_SWAP)
    }

    /// Check whether every switch has been assigned a state.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|f| f.contains(SwitchFlags::F_SET))
    }

    /// The configuration bits of all switches in `stage`, in switch order.
    pub fn stage_bits(&self, stage: usize) -> Vec<u8> {
        (0 .. self.topology.stage_size).map(|i| self.get(stage, i)).collect()
    }

    pub fn rows(&self) -> Vec<Vec<u8>> {
        (0 .. self.topology.num_stages).map(|s| self.stage_bits(s)).collect()
    }

    /// Get a mutable view covering every switch of the network.
    pub(crate) fn view_mut(&mut self) -> SwitchView<'_> {
        SwitchView {
            cells: &mut self.cells,
            num_stages: self.topology.num_stages,
        }
    }
}

/// Render `config` as one line of text per stage, in the form `stage 0: 0 1 1 0`.
pub fn render(config: &SwitchConfiguration) -> Vec<String> {
    config.rows().into_iter().enumerate().map(|(s, bits)| {
        let mut line = format!("stage {}:", s);
        for b in bits {
            line.push(' ');
            line.push(if b == 0 { '0' } else { '1' });
        }
        line
    }).collect()
}

impl fmt::Display for SwitchConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in render(self) {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl Serialize for SwitchConfiguration {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut st = s.serialize_struct("SwitchConfiguration", 2)?;
        st.serialize_field("num_wires", &self.topology.num_wires)?;
        st.serialize_field("stages", &self.rows())?;
        st.end()
    }
}


/// Exclusive access to the switches of one sub-network: a contiguous range of switch indices,
/// across all stages.  Stage numbers passed to a view are global; switch indices are relative to
/// the start of the view.
pub(crate) struct SwitchView<'a> {
    cells: &'a mut [SwitchFlags],
    num_stages: usize,
}

impl<'a> SwitchView<'a> {
    /// The number of switch indices covered by this view.
    pub fn width(&self) -> usize {
        self.cells.len() / self.num_stages
    }

    /// Set the state of switch `index` in stage `stage`.  Panics if that switch was already set:
    /// each switch belongs to exactly one recursive activation, which sets it exactly once.
    pub fn set(&mut self, stage: usize, index: usize, swap: bool) {
        debug_assert!(stage < self.num_stages && index < self.width());
        let flags = &mut self.cells[index * self.num_stages + stage];
        assert!(
            !flags.contains(SwitchFlags::F_SET),
            "switch {} of stage {} was set twice", index, stage,
        );
        flags.insert(SwitchFlags::F_SET);
        if swap {
            flags.insert(SwitchFlags::F_SWAP);
        }
    }

    /// Split into views of the upper and lower halves of the switch range.
    pub fn split(self) -> (SwitchView<'a>, SwitchView<'a>) {
        let num_stages = self.num_stages;
        let mid = self.width() / 2 * num_stages;
        let (upper, lower) = self.cells.split_at_mut(mid);
        (
            SwitchView { cells: upper, num_stages },
            SwitchView { cells: lower, num_stages },
        )
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_view_split() {
        let mut config = SwitchConfiguration::new(Topology::new(8).unwrap());
        {
            let view = config.view_mut();
            assert_eq!(view.width(), 4);
            let (mut upper, mut lower) = view.split();
            assert_eq!(upper.width(), 2);
            upper.set(1, 1, true);
            lower.set(1, 0, true);
            lower.set(2, 1, false);
        }
        assert_eq!(config.stage_bits(1), vec![0, 1, 1, 0]);
        assert_eq!(config.flags(2, 3), SwitchFlags::F_SET);
        assert!(!config.is_complete());
    }

    #[test]
    #[should_panic(expected = "set twice")]
    fn test_set_twice() {
        let mut config = SwitchConfiguration::new(Topology::new(4).unwrap());
        let mut view = config.view_mut();
        view.set(0, 1, false);
        view.set(0, 1, true);
    }

    #[test]
    fn test_render() {
        let mut config = SwitchConfiguration::new(Topology::new(4).unwrap());
        {
            let mut view = config.view_mut();
            for s in 0 .. 3 {
                view.set(s, 0, s == 1);
                view.set(s, 1, s != 0);
            }
        }
        assert!(config.is_complete());
        assert_eq!(render(&config), vec!["stage 0: 0 0", "stage 1: 1 1", "stage 2: 0 1"]);
        assert_eq!(config.to_string(), "stage 0: 0 0\nstage 1: 1 1\nstage 2: 0 1\n");
        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"num_wires":4,"stages":[[0,0],[1,1],[0,1]]}"#,
        );
    }
}
