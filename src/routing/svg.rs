//! SVG drawing of a configured network, for debugging.
use std::fmt::{self, Write as _};
use super::config::{SwitchConfiguration, SwitchFlags};
use super::sim::trace_steps;
use super::topology::Wiring;

const STAGE_PITCH: usize = 200;
const SWITCH_PITCH: usize = 75;
const SWITCH_WIDTH: usize = 100;

fn switch_x(stage: usize) -> usize {
    stage * STAGE_PITCH + 50
}

/// Vertical position of the port for wire `j` on either side of a stage.
fn port_y(j: u32) -> usize {
    (j as usize / 2) * SWITCH_PITCH + 25 + if j % 2 == 0 { 15 } else { 35 }
}

fn write_line(
    s: &mut String,
    (x0, y0): (usize, usize),
    (x1, y1): (usize, usize),
    color: &str,
) -> fmt::Result {
    writeln!(
        s, "<path d='M {},{} L {},{}' style='stroke: {}; stroke-width: 3px' />",
        x0, y0, x1, y1, color,
    )
}

/// Draw `config` as an SVG image.  Stages run left to right.  If `highlight_b` is set, the path
/// from that output back to its input is drawn in red.
pub fn dump_svg(
    config: &SwitchConfiguration,
    wiring: &Wiring,
    highlight_b: Option<u32>,
) -> Result<String, fmt::Error> {
    assert_eq!(config.topology(), wiring.topology());
    let num_stages = config.num_stages();
    let stage_size = config.stage_size();

    let xs = match highlight_b {
        Some(b) => trace_steps(config, wiring, b),
        None => Vec::new(),
    };
    // `xs[l + 1]` is the output wire of stage `l` on the highlighted path.
    let highlight_color = |l: usize, i: usize, side: usize| {
        if !xs.is_empty() && xs[l + 1] == (i * 2 + side) as u32 {
            "red"
        } else {
            "black"
        }
    };

    let mut s = String::new();
    writeln!(s, "<?xml version='1.0' encoding='UTF-8' standalone='no'?>")?;
    writeln!(
        s, "<svg width='{}' height='{}' xmlns='http://www.w3.org/2000/svg'>",
        num_stages * STAGE_PITCH,
        stage_size * SWITCH_PITCH + 25,
    )?;
    for l in 0 .. num_stages {
        let x = switch_x(l);
        for i in 0 .. stage_size {
            let flags = config.flags(l, i);
            let swap = flags.contains(SwitchFlags::F_SWAP) as usize;
            let fill = if !flags.contains(SwitchFlags::F_SET) { "#cccccc" }
                else if swap == 1 { "#ffcccc" }
                else { "#ccccff" };
            writeln!(
                s, "<rect x='{}' y='{}' width='{}' height='50' \
                    style='stroke: black; stroke-width: 3px; fill: {}' />",
                x, i * SWITCH_PITCH + 25, SWITCH_WIDTH, fill,
            )?;

            // Input side `side` of a switch carries its output `side ^ swap`.
            let port = |side: usize| port_y((i * 2 + side) as u32);
            if flags.contains(SwitchFlags::F_SET) {
                for out in 0 .. 2 {
                    let from = (x, port(out ^ swap));
                    let to = (x + SWITCH_WIDTH, port(out));
                    write_line(&mut s, from, to, highlight_color(l, i, out))?;
                }
            }
            if l > 0 {
                let prev_x = switch_x(l - 1) + SWITCH_WIDTH;
                for (side, &j) in wiring.switch(l, i).iter().enumerate() {
                    let from = (prev_x, port_y(j));
                    write_line(&mut s, from, (x, port(side)), highlight_color(l, i, side ^ swap))?;
                }
            }
        }
    }
    writeln!(s, "</svg>")?;
    Ok(s)
}
