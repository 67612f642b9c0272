use std::io::{self, Write};
use goldenfile::Mint;
use benes_router::routing::{render, route, verify};

/// Switch configurations for a few fixed permutations.  The router breaks ties by wire order, so
/// these outputs must never change unless the tie-breaking rule itself changes.
#[test]
fn golden_tests() -> io::Result<()> {
    let cases: &[(&str, &[u32])] = &[
        ("block_swap_4", &[2, 3, 0, 1]),
        ("pairwise_swap_8", &[1, 0, 3, 2, 5, 4, 7, 6]),
        ("identity_8", &[0, 1, 2, 3, 4, 5, 6, 7]),
        ("interleave_16", &[0, 2, 4, 6, 8, 1, 3, 5, 7, 9, 10, 11, 12, 13, 14, 15]),
        ("mixed_32", &[
            13, 10, 17, 11, 25, 8, 19, 9, 21, 2, 30, 23, 31, 5, 28, 7,
            4, 0, 22, 3, 29, 16, 6, 27, 26, 18, 15, 24, 12, 14, 20, 1,
        ]),
    ];

    let mut mint = Mint::new("tests/golden_output");
    for &(name, perm) in cases {
        let config = route(perm.len(), perm).unwrap();
        assert!(verify(&config, perm.len(), perm), "failed to route {}", name);

        let mut dest = mint.new_goldenfile(format!("{}.out", name))?;
        for line in render(&config) {
            writeln!(dest, "{}", line)?;
        }
    }

    // Check the contents of the `dest` files against the golden files.
    drop(mint);

    Ok(())
}
