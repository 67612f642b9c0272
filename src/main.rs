use std::fs;
use std::path::Path;
use std::process;
use std::str::FromStr;
use clap::{App, Arg, ArgMatches};
use env_logger;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use benes_router::parse::{parse_perm, read_perm_file};
use benes_router::routing::{self, render, route, verify, Wiring};
use benes_router::routing::svg::dump_svg;


fn parse_args() -> ArgMatches<'static> {
    App::new("benes-router")
        .about("compute Benes network switch settings for a permutation and verify them")
        .arg(Arg::with_name("k")
             .short("k")
             .takes_value(true)
             .value_name("K")
             .help("network size exponent: the network has 2^K inputs (default 3)"))
        .arg(Arg::with_name("perm")
             .long("perm")
             .takes_value(true)
             .value_name("LIST")
             .conflicts_with_all(&["perm-file", "shuffle"])
             .help("permutation to route, as a comma- or space-separated list; \
                    entry i is the output that input i is sent to"))
        .arg(Arg::with_name("perm-file")
             .long("perm-file")
             .takes_value(true)
             .value_name("PERM.YAML")
             .conflicts_with("shuffle")
             .help("read the permutation from a YAML, JSON, or CBOR file"))
        .arg(Arg::with_name("shuffle")
             .long("shuffle")
             .takes_value(true)
             .value_name("SEED")
             .help("route a random permutation of size 2^K, generated from SEED"))
        .arg(Arg::with_name("json")
             .long("json")
             .help("print the switch configuration as JSON"))
        .arg(Arg::with_name("svg")
             .long("svg")
             .takes_value(true)
             .value_name("OUT.SVG")
             .help("write a drawing of the configured network to this file"))
        .arg(Arg::with_name("highlight")
             .long("highlight")
             .takes_value(true)
             .value_name("OUTPUT")
             .requires("svg")
             .help("in the SVG drawing, highlight the path leading to this output"))
        .after_help(
            "With no permutation options, routes the identity permutation of size 2^K \
             (K defaults to 3).\n\
             An explicit permutation sets N to its own length, which must be a power of two. \
             If -k is also given, N=2^K and the permutation must have exactly N entries.",
        )
        .get_matches()
}

fn parse_number<T: FromStr>(args: &ArgMatches, name: &str) -> Result<Option<T>, String>
where T::Err: ToString {
    match args.value_of(name) {
        Some(s) => T::from_str(s)
            .map(Some)
            .map_err(|e| format!("bad value {:?} for --{}: {}", s, name, e.to_string())),
        None => Ok(None),
    }
}

/// Determine the permutation to route from the command-line arguments.
fn load_perm(args: &ArgMatches) -> Result<Vec<u32>, String> {
    let k = parse_number::<u32>(args, "k")?;
    let size_of_k = |k: u32| {
        1_usize.checked_shl(k).filter(|&n| n <= 1 << 31)
            .ok_or_else(|| format!("-k {} is too large", k))
    };

    let explicit = if let Some(s) = args.value_of("perm") {
        Some(parse_perm(s)?)
    } else if let Some(path) = args.value_of_os("perm-file") {
        Some(read_perm_file(Path::new(path))?)
    } else {
        None
    };

    let perm = match explicit {
        Some(perm) => {
            if let Some(k) = k {
                let n = size_of_k(k)?;
                if perm.len() != n {
                    return Err(format!(
                        "-k defines N={} but the permutation contains {} items", n, perm.len(),
                    ));
                }
            }
            perm
        },
        None => {
            let n = size_of_k(k.unwrap_or(3))?;
            let mut perm = routing::identity(n);
            match parse_number::<u64>(args, "shuffle")? {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    perm.shuffle(&mut rng);
                    eprintln!("(Random) Using permutation N={} from seed {}", n, seed);
                },
                None => eprintln!("(Default) Using identity permutation N={}", n),
            }
            perm
        },
    };
    Ok(perm)
}

fn real_main(args: ArgMatches<'static>) -> Result<bool, String> {
    let perm = load_perm(&args)?;
    let n = perm.len();
    info!("routing permutation of size {}", n);

    let config = route(n, &perm).map_err(|e| e.to_string())?;

    if args.is_present("json") {
        let json = serde_json::to_string(&config).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        for line in render(&config) {
            println!("{}", line);
        }
    }

    if let Some(path) = args.value_of_os("svg") {
        let highlight = parse_number::<u32>(&args, "highlight")?;
        if let Some(b) = highlight {
            if b as usize >= n {
                return Err(format!("--highlight {} is out of range for N={}", b, n));
            }
        }
        let wiring = Wiring::new(config.topology());
        let svg = dump_svg(&config, &wiring, highlight).map_err(|e| e.to_string())?;
        fs::write(path, svg)
            .map_err(|e| format!("failed to write {}: {}", Path::new(path).display(), e))?;
    }

    let ok = verify(&config, n, &perm);
    println!("Verification: {}", if ok { "OK" } else { "FAILED" });
    Ok(ok)
}

fn main() {
    env_logger::init();
    let args = parse_args();

    match real_main(args) {
        Ok(true) => {},
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        },
    }
}
