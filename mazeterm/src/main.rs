//! Terminal maze solver.
//!
//! Run: `cargo run --bin mazeterm [rows cols]` (defaults to 4x5).

fn main() {
    let mut args = std::env::args().skip(1);
    let rows = parse_dim(args.next(), 4);
    let cols = parse_dim(args.next(), 5);

    if let Err(e) = mazeterm::run(rows, cols) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn parse_dim(arg: Option<String>, default: i32) -> i32 {
    match arg {
        Some(s) => match s.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: invalid dimension {s:?}");
                std::process::exit(2);
            }
        },
        None => default,
    }
}
