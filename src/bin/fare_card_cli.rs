use fare_card::{
    cli::{run_cli, run_demo},
    init,
};

fn main() {
    init();

    let demo = std::env::args().skip(1).any(|arg| arg == "--demo");
    let result = if demo { run_demo() } else { run_cli() };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
