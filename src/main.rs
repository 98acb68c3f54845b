use cache_line_sim::config::Config;
use cache_line_sim::run_simulation;
use clap::Parser;
use std::process;

fn init_msg() {
    println!("cache line simulation");
}

fn init_logger(verbose: bool) {
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }
}

fn main() {
    init_msg();
    let config = Config::parse();
    init_logger(config.verbose);
    config.display();
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        process::exit(1);
    }
    println!();
    if let Err(e) = run_simulation(config) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
