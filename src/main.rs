use clap::Parser;
use std::io;

mod args;
mod compression;
mod config;
mod file_serving;
mod logging;
mod request;
mod server;
mod status;

use args::Args;
use logging::setup_logging;
use server::start_server;

fn main() -> io::Result<()> {
    let args = Args::parse();
    setup_logging();
    start_server(args)
}
