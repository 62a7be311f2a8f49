// Release builds are GUI-subsystem binaries: no console window flashes
// up behind the overlay.
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use clap::Parser;

use backdrop_core::config::{self, Config};

#[derive(Parser)]
#[command(
    name = "backdrop",
    version,
    about = "Launch a program behind an overlay that stands in for it on the taskbar"
)]
struct Cli {
    /// Program to launch, followed by its arguments.
    ///
    /// When omitted, the tab-separated list in `<binary>.txt` next to the
    /// executable is used; when that is empty too, `calc` is launched.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let config = config::load();
    backdrop_core::log::init(&config.logging);

    std::process::exit(run(cli, &config));
}

#[cfg(windows)]
fn run(cli: Cli, config: &Config) -> i32 {
    use backdrop_core::args::{self, Companions};

    let companions = match Companions::current() {
        Ok(companions) => companions,
        Err(e) => {
            eprintln!("Error: cannot locate the running binary: {e}");
            return 1;
        }
    };
    let target = args::resolve(cli.command, &companions);

    match backdrop_windows::run(&target, config, &companions) {
        Ok(code) => code,
        Err(e) => {
            backdrop_core::log_error!("{e}");
            eprintln!("Error: {e}");
            1
        }
    }
}

#[cfg(not(windows))]
fn run(_cli: Cli, _config: &Config) -> i32 {
    eprintln!("Error: backdrop requires Windows.");
    1
}
