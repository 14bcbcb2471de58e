use PrimoChem::cli::cli_main::run_interactive_menu;
use simplelog::{Config, LevelFilter, SimpleLogger};

pub fn main() {
    let _ = SimpleLogger::init(LevelFilter::Info, Config::default());
    run_interactive_menu();
}
