/// Main interactive menu: evaluate cells, cooling curves, Jacobians.
pub mod cli_main;
/// Editing and saving the network configuration.
pub mod cli_settings;
