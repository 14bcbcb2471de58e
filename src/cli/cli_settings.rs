use super::cli_main::{get_choice, prompt_f64};
use crate::Network::temperature_solver::TemperatureIteration;
use crate::settings::ConfigManager;

pub fn settings_menu(manager: &mut ConfigManager) {
    loop {
        let config = manager.config();
        println!("\n=== Settings ({}) ===", manager.config_file());
        println!(
            "grid: [{}, {}] K, {} bins",
            config.t_min, config.t_max, config.nbins
        );
        println!("1. Redshift: {}", config.redshift);
        println!("2. Temperature iteration: {:?}", config.temperature_iteration);
        println!("3. Domain checks: {}", config.check_domain);
        println!(
            "4. Table file: {}",
            config.table_file.as_deref().unwrap_or("analytic fits")
        );
        println!("5. Use analytic fits");
        println!("6. Save");
        println!("7. Reset to defaults");
        println!("0. Back to main menu");

        let result = match get_choice("Enter your choice: ").as_str() {
            "1" => {
                let z = prompt_f64("Redshift", manager.config().redshift);
                manager.set_redshift(z)
            }
            "2" => {
                let policy = match manager.config().temperature_iteration {
                    TemperatureIteration::Fixed { .. } => TemperatureIteration::converged(),
                    TemperatureIteration::Converged { .. } => TemperatureIteration::default(),
                };
                manager.set_temperature_iteration(policy)
            }
            "3" => {
                let on = !manager.config().check_domain;
                manager.set_check_domain(on);
                Ok(())
            }
            "4" => {
                let path = get_choice("Path to the JSON table file: ");
                manager.set_table_file(&path)
            }
            "5" => {
                manager.clear_table_file();
                Ok(())
            }
            "6" => manager.save_config(),
            "7" => {
                manager.reset_to_defaults();
                Ok(())
            }
            "0" => break,
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("\x1b[31mError: {}\x1b[0m", e);
        }
    }
}
