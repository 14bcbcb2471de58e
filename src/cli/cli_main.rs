use super::cli_settings::settings_menu;
use crate::Examples::network_examples::{network_examples, primordial_strip};
use crate::Network::jacobian_assembler::SparseJacobian;
use crate::Network::network_api::{PrimordialNetwork, ScaleVector};
use crate::Network::network_error::ChemistryError;
use crate::Network::species::{MAX_NCELLS, NCHEM};
use crate::Utils::network_report::{jacobian_table, rhs_table, temperature_table};
use crate::settings::ConfigManager;
use std::io::{self, Write};

pub fn run_interactive_menu() {
    let mut manager = ConfigManager::new();
    loop {
        show_main_menu();
        let choice = get_user_input();

        let result = match choice.trim() {
            "1" => evaluate_cell(&manager),
            "2" => cooling_curve(&manager),
            "3" => show_jacobian(&manager),
            "4" => {
                settings_menu(&mut manager);
                Ok(())
            }
            "5" => {
                examples_menu();
                Ok(())
            }
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("\x1b[31mError: {} (status {})\x1b[0m", e, e.status_code());
        }
    }
}
/* colors
Blue (\x1b[34m) - Welcome header text
Yellow (\x1b[33m) - Menu options
Cyan (\x1b[36m) - prompts
Red (\x1b[31m) - errors
*/
fn show_main_menu() {
    println!("\x1b[34m\n PrimoChem: primordial H/H2/He chemistry network\n \x1b[0m");
    println!("\x1b[33m1. Evaluate one cell\x1b[0m");
    println!("\x1b[33m2. Cooling curve\x1b[0m");
    println!("\x1b[33m3. Jacobian of one cell\x1b[0m");
    println!("\x1b[33m4. Settings\x1b[0m");
    println!("\x1b[33m5. Examples\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    io::stdout().flush().unwrap();
}

fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("1. One cell at 1000 K");
        println!("2. Cooling curve");
        println!("3. Scaled Jacobian");
        println!("4. Tables through a JSON file");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        io::stdout().flush().unwrap();

        match get_user_input().trim().parse::<usize>() {
            Ok(0) => break,
            Ok(n) if n <= 4 => network_examples(n - 1),
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

pub(crate) fn get_user_input() -> String {
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .expect("Failed to read input");
    input
}

pub(crate) fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("\x1b[36m{} [{}]: \x1b[0m", prompt, default);
    io::stdout().flush().unwrap();
    let input = get_user_input();
    let input = input.trim();
    if input.is_empty() {
        return default;
    }
    input.parse().unwrap_or_else(|_| {
        println!("'{}' is not a number, using {}", input, default);
        default
    })
}

fn evaluate_cell(manager: &ConfigManager) -> Result<(), ChemistryError> {
    let network = PrimordialNetwork::from_config(manager.config().clone())?;
    let t = prompt_f64("Temperature, K", 1000.0);
    let y = primordial_strip(&network, &[t])?;
    let mut ctx = network.new_context(1, ScaleVector::unit(1))?;
    network.set_extra_variables(&mut ctx, &y)?;
    let mut ydot = vec![0.0; NCHEM];
    network.rhs(&y, &mut ydot, &mut ctx)?;
    println!("T = {:.3} K", ctx.temperatures()[0]);
    rhs_table(&y, &ydot, 0).printstd();
    Ok(())
}

fn cooling_curve(manager: &ConfigManager) -> Result<(), ChemistryError> {
    let network = PrimordialNetwork::from_config(manager.config().clone())?;
    let t_lo = prompt_f64("Lowest temperature, K", 10.0);
    let t_hi = prompt_f64("Highest temperature, K", 1e5);
    let temperatures = sweep_temperatures(t_lo, t_hi, prompt_f64("Number of cells", 12.0));
    let n = temperatures.len();
    let y = primordial_strip(&network, &temperatures)?;
    let mut ctx = network.new_context(n, ScaleVector::unit(n))?;
    network.set_extra_variables(&mut ctx, &y)?;
    let mut ydot = vec![0.0; y.len()];
    network.rhs(&y, &mut ydot, &mut ctx)?;
    temperature_table(ctx.temperatures(), &ydot).printstd();
    Ok(())
}

fn show_jacobian(manager: &ConfigManager) -> Result<(), ChemistryError> {
    let network = PrimordialNetwork::from_config(manager.config().clone())?;
    let t = prompt_f64("Temperature, K", 1000.0);
    let y = primordial_strip(&network, &[t])?;
    let scaled = matches!(
        get_choice("Scale with |y| (y/n)? ").as_str(),
        "y" | "Y"
    );
    let scale = if scaled {
        ScaleVector::from_state(&y)
    } else {
        ScaleVector::unit(1)
    };
    let y_scaled = scale.to_scaled(&y);
    let mut ctx = network.new_context(1, scale)?;
    network.set_extra_variables(&mut ctx, &y)?;
    let mut jac = SparseJacobian::new(1);
    network.jacobian(&y_scaled, &mut jac, &mut ctx)?;
    jacobian_table(&jac, 0).printstd();
    Ok(())
}

/// Log-spaced temperatures; the cell count is clamped to `[2, MAX_NCELLS]`.
fn sweep_temperatures(t_lo: f64, t_hi: f64, cells: f64) -> Vec<f64> {
    let n = cells.max(2.0).min(MAX_NCELLS as f64) as usize;
    (0..n)
        .map(|i| t_lo * (t_hi / t_lo).powf(i as f64 / (n - 1) as f64))
        .collect()
}

pub(crate) fn get_choice(prompt: &str) -> String {
    print!("\x1b[36m{}\x1b[0m", prompt);
    io::stdout().flush().unwrap();
    get_user_input().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sweep_cell_count_is_clamped() {
        assert_eq!(sweep_temperatures(10.0, 1e5, f64::INFINITY).len(), MAX_NCELLS);
        assert_eq!(sweep_temperatures(10.0, 1e5, 1e12).len(), MAX_NCELLS);
        assert_eq!(sweep_temperatures(10.0, 1e5, f64::NAN).len(), 2);
        assert_eq!(sweep_temperatures(10.0, 1e5, -3.0).len(), 2);
        let sweep = sweep_temperatures(10.0, 1e5, 5.0);
        assert_eq!(sweep.len(), 5);
        assert_relative_eq!(sweep[0], 10.0);
        assert_relative_eq!(sweep[2], 1e3, max_relative = 1e-12);
        assert_relative_eq!(sweep[4], 1e5, max_relative = 1e-12);
    }
}
