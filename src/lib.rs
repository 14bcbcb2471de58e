#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Network;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod settings;
