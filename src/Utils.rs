/// JSON table files: the file-backed table source and its writer.
pub mod load_from_file;
/// prettytable output of RHS, temperatures and Jacobian blocks.
pub mod network_report;
