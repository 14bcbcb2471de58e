/// Runnable demonstrations of the network, selected by task number.
pub mod network_examples;
