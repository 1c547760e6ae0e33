pub mod aws_clients;
pub mod config;
pub mod test_tools;
