pub mod cnf;
pub mod sources;
