pub mod dataset;
pub mod publish;
pub mod train;
pub mod types;
