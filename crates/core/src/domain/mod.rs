pub mod contract;
pub mod enhanced;
pub mod recommendation;
pub mod stock;
