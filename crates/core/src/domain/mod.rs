pub mod contract;
pub mod news;
pub mod outlook;
pub mod recommendation;
pub mod stock;
