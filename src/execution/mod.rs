// Order sizing and the purchase workflow
pub mod purchase;
pub mod sizing;

pub use purchase::{InvocationResponse, PurchaseSettings, PurchaseWorkflow};
pub use sizing::{compute_quantity, round_price};
