pub mod order;
pub mod signing;
pub mod ticker;
pub mod transport;

pub use order::OrderClient;
pub use signing::{sign_request, SignatureHeaders};
pub use ticker::{MarketDataClient, TickerTask};
pub use transport::HttpTransport;

// bitFlyer Lightning API
// Docs: https://lightning.bitflyer.com/docs
pub const BITFLYER_API_BASE: &str = "https://api.bitflyer.com";
