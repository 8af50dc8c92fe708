pub mod api;
pub mod error;
pub mod session;

pub use api::{HttpMarketApi, MarketDataSource};
pub use error::ChartError;
pub use session::{DataSource, FetchKind, FetchSessionManager, SessionTicket};
