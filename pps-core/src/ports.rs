mod trade;
mod zone;

pub use trade::TradeSource;
pub use zone::{LocalTime, ZoneRules};
