use crate::models::Trade;
use time::Date;

/// Capability for retrieving the trades booked against a reporting date.
///
/// This is the boundary to the external trading system. Implementations may
/// fail for any reason; callers treat every error the same way and retry.
pub trait TradeSource {
    /// Error type for source failures
    type Error: std::error::Error + Send + Sync + 'static;

    /// Retrieve all trades for the given local calendar date.
    fn get_trades(&self, date: Date) -> impl Future<Output = Result<Vec<Trade>, Self::Error>> + Send;
}

impl<T: TradeSource + ?Sized> TradeSource for &T {
    type Error = T::Error;

    fn get_trades(&self, date: Date) -> impl Future<Output = Result<Vec<Trade>, Self::Error>> + Send {
        T::get_trades(*self, date)
    }
}
