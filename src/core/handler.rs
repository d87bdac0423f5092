//! Item handler contract.

use super::AppResult;

/// Receives items from a [`DispatchEngine`](super::DispatchEngine), one at a
/// time, in queue order.
///
/// An `Err` or a panic is caught by the engine, reported, and the item is
/// treated as consumed. Handlers run outside the engine lock and may enqueue
/// more work on the engine that called them, but must not block on that
/// engine's flush.
///
/// Any `Fn(T) -> AppResult<()>` closure is a handler.
///
/// # Example
///
/// ```rust,ignore
/// use priority_dispatch::core::{AppResult, ItemHandler};
///
/// struct Printer;
///
/// impl ItemHandler<String> for Printer {
///     fn handle(&self, item: String) -> AppResult<()> {
///         println!("{item}");
///         Ok(())
///     }
/// }
/// ```
pub trait ItemHandler<T>: Send + Sync + 'static {
    /// Deliver one item.
    ///
    /// # Errors
    ///
    /// Any error is logged by the engine and does not stop delivery of the
    /// items behind it.
    fn handle(&self, item: T) -> AppResult<()>;
}

impl<T, F> ItemHandler<T> for F
where
    F: Fn(T) -> AppResult<()> + Send + Sync + 'static,
{
    fn handle(&self, item: T) -> AppResult<()> {
        self(item)
    }
}
