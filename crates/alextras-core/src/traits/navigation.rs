//! Navigation source abstraction.

use futures::stream::BoxStream;

/// Stream of raw locations observed by a navigation source.
pub type NavigationStream = BoxStream<'static, String>;

/// Something that reports the page's current location whenever it may have changed.
///
/// On the primary site this is driven by document mutations, so most
/// reported locations are unchanged; the watcher filters them. Test doubles
/// synthesize locations directly.
pub trait NavigationSource: Send + 'static {
    /// Subscribe to location observations. Ends when the page goes away.
    fn subscribe(&mut self) -> NavigationStream;
}
