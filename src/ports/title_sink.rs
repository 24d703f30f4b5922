//! TitleSink port - The host window title side channel.

use std::io;

/// Port for updating the title of the window hosting the timer.
pub trait TitleSink: Send + Sync {
    /// Replaces the window title.
    ///
    /// # Errors
    /// Returns the underlying I/O error; callers treat it as cosmetic.
    fn set_title(&self, title: &str) -> io::Result<()>;
}
