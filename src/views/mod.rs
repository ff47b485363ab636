//! Terminal renderings of the store. Each view holds a store handle, subscribes
//! to it, and rebuilds its output from store queries on every notification.
mod list;
mod preview;

pub use list::ListView;
pub use preview::{PreviewView, PHONE_WIDTH};
