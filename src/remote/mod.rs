pub mod error;
mod propfind;
pub mod store;
pub mod webdav;

pub use error::RemoteUnavailable;
pub use store::{is_station_file, RemoteItem, RemoteStore};
pub use webdav::WebDavClient;
