//! One [`CloudBrowser`](crate::CloudBrowser) per storage provider.

mod b2;
mod dropbox;
mod google_drive;
mod onedrive;

pub use b2::B2Browser;
pub use dropbox::DropboxBrowser;
pub use google_drive::GoogleDriveBrowser;
pub use onedrive::OneDriveBrowser;
