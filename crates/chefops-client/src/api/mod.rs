//! API endpoint modules.

mod channels;
mod github;
mod packages;

pub use channels::ChannelsApi;
pub use github::GithubApi;
pub use packages::PackageIndexApi;
