pub mod ftp;
pub mod mastodon;
