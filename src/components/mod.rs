pub mod progress_bar;
pub mod uploader;

pub use uploader::mount;
