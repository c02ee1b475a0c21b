pub mod fetch_controller;

pub use fetch_controller::{ChannelObserver, FetchController, FetchEvent, FetchObserver};
