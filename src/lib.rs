pub mod catalog;
pub mod config;
pub mod driver;
pub mod events;
pub mod gesture;
pub mod layout;
pub mod sentinel;
pub mod view;
pub mod tasks {
    pub mod carousel;
    pub mod fetcher;
}
