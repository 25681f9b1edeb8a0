pub mod carousel;
pub mod config;
pub mod error;
pub mod events;
pub mod presentation;
pub mod timer;
pub mod tasks {
    pub mod controller;
    pub mod input;
}

pub use carousel::Carousel;
pub use error::Error;
