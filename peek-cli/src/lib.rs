pub mod interactive;
pub mod preview;
pub mod render;
