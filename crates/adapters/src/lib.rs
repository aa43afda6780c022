pub mod fs;
pub mod store;
pub mod token;

pub use fs::{ImageRootPaths, LocalFileProbe, WalkdirImageScanner};
pub use store::JsonTaskStore;
pub use token::Base64PathCodec;
