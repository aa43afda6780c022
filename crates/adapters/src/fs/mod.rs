mod paths;
mod probe;
mod scanner;

pub use paths::ImageRootPaths;
pub use probe::LocalFileProbe;
pub use scanner::WalkdirImageScanner;

pub(crate) use paths::resolve_non_strict;
