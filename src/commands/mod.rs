mod cancel;
mod download;
mod help;
mod start;

pub use cancel::cancel;
pub use download::download;
pub use help::help;
pub use start::start;
