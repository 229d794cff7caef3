mod callback_received;
mod link_received;

pub use callback_received::callback_received;
pub use link_received::link_received;
