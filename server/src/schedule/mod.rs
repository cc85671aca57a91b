mod event_queue;

pub use event_queue::{CallbackId, EventQueue};
