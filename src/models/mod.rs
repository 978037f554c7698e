pub mod push;
pub mod visit;

pub use push::{PushEnvelope, PushMessage};
pub use visit::Visit;
