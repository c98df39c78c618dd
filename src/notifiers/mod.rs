// Notifier implementations
pub mod email;
pub mod traits;

pub use email::EmailNotifier;
pub use traits::{NotificationReceipt, Notifier};
