mod waitlist_email;
mod waitlist_entry;

pub use waitlist_email::{EmailError, WaitlistEmail};
pub use waitlist_entry::{NewWaitlistEntry, WaitlistEntry};
