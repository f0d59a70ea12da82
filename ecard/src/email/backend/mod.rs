//! Email delivery backends

pub mod console;
pub mod resend;
pub mod smtp;
