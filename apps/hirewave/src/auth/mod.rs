//! One-time-code sign-in: the six-box code entry and the state machine around it.

pub mod flow;
pub mod otp_input;

pub use flow::{AuthBackend, EmailOutcome, FlowState, OtpFlow};
pub use otp_input::OtpInput;
