//! Core types for the formrelay contact-form relay.
//!
//! A [`FormInput`] is the raw, untrusted body of a form post. Converting it
//! into a [`Submission`] is the only validation step: `name`, `company` and
//! `email` must be non-empty, `phone` is optional. A [`MessageTemplate`]
//! renders a submission into the subject and HTML body that every delivery
//! provider sends verbatim.

pub mod placeholder;
pub mod submission;
pub mod template;

pub use placeholder::is_placeholder;
pub use submission::{FormInput, Submission, ValidationError};
pub use template::{MessageTemplate, PHONE_NOT_PROVIDED};
