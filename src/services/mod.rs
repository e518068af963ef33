// Services module - external collaborators wrapped behind small interfaces

pub mod email;

pub use email::{EmailConfig, EmailService};
