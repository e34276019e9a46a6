pub mod email;
pub mod error;
pub mod health;
pub mod message;
pub mod response;
pub mod severity;
pub mod sns;
pub mod template;
pub mod validation;
