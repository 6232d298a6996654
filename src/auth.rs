//! Bearer credential, session models, and sign-out subscriptions.

pub mod secret;
pub mod session;
pub mod sign_out;

pub use secret::*;
pub use session::*;
pub use sign_out::*;
