//! Campaign codec.
//!
//! The whole campaign travels in the page address fragment:
//!
//! ```text
//! Campaign → JSON → base64 → percent-escape → https://host/path#<token>
//! ```

pub mod link;
pub mod token;

pub use link::{fragment_of, share_url, Fragment, LinkError};
pub use token::{decode, encode, DecodeError};
