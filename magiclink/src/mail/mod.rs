//! Mail action builder.
//!
//! Turns a campaign target into a `mailto:` URI that opens the reader's
//! local mail client with recipients, subject and body filled in. Nothing
//! here touches the network or the OS.

pub mod mailto;
pub mod recipients;

pub use mailto::{
    build_mail_actions, build_mailto, resolve, resolve_body, resolve_subject, MailAction,
    UNNAMED_TARGET,
};
pub use recipients::{is_group, normalize_recipients, split_recipients};
