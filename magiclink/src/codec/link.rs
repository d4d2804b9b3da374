//! Share links: reading the token out of a page address and writing a fresh
//! one back in.

use thiserror::Error;
use url::Url;

use super::token::encode;
use crate::model::Campaign;

/// The page address could not be used as a share link.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("page address is not a valid URL: {0}")]
    InvalidAddress(#[from] url::ParseError),
}

/// What the address fragment holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// No `#`, or nothing after it
    Absent,
    /// Raw, still-escaped token text after `#`
    Token(String),
}

/// Extract the share token from a page address.
pub fn fragment_of(page_address: &str) -> Result<Fragment, LinkError> {
    let url = Url::parse(page_address)?;

    Ok(match url.fragment() {
        Some(token) if !token.is_empty() => Fragment::Token(token.to_string()),
        _ => Fragment::Absent,
    })
}

/// Build a share link for `campaign` on top of the current page address.
///
/// Only origin and path are kept; any query or previous fragment is
/// replaced.
pub fn share_url(page_address: &str, campaign: &Campaign) -> Result<String, LinkError> {
    let mut url = Url::parse(page_address)?;
    url.set_query(None);
    url.set_fragment(Some(&encode(campaign)));

    Ok(url.into())
}
