//! Message class markers (`REQ`/`REP`/`ERR`/`NFY`).
//!
//! These occupy the same leading-byte tag space as [`crate::Value`] and the
//! EOM marker (`0x10`-`0x13`), so the top-level item decoder
//! ([`crate::value::decode_item`]) returns a dedicated [`MessageClass`]
//! variant rather than folding it into `Value`.

use crate::error::ProtocolError;

/// The class of a message, carried as the first item after EOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    /// Client-to-target request.
    Req,
    /// Target-to-client reply to a request.
    Rep,
    /// Target-to-client error reply to a request.
    Err,
    /// Target-to-client unsolicited notification.
    Nfy,
}

impl MessageClass {
    pub(crate) const REQ_TAG: u8 = 0x10;
    pub(crate) const REP_TAG: u8 = 0x11;
    pub(crate) const ERR_TAG: u8 = 0x12;
    pub(crate) const NFY_TAG: u8 = 0x13;

    /// Decode a class marker from its wire tag byte.
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            Self::REQ_TAG => Some(Self::Req),
            Self::REP_TAG => Some(Self::Rep),
            Self::ERR_TAG => Some(Self::Err),
            Self::NFY_TAG => Some(Self::Nfy),
            _ => None,
        }
    }

    /// The wire tag byte for this class.
    #[must_use]
    pub fn to_tag(self) -> u8 {
        match self {
            Self::Req => Self::REQ_TAG,
            Self::Rep => Self::REP_TAG,
            Self::Err => Self::ERR_TAG,
            Self::Nfy => Self::NFY_TAG,
        }
    }

    /// Write this class marker to `dst`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Io`] on write failure.
    pub fn encode(self, dst: &mut impl std::io::Write) -> Result<(), ProtocolError> {
        dst.write_all(&[self.to_tag()])?;
        Ok(())
    }
}
