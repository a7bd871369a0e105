//! Width-polymorphic target pointers.
//!
//! The target may be 32- or 64-bit; every pointer-bearing [`crate::Value`]
//! carries its own width alongside the address rather than assuming the
//! host's. Parsing a `Pointer` into a native pointer is intentionally not
//! supported — on the client side these are opaque identifiers, never
//! dereferenced.

use crate::error::ProtocolError;

/// A target-side pointer: an address together with its byte width (4 or 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pointer {
    width: u8,
    address: u64,
}

impl Pointer {
    /// Construct a pointer, rejecting any width other than 4 or 8.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidPointerWidth`] if `width` is not 4 or 8.
    pub fn new(width: u8, address: u64) -> Result<Self, ProtocolError> {
        if width != 4 && width != 8 {
            return Err(ProtocolError::InvalidPointerWidth { width });
        }
        Ok(Self { width, address })
    }

    /// The pointer's declared byte width, either 4 or 8.
    #[must_use]
    pub fn width(&self) -> u8 {
        self.width
    }

    /// The pointer's numeric address.
    #[must_use]
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Decode a pointer's width byte and reversed-byte-order payload from
    /// `src`, advancing past both.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Truncated`] if `src` is too short, or
    /// [`ProtocolError::InvalidPointerWidth`] for a width other than 4 or 8.
    pub fn decode(src: &mut &[u8]) -> Result<Self, ProtocolError> {
        let width = take_byte(src)?;
        if width != 4 && width != 8 {
            return Err(ProtocolError::InvalidPointerWidth { width });
        }
        let raw = take_bytes(src, usize::from(width))?;
        // Wire bytes are the reverse of the host little-endian layout,
        // i.e. big-endian, regardless of host byte order.
        let mut buf = [0u8; 8];
        buf[8 - usize::from(width)..].copy_from_slice(raw);
        let address = u64::from_be_bytes(buf);
        Ok(Self { width, address })
    }

    /// Encode this pointer's width byte and big-endian address bytes to
    /// `dst`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Io`] on write failure.
    pub fn encode(&self, dst: &mut impl std::io::Write) -> Result<(), ProtocolError> {
        dst.write_all(&[self.width])?;
        let be = self.address.to_be_bytes();
        dst.write_all(&be[8 - usize::from(self.width)..])?;
        Ok(())
    }
}

pub(crate) fn take_byte(src: &mut &[u8]) -> Result<u8, ProtocolError> {
    let (first, rest) = src
        .split_first()
        .ok_or(ProtocolError::Truncated { expected: 1 })?;
    *src = rest;
    Ok(*first)
}

pub(crate) fn take_bytes<'a>(src: &mut &'a [u8], n: usize) -> Result<&'a [u8], ProtocolError> {
    if src.len() < n {
        return Err(ProtocolError::Truncated {
            expected: n - src.len(),
        });
    }
    let (taken, rest) = src.split_at(n);
    *src = rest;
    Ok(taken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_width() {
        assert!(Pointer::new(2, 0).is_err());
        assert!(Pointer::new(4, 0).is_ok());
        assert!(Pointer::new(8, 0).is_ok());
    }

    #[test]
    fn round_trips_deadbeef_width4() {
        let ptr = Pointer::new(4, 0xDEAD_BEEF).unwrap();
        let mut buf = Vec::new();
        ptr.encode(&mut buf).unwrap();
        assert_eq!(buf, [0x04, 0xDE, 0xAD, 0xBE, 0xEF]);

        let mut slice = &buf[..];
        let decoded = Pointer::decode(&mut slice).unwrap();
        assert_eq!(decoded, ptr);
        assert!(slice.is_empty());
    }
}
