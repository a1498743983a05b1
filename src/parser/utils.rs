/*!
Checked reads over wire buffers. `bytes::Buf` panics on short reads; every
read here surfaces truncation as a malformed-attribute-list error instead.
*/
use crate::error::UpdateError;
use crate::models::{Asn, AsnLength};
use bytes::Buf;
use std::net::Ipv4Addr;

pub trait ReadUtils: Buf {
    fn has_n_remaining(&self, n: usize) -> Result<(), UpdateError> {
        match self.remaining() >= n {
            true => Ok(()),
            false => Err(UpdateError::Truncated(format!(
                "expected {n} more bytes but only {} remain",
                self.remaining()
            ))),
        }
    }

    fn read_u8(&mut self) -> Result<u8, UpdateError> {
        self.has_n_remaining(1)?;
        Ok(self.get_u8())
    }

    fn read_u16(&mut self) -> Result<u16, UpdateError> {
        self.has_n_remaining(2)?;
        Ok(self.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32, UpdateError> {
        self.has_n_remaining(4)?;
        Ok(self.get_u32())
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, UpdateError> {
        Ok(Ipv4Addr::from(self.read_u32()?))
    }

    fn read_asn(&mut self, width: AsnLength) -> Result<Asn, UpdateError> {
        match width {
            AsnLength::Bits16 => Ok(Asn::new_16bit(self.read_u16()?)),
            AsnLength::Bits32 => Ok(Asn::new_32bit(self.read_u32()?)),
        }
    }
}

// All types that implement Buf can now use the checked reads.
impl<T: Buf> ReadUtils for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_checked_reads() {
        let mut data = Bytes::from_static(&[0, 1, 0, 0, 0, 2]);
        assert_eq!(data.read_u16().unwrap(), 1);
        assert_eq!(data.read_u32().unwrap(), 2);
        let err = data.read_u8().unwrap_err();
        assert_eq!(err.notification(), (3, 2));
    }

    #[test]
    fn test_read_asn_widths() {
        let mut data = Bytes::from_static(&[0, 10, 0, 0, 0, 10]);
        assert_eq!(data.read_asn(AsnLength::Bits16).unwrap(), Asn::new_16bit(10));
        assert_eq!(
            data.read_asn(AsnLength::Bits32).unwrap(),
            Asn::new_32bit(10)
        );
    }
}
