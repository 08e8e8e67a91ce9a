//! Length-prefixed framing.
//!
//! Every message on the wire is `[u32 big-endian length][payload]`.

use std::io::{self, Read};

use thiserror::Error;

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("payload of {len} bytes exceeds the {max} byte frame limit")]
    TooLarge { len: usize, max: usize },
}

impl From<FrameError> for io::Error {
    fn from(err: FrameError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

/// Frame the payload with a big-endian length prefix.
pub fn frame_payload(payload: &[u8], max_size: usize) -> Result<Vec<u8>, FrameError> {
    let too_large = FrameError::TooLarge {
        len: payload.len(),
        max: max_size,
    };
    if payload.len() > max_size {
        return Err(too_large);
    }
    let len = u32::try_from(payload.len()).map_err(|_| too_large)?;
    let mut framed = Vec::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    framed.extend(len.to_be_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Read one frame from `reader`.
///
/// Returns `Ok(None)` when the stream ends cleanly before a length prefix.
/// A stream ending mid-frame is reported as `UnexpectedEof`.
pub fn read_frame<R: Read>(reader: &mut R, max_size: usize) -> io::Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; LENGTH_PREFIX_LEN];
    let mut filled = 0;
    while filled < LENGTH_PREFIX_LEN {
        match reader.read(&mut len_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_size {
        return Err(FrameError::TooLarge { len, max: max_size }.into());
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    fn frame_payload_enforces_limit() {
        let err = frame_payload(&[0u8; 32], 16).expect_err("payload above limit");
        assert_eq!(err, FrameError::TooLarge { len: 32, max: 16 });
    }

    #[rstest]
    fn frame_payload_prefixes_length() {
        let payload = [1u8, 2, 3];
        let framed = frame_payload(&payload, 16).expect("payload fits frame");
        assert_eq!(&framed[..4], &3u32.to_be_bytes());
        assert_eq!(&framed[4..], payload);
    }

    #[rstest]
    fn empty_payload_is_a_bare_prefix() {
        let framed = frame_payload(&[], 16).expect("empty payload fits");
        assert_eq!(framed, vec![0, 0, 0, 0]);
    }

    #[rstest]
    fn read_frame_consumes_consecutive_frames() {
        let mut wire = frame_payload(b"first", 64).expect("frame");
        wire.extend(frame_payload(b"second", 64).expect("frame"));
        let mut cursor = Cursor::new(wire);
        assert_eq!(read_frame(&mut cursor, 64).unwrap(), Some(b"first".to_vec()));
        assert_eq!(read_frame(&mut cursor, 64).unwrap(), Some(b"second".to_vec()));
        assert_eq!(read_frame(&mut cursor, 64).unwrap(), None);
    }

    #[rstest]
    fn read_frame_rejects_truncated_prefix() {
        let mut cursor = Cursor::new(vec![0u8, 0]);
        let err = read_frame(&mut cursor, 64).expect_err("truncated prefix");
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[rstest]
    fn read_frame_rejects_oversized_length() {
        let mut cursor = Cursor::new(1024u32.to_be_bytes().to_vec());
        let err = read_frame(&mut cursor, 64).expect_err("length above limit");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
