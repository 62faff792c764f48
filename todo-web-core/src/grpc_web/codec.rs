//! # gRPC-Web Framing
//!
//! gRPC-Web carries messages in length-prefixed frames:
//!
//! ```text
//! +------+----------------+-----------------+
//! | flag | length (u32 BE)| payload         |
//! +------+----------------+-----------------+
//! ```
//!
//! * A flag of `0x00` marks a **data** frame holding one encoded protobuf message.
//! * A flag with the high bit set (`0x80`) marks the **trailer** frame, whose payload is an
//!   HTTP/1-style header block (`grpc-status: 0\r\ngrpc-message: \r\n`).
//! * The low bit (`0x01`) marks a compressed payload. Compression is never negotiated by this
//!   client, so such frames are rejected.
//!
//! In the text format the whole framed body is base64 encoded. Servers are allowed to flush
//! several independently padded base64 chunks, so decoding splits the body at padding boundaries.
use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue};

/// Content type of the base64 wrapped wire format.
pub const GRPC_WEB_TEXT: &str = "application/grpc-web-text";
/// Content type of the binary wire format.
pub const GRPC_WEB_PROTO: &str = "application/grpc-web+proto";

const FRAME_HEADER_LEN: usize = 5;
const TRAILER_FLAG: u8 = 0x80;
const COMPRESSED_FLAG: u8 = 0x01;

/// How framed bodies travel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// `application/grpc-web-text`: frames are base64 encoded.
    #[default]
    Text,
    /// `application/grpc-web+proto`: frames are sent as raw bytes.
    Binary,
}

impl WireFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            WireFormat::Text => GRPC_WEB_TEXT,
            WireFormat::Binary => GRPC_WEB_PROTO,
        }
    }

    /// Resolves a wire format from a `content-type` header value.
    ///
    /// Parameters such as `; charset=utf-8` are ignored. A bare `application/grpc-web`
    /// is the binary format.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        match essence {
            GRPC_WEB_TEXT | "application/grpc-web-text+proto" => Some(WireFormat::Text),
            GRPC_WEB_PROTO | "application/grpc-web" => Some(WireFormat::Binary),
            _ => None,
        }
    }

    /// Wraps framed bytes for the wire.
    pub fn encode_body(self, framed: Bytes) -> Bytes {
        match self {
            WireFormat::Text => Bytes::from(STANDARD.encode(&framed)),
            WireFormat::Binary => framed,
        }
    }

    /// Unwraps a body received from the wire into framed bytes.
    pub fn decode_body(self, body: Bytes) -> Result<Bytes, base64::DecodeError> {
        match self {
            WireFormat::Text => decode_text(&body),
            WireFormat::Binary => Ok(body),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("Truncated frame: expected {expected} bytes but only {found} remain")]
    Truncated { expected: usize, found: usize },
    #[error("Compressed frames are not supported")]
    Compressed,
    #[error("Frame of {size} bytes exceeds the limit of {limit} bytes")]
    Oversized { size: usize, limit: usize },
    #[error("Invalid trailer line '{0}'")]
    InvalidTrailer(String),
}

/// A single decoded gRPC-Web frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Data(Bytes),
    Trailers(HeaderMap),
}

/// Prefixes an encoded message with the data frame header.
pub fn encode_frame(message: &[u8]) -> Result<Bytes, FrameError> {
    encode_with_flag(0, message)
}

/// Encodes a trailer block (`name:value\r\n` per entry) into a trailer frame.
pub fn encode_trailer_frame(trailers: &HeaderMap) -> Result<Bytes, FrameError> {
    let mut block = BytesMut::new();
    for (name, value) in trailers {
        block.put_slice(name.as_str().as_bytes());
        block.put_u8(b':');
        block.put_slice(value.as_bytes());
        block.put_slice(b"\r\n");
    }

    encode_with_flag(TRAILER_FLAG, &block)
}

fn encode_with_flag(flag: u8, payload: &[u8]) -> Result<Bytes, FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::Oversized {
        size: payload.len(),
        limit: u32::MAX as usize,
    })?;

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
    buf.put_u8(flag);
    buf.put_u32(len);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Splits a framed body into its data and trailer frames, in wire order.
///
/// A data frame whose declared length exceeds `max_message_size` is rejected from its header,
/// before its payload is looked at.
pub fn decode_frames(mut buf: Bytes, max_message_size: usize) -> Result<Vec<Frame>, FrameError> {
    let mut frames = Vec::new();

    while buf.has_remaining() {
        if buf.remaining() < FRAME_HEADER_LEN {
            return Err(FrameError::Truncated {
                expected: FRAME_HEADER_LEN,
                found: buf.remaining(),
            });
        }

        let flag = buf.get_u8();
        let len = buf.get_u32() as usize;

        if flag & COMPRESSED_FLAG != 0 {
            return Err(FrameError::Compressed);
        }

        if flag & TRAILER_FLAG == 0 && len > max_message_size {
            return Err(FrameError::Oversized {
                size: len,
                limit: max_message_size,
            });
        }

        if buf.remaining() < len {
            return Err(FrameError::Truncated {
                expected: len,
                found: buf.remaining(),
            });
        }

        let payload = buf.split_to(len);

        if flag & TRAILER_FLAG != 0 {
            frames.push(Frame::Trailers(parse_trailers(&payload)?));
        } else {
            frames.push(Frame::Data(payload));
        }
    }

    Ok(frames)
}

fn parse_trailers(block: &[u8]) -> Result<HeaderMap, FrameError> {
    let text = std::str::from_utf8(block)
        .map_err(|_| FrameError::InvalidTrailer(String::from_utf8_lossy(block).into_owned()))?;

    let mut trailers = HeaderMap::new();

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let invalid = || FrameError::InvalidTrailer(line.to_string());

        let (name, value) = line.split_once(':').ok_or_else(invalid)?;
        let name = HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes())
            .map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;

        trailers.append(name, value);
    }

    Ok(trailers)
}

fn decode_text(body: &[u8]) -> Result<Bytes, base64::DecodeError> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let mut out = Vec::with_capacity(compact.len() / 4 * 3);
    let mut start = 0;

    for (i, quad) in compact.chunks(4).enumerate() {
        // A padded quad closes one independently encoded chunk.
        if quad.contains(&b'=') {
            let end = i * 4 + quad.len();
            STANDARD.decode_vec(&compact[start..end], &mut out)?;
            start = end;
        }
    }

    if start < compact.len() {
        STANDARD.decode_vec(&compact[start..], &mut out)?;
    }

    Ok(Bytes::from(out))
}
