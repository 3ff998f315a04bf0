//! Layouts of the accounts the echo program writes.

use {
    crate::error::DecodingError,
    nom::{
        combinator::{map, rest},
        number::complete::{le_u64, le_u8},
        sequence::tuple,
        IResult,
    },
};

/// `bump_seed: u8` followed by `buffer_seed: u64`.
pub const AUTHORIZED_BUFFER_HEADER_LEN: usize = 9;

/// Text of a plain echo buffer.
///
/// Any zero filled tail is treated as unused allocation and dropped, so text
/// that itself ends in NUL bytes is not preserved. Compare raw account bytes
/// when that matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoBuffer {
    pub text: String,
}

impl EchoBuffer {
    pub fn unpack(input: &[u8]) -> Result<Self, DecodingError> {
        Ok(Self {
            text: ascii_text(input)?.to_string(),
        })
    }
}

/// Program-owned buffer at an `["authority", authority, buffer_seed]` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedBuffer {
    pub bump_seed: u8,
    pub buffer_seed: u64,
    pub data: Vec<u8>,
}

impl AuthorizedBuffer {
    pub fn unpack(input: &[u8]) -> Result<Self, DecodingError> {
        parse_authorized_buffer(input)
            .map(|(_, buffer)| buffer)
            .map_err(|_| DecodingError::AccountDataTooShort {
                expected: AUTHORIZED_BUFFER_HEADER_LEN,
                actual: input.len(),
            })
    }

    /// Echoed text after the header, empty until an authorized echo lands.
    pub fn text(&self) -> Result<&str, DecodingError> {
        ascii_text(&self.data)
    }
}

fn parse_authorized_buffer(input: &[u8]) -> IResult<&[u8], AuthorizedBuffer> {
    map(
        tuple((le_u8, le_u64, rest)),
        |(bump_seed, buffer_seed, data): (u8, u64, &[u8])| AuthorizedBuffer {
            bump_seed,
            buffer_seed,
            data: data.to_vec(),
        },
    )(input)
}

fn ascii_text(input: &[u8]) -> Result<&str, DecodingError> {
    let end = input
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |last| last + 1);
    let text = &input[..end];
    if !text.is_ascii() {
        return Err(DecodingError::NonAsciiData);
    }
    std::str::from_utf8(text).map_err(|_| DecodingError::NonAsciiData)
}
