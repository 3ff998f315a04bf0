use {solana_program::pubkey::MAX_SEED_LEN, thiserror::Error};

/// Rejected input while building instruction data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("echo data must be ASCII, found non-ASCII byte at offset {0}")]
    NonAscii(usize),

    #[error("echo data is {0} bytes, which overflows the u32 length prefix")]
    LengthOverflow(usize),

    #[error("buffer size must be greater than zero")]
    ZeroBufferSize,
}

/// Failures of program address derivation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("seed {index} is {len} bytes, the maximum is {max}", max = MAX_SEED_LEN)]
    SeedTooLong { index: usize, len: usize },

    #[error("{given} seeds given, the maximum is {max}")]
    TooManySeeds { given: usize, max: usize },

    #[error("derived address lies on the ed25519 curve")]
    OnCurve,

    #[error("no bump seed produced an off-curve address")]
    NoValidBump,
}

/// Malformed instruction data or account data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodingError {
    #[error("unknown instruction discriminant {0}")]
    UnknownDiscriminant(u8),

    #[error("invalid instruction data")]
    InvalidInstructionData,

    #[error("expected an echo instruction")]
    UnexpectedInstruction,

    #[error("account data is {actual} bytes, expected at least {expected}")]
    AccountDataTooShort { expected: usize, actual: usize },

    #[error("account data is not ASCII text")]
    NonAsciiData,
}

/// Any failure of the interface crate, for helpers spanning several steps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EchoError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Decoding(#[from] DecodingError),
}
