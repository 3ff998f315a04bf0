use {
    crate::{
        error::{DecodingError, EchoError, EncodingError},
        pda,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    num_enum::{IntoPrimitive, TryFromPrimitive},
    solana_program::{
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_program,
    },
};

/// Instructions understood by the echo program.
///
/// The borsh encoding is the wire format: one discriminant byte (the variant
/// index), then the fields in order. Integers are little-endian and byte
/// strings carry a `u32` length prefix.
#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq, Eq, Clone)]
pub enum EchoInstruction {
    /// Copy `data` into a zeroed buffer account.
    ///
    /// # Account references
    ///   0. `[WRITE]` Echo buffer, allocated and owned by the program.
    Echo {
        /// ASCII text to store.
        data: Vec<u8>,
    },

    /// Create an authorized buffer at the program address derived from
    /// `["authority", authority, buffer_seed]`.
    ///
    /// # Account references
    ///   0. `[WRITE]` Authorized buffer (PDA), not yet created.
    ///   1. `[SIGNER]` Authority, also funds the new account.
    ///   2. `[]` System program for CPI.
    InitializeAuthorizedEcho {
        /// Little-endian bytes of this value are the last derivation seed.
        buffer_seed: u64,

        /// Account size in bytes, including the 9 byte header.
        buffer_size: u64,
    },

    /// Write `data` into an authorized buffer.
    ///
    /// # Account references
    ///   0. `[WRITE]` Authorized buffer (PDA).
    ///   1. `[SIGNER]` Authority the buffer was derived from.
    AuthorizedEcho { data: Vec<u8> },

    InitializeVendingMachineEcho { price: u64, buffer_size: u64 },

    VendingMachineEcho { data: Vec<u8> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum EchoTag {
    Echo = 0,
    InitializeAuthorizedEcho = 1,
    AuthorizedEcho = 2,
    InitializeVendingMachineEcho = 3,
    VendingMachineEcho = 4,
}

impl EchoInstruction {
    pub fn tag(&self) -> EchoTag {
        match self {
            Self::Echo { .. } => EchoTag::Echo,
            Self::InitializeAuthorizedEcho { .. } => EchoTag::InitializeAuthorizedEcho,
            Self::AuthorizedEcho { .. } => EchoTag::AuthorizedEcho,
            Self::InitializeVendingMachineEcho { .. } => EchoTag::InitializeVendingMachineEcho,
            Self::VendingMachineEcho { .. } => EchoTag::VendingMachineEcho,
        }
    }

    /// Serialize into instruction data.
    pub fn pack(&self) -> Result<Vec<u8>, EncodingError> {
        match self {
            Self::Echo { data }
            | Self::AuthorizedEcho { data }
            | Self::VendingMachineEcho { data } => {
                length_prefix(data.len())?;
            }
            Self::InitializeAuthorizedEcho { buffer_size, .. }
            | Self::InitializeVendingMachineEcho { buffer_size, .. } => {
                if *buffer_size == 0 {
                    return Err(EncodingError::ZeroBufferSize);
                }
            }
        }
        borsh::to_vec(self).map_err(|_| EncodingError::LengthOverflow(self.payload_len()))
    }

    /// Parse instruction data. The whole input must be consumed.
    pub fn unpack(input: &[u8]) -> Result<Self, DecodingError> {
        let (&tag, _) = input
            .split_first()
            .ok_or(DecodingError::InvalidInstructionData)?;
        EchoTag::try_from(tag).map_err(|_| DecodingError::UnknownDiscriminant(tag))?;

        Self::try_from_slice(input).map_err(|_| DecodingError::InvalidInstructionData)
    }

    fn payload_len(&self) -> usize {
        match self {
            Self::Echo { data }
            | Self::AuthorizedEcho { data }
            | Self::VendingMachineEcho { data } => data.len(),
            _ => 0,
        }
    }
}

/// Parameters of the echo instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoParams {
    pub program_id: Pubkey,
    pub echo_buffer: Pubkey,
    pub data: String,
}

/// Build an `Echo` instruction writing `params.data` into `params.echo_buffer`.
pub fn echo(params: &EchoParams) -> Result<Instruction, EncodingError> {
    let data = EchoInstruction::Echo {
        data: ascii_bytes(&params.data)?,
    }
    .pack()?;

    Ok(Instruction {
        program_id: params.program_id,
        accounts: vec![AccountMeta::new(params.echo_buffer, false)],
        data,
    })
}

pub fn encode_echo(
    program_id: &Pubkey,
    echo_buffer: &Pubkey,
    data: &str,
) -> Result<Instruction, EncodingError> {
    echo(&EchoParams {
        program_id: *program_id,
        echo_buffer: *echo_buffer,
        data: data.to_string(),
    })
}

/// Parameters of the initialize authorized echo instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedBufferParams {
    /// Expected to be the address returned by
    /// [`pda::find_authorized_buffer_address`] for the same authority and
    /// `buffer_seed`, otherwise the program rejects it.
    pub authorized_buffer: Pubkey,
    pub authority: Pubkey,
    pub program_id: Pubkey,
    pub buffer_seed: u64,
    pub buffer_size: u64,
}

/// Build an `InitializeAuthorizedEcho` instruction.
pub fn initialize_authorized_buffer(
    params: &AuthorizedBufferParams,
) -> Result<Instruction, EncodingError> {
    let data = EchoInstruction::InitializeAuthorizedEcho {
        buffer_seed: params.buffer_seed,
        buffer_size: params.buffer_size,
    }
    .pack()?;

    Ok(Instruction {
        program_id: params.program_id,
        accounts: vec![
            AccountMeta::new(params.authorized_buffer, false),
            AccountMeta::new_readonly(params.authority, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    })
}

pub fn encode_initialize_authorized_buffer(
    authorized_buffer: &Pubkey,
    authority: &Pubkey,
    program_id: &Pubkey,
    buffer_seed: u64,
    buffer_size: u64,
) -> Result<Instruction, EncodingError> {
    initialize_authorized_buffer(&AuthorizedBufferParams {
        authorized_buffer: *authorized_buffer,
        authority: *authority,
        program_id: *program_id,
        buffer_seed,
        buffer_size,
    })
}

/// Derive the authorized buffer of `authority` for `buffer_seed` and build the
/// instruction creating it. Returns the instruction, the buffer and its bump.
pub fn initialize_derived_authorized_buffer(
    authority: &Pubkey,
    program_id: &Pubkey,
    buffer_seed: u64,
    buffer_size: u64,
) -> Result<(Instruction, Pubkey, u8), EchoError> {
    let (authorized_buffer, bump_seed) =
        pda::find_authorized_buffer_address(authority, buffer_seed, program_id)?;
    let instruction = initialize_authorized_buffer(&AuthorizedBufferParams {
        authorized_buffer,
        authority: *authority,
        program_id: *program_id,
        buffer_seed,
        buffer_size,
    })?;
    Ok((instruction, authorized_buffer, bump_seed))
}

/// Build an `AuthorizedEcho` instruction.
pub fn authorized_echo(
    authorized_buffer: &Pubkey,
    authority: &Pubkey,
    program_id: &Pubkey,
    data: &str,
) -> Result<Instruction, EncodingError> {
    let data = EchoInstruction::AuthorizedEcho {
        data: ascii_bytes(data)?,
    }
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authorized_buffer, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data,
    })
}

/// Recover the text carried by `Echo` instruction data.
pub fn decode_echo(input: &[u8]) -> Result<String, DecodingError> {
    match EchoInstruction::unpack(input)? {
        EchoInstruction::Echo { data } => {
            String::from_utf8(data).map_err(|_| DecodingError::InvalidInstructionData)
        }
        _ => Err(DecodingError::UnexpectedInstruction),
    }
}

fn ascii_bytes(data: &str) -> Result<Vec<u8>, EncodingError> {
    if let Some(offset) = data.bytes().position(|b| !b.is_ascii()) {
        return Err(EncodingError::NonAscii(offset));
    }
    length_prefix(data.len())?;
    Ok(data.as_bytes().to_vec())
}

fn length_prefix(len: usize) -> Result<u32, EncodingError> {
    u32::try_from(len).map_err(|_| EncodingError::LengthOverflow(len))
}

#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*};

    fn echo_params(data: &str) -> EchoParams {
        EchoParams {
            program_id: Pubkey::new_unique(),
            echo_buffer: Pubkey::new_unique(),
            data: data.to_string(),
        }
    }

    #[test]
    fn echo_hello_layout() {
        let params = echo_params("hello");
        let ix = echo(&params).unwrap();

        assert_eq!(
            ix.data,
            vec![0x00, 0x05, 0x00, 0x00, 0x00, b'h', b'e', b'l', b'l', b'o']
        );
        assert_eq!(ix.program_id, params.program_id);
        assert_eq!(ix.accounts, vec![AccountMeta::new(params.echo_buffer, false)]);
        assert!(!ix.accounts[0].is_signer);
        assert!(ix.accounts[0].is_writable);
    }

    #[test]
    fn echo_empty_string() {
        let ix = echo(&echo_params("")).unwrap();
        assert_eq!(ix.data, vec![0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn echo_rejects_non_ascii() {
        assert_eq!(
            echo(&echo_params("héllo")).unwrap_err(),
            EncodingError::NonAscii(1)
        );
    }

    #[test]
    fn length_prefix_overflow() {
        assert_eq!(length_prefix(u32::MAX as usize), Ok(u32::MAX));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(
            length_prefix(u32::MAX as usize + 1),
            Err(EncodingError::LengthOverflow(u32::MAX as usize + 1))
        );
    }

    #[test]
    fn initialize_authorized_buffer_layout() {
        let buffer = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let program_id = Pubkey::new_unique();

        let ix = encode_initialize_authorized_buffer(
            &buffer,
            &authority,
            &program_id,
            0x0102030405060708,
            32,
        )
        .unwrap();

        assert_eq!(
            ix.data,
            vec![
                0x01, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x20, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00,
            ]
        );
        assert_eq!(
            ix.accounts,
            vec![
                AccountMeta {
                    pubkey: buffer,
                    is_signer: false,
                    is_writable: true,
                },
                AccountMeta {
                    pubkey: authority,
                    is_signer: true,
                    is_writable: false,
                },
                AccountMeta {
                    pubkey: system_program::ID,
                    is_signer: false,
                    is_writable: false,
                },
            ]
        );
    }

    #[test]
    fn initialize_authorized_buffer_rejects_zero_size() {
        let key = Pubkey::new_unique();
        assert_eq!(
            encode_initialize_authorized_buffer(&key, &key, &key, 7, 0).unwrap_err(),
            EncodingError::ZeroBufferSize
        );
    }

    #[test]
    fn encode_echo_matches_params_form() {
        let params = echo_params("hello");
        assert_eq!(
            encode_echo(&params.program_id, &params.echo_buffer, "hello").unwrap(),
            echo(&params).unwrap()
        );
        assert_eq!(
            encode_echo(&params.program_id, &params.echo_buffer, "\u{e9}").unwrap_err(),
            EncodingError::NonAscii(0)
        );
    }

    #[test]
    fn encode_initialize_matches_params_form() {
        let params = AuthorizedBufferParams {
            authorized_buffer: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            program_id: Pubkey::new_unique(),
            buffer_seed: 42,
            buffer_size: 32,
        };
        assert_eq!(
            encode_initialize_authorized_buffer(
                &params.authorized_buffer,
                &params.authority,
                &params.program_id,
                params.buffer_seed,
                params.buffer_size,
            )
            .unwrap(),
            initialize_authorized_buffer(&params).unwrap()
        );
    }

    #[test]
    fn initialize_derived_authorized_buffer_targets_pda() {
        let authority = Pubkey::new_unique();
        let program_id = Pubkey::new_unique();
        let (expected, expected_bump) = Pubkey::find_program_address(
            &[b"authority", authority.as_ref(), &9u64.to_le_bytes()],
            &program_id,
        );

        let (ix, buffer, bump) =
            initialize_derived_authorized_buffer(&authority, &program_id, 9, 32).unwrap();
        assert_eq!((buffer, bump), (expected, expected_bump));
        assert_eq!(
            ix,
            encode_initialize_authorized_buffer(&expected, &authority, &program_id, 9, 32)
                .unwrap()
        );

        assert_eq!(
            initialize_derived_authorized_buffer(&authority, &program_id, 9, 0).unwrap_err(),
            EchoError::Encoding(EncodingError::ZeroBufferSize)
        );
    }

    #[test]
    fn authorized_echo_accounts() {
        let buffer = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let program_id = Pubkey::new_unique();

        let ix = authorized_echo(&buffer, &authority, &program_id, "hi").unwrap();

        assert_eq!(ix.data, vec![0x02, 0x02, 0x00, 0x00, 0x00, b'h', b'i']);
        assert_eq!(
            ix.accounts,
            vec![
                AccountMeta::new(buffer, false),
                AccountMeta::new_readonly(authority, true),
            ]
        );
    }

    #[test]
    fn packed_first_byte_is_tag() {
        let instructions = [
            EchoInstruction::Echo { data: b"a".to_vec() },
            EchoInstruction::InitializeAuthorizedEcho {
                buffer_seed: 1,
                buffer_size: 10,
            },
            EchoInstruction::AuthorizedEcho { data: vec![] },
            EchoInstruction::InitializeVendingMachineEcho {
                price: 5,
                buffer_size: 10,
            },
            EchoInstruction::VendingMachineEcho { data: b"b".to_vec() },
        ];
        for ix in instructions {
            let packed = ix.pack().unwrap();
            assert_eq!(packed[0], u8::from(ix.tag()));
            assert_eq!(EchoInstruction::unpack(&packed).unwrap(), ix);
        }
    }

    #[test]
    fn unpack_errors() {
        assert_eq!(
            EchoInstruction::unpack(&[]),
            Err(DecodingError::InvalidInstructionData)
        );
        assert_eq!(
            EchoInstruction::unpack(&[9, 0, 0, 0, 0]),
            Err(DecodingError::UnknownDiscriminant(9))
        );
        // length prefix says 5, only 2 bytes follow
        assert_eq!(
            EchoInstruction::unpack(&[0, 5, 0, 0, 0, b'h', b'i']),
            Err(DecodingError::InvalidInstructionData)
        );
        // trailing byte
        assert_eq!(
            EchoInstruction::unpack(&[0, 0, 0, 0, 0, 0xff]),
            Err(DecodingError::InvalidInstructionData)
        );
    }

    #[test]
    fn decode_echo_rejects_other_instructions() {
        let data = EchoInstruction::AuthorizedEcho { data: b"x".to_vec() }
            .pack()
            .unwrap();
        assert_eq!(decode_echo(&data), Err(DecodingError::UnexpectedInstruction));
    }

    proptest! {
        #[test]
        fn echo_round_trip(s in "[\\x00-\\x7f]{0,256}") {
            let ix = echo(&echo_params(&s)).unwrap();
            prop_assert_eq!(decode_echo(&ix.data).unwrap(), s);
        }

        #[test]
        fn echo_fails_only_on_non_ascii(s in "\\PC{0,64}") {
            prop_assert_eq!(echo(&echo_params(&s)).is_ok(), s.is_ascii());
        }
    }
}
