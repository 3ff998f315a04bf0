//! Program derived addresses.
//!
//! Addresses are SHA-256 digests of the seeds, the program id and a domain
//! marker that fall off the ed25519 curve, so no private key exists for them.

use {
    crate::error::DerivationError,
    solana_program::{
        hash::hashv,
        pubkey::{Pubkey, MAX_SEEDS, MAX_SEED_LEN},
    },
};

const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// First seed of every authorized buffer address.
pub const AUTHORITY_SEED: &[u8] = b"authority";

/// Hash `seeds` into a program address, failing if the digest is on the curve.
///
/// The on-chain program calls this with a stored bump appended to the seeds to
/// re-verify an address without searching.
pub fn create_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, DerivationError> {
    check_seeds(seeds, MAX_SEEDS)?;

    let address = hash_address(seeds, None, program_id);
    if address.is_on_curve() {
        return Err(DerivationError::OnCurve);
    }
    Ok(address)
}

/// Search bump seeds from 255 down and return the first off-curve address.
pub fn derive_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), DerivationError> {
    // One slot is taken by the bump.
    check_seeds(seeds, MAX_SEEDS - 1)?;

    for bump in (0..=u8::MAX).rev() {
        let address = hash_address(seeds, Some(bump), program_id);
        if !address.is_on_curve() {
            return Ok((address, bump));
        }
    }
    Err(DerivationError::NoValidBump)
}

/// Seeds of an authorized buffer: `["authority", authority, buffer_seed LE]`.
pub fn find_authorized_buffer_address(
    authority: &Pubkey,
    buffer_seed: u64,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), DerivationError> {
    derive_address(
        &[AUTHORITY_SEED, authority.as_ref(), &buffer_seed.to_le_bytes()],
        program_id,
    )
}

fn check_seeds(seeds: &[&[u8]], max: usize) -> Result<(), DerivationError> {
    if seeds.len() > max {
        return Err(DerivationError::TooManySeeds {
            given: seeds.len(),
            max,
        });
    }
    match seeds.iter().position(|seed| seed.len() > MAX_SEED_LEN) {
        Some(index) => Err(DerivationError::SeedTooLong {
            index,
            len: seeds[index].len(),
        }),
        None => Ok(()),
    }
}

fn hash_address(seeds: &[&[u8]], bump: Option<u8>, program_id: &Pubkey) -> Pubkey {
    let bump_seed = bump.map(|bump| [bump]);
    let mut input = Vec::with_capacity(seeds.len() + 3);
    input.extend_from_slice(seeds);
    if let Some(bump_seed) = &bump_seed {
        input.push(&bump_seed[..]);
    }
    input.push(program_id.as_ref());
    input.push(&PDA_MARKER[..]);
    Pubkey::new_from_array(hashv(&input).to_bytes())
}
