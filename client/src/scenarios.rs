use {
    crate::ledger::Ledger,
    anyhow::{bail, Context},
    echo_program::{
        instruction::{self, EchoParams},
        state::{AuthorizedBuffer, EchoBuffer},
    },
    solana_sdk::{
        pubkey::Pubkey,
        signature::{Keypair, Signature, Signer},
        system_instruction,
    },
};

/// Size requested for authorized buffers, header included.
pub const AUTHORIZED_BUFFER_SIZE: u64 = 32;

#[derive(Debug)]
pub struct EchoOutcome {
    pub signature: Signature,
    pub buffer: Pubkey,
    pub text: String,
}

#[derive(Debug)]
pub struct AuthorizedEchoOutcome {
    pub signature: Signature,
    pub buffer: Pubkey,
    pub contents: AuthorizedBuffer,
}

/// Create `buffer` sized to `text`, echo `text` into it and read it back.
pub async fn run_echo<L: Ledger>(
    ledger: &L,
    payer: &Keypair,
    buffer: &Keypair,
    program_id: &Pubkey,
    text: &str,
) -> anyhow::Result<EchoOutcome> {
    let echo_ix = instruction::echo(&EchoParams {
        program_id: *program_id,
        echo_buffer: buffer.pubkey(),
        data: text.to_string(),
    })
    .context("Couldn't encode echo instruction")?;

    let space = text.len();
    let lamports = ledger.minimum_balance_for_rent_exemption(space).await?;
    let create_ix = system_instruction::create_account(
        &payer.pubkey(),
        &buffer.pubkey(),
        lamports,
        space as u64,
        program_id,
    );

    log::info!("Echoing {space} bytes into {}", buffer.pubkey());
    let signature = ledger
        .send_and_confirm(&[create_ix, echo_ix], payer, &[buffer])
        .await?;

    let data = ledger
        .account_data(&buffer.pubkey())
        .await?
        .with_context(|| format!("Failed to get account. address={}", buffer.pubkey()))?;
    // The account is sized to the text, so every byte must match, NULs included.
    if data != text.as_bytes() {
        let shown = EchoBuffer::unpack(&data).map_or_else(|_| format!("{data:?}"), |b| b.text);
        bail!("Echo buffer {} holds {shown:?}, expected {text:?}", buffer.pubkey());
    }

    Ok(EchoOutcome {
        signature,
        buffer: buffer.pubkey(),
        text: text.to_string(),
    })
}

/// Initialize an authorized buffer owned by `authority` and check its header.
pub async fn run_authorized_echo<L: Ledger>(
    ledger: &L,
    authority: &Keypair,
    program_id: &Pubkey,
    buffer_seed: u64,
) -> anyhow::Result<AuthorizedEchoOutcome> {
    let (init_ix, buffer, bump_seed) = instruction::initialize_derived_authorized_buffer(
        &authority.pubkey(),
        program_id,
        buffer_seed,
        AUTHORIZED_BUFFER_SIZE,
    )
    .context("Couldn't build initialize authorized echo instruction")?;

    log::info!("Initializing authorized buffer {buffer} (bump {bump_seed})");
    let signature = ledger.send_and_confirm(&[init_ix], authority, &[]).await?;

    let data = ledger
        .account_data(&buffer)
        .await?
        .with_context(|| format!("Failed to get account. address={buffer}"))?;
    let contents = AuthorizedBuffer::unpack(&data)?;
    if contents.bump_seed != bump_seed || contents.buffer_seed != buffer_seed {
        bail!(
            "Authorized buffer {buffer} header is (bump {}, seed {}), expected (bump {bump_seed}, seed {buffer_seed})",
            contents.bump_seed,
            contents.buffer_seed,
        );
    }

    Ok(AuthorizedEchoOutcome {
        signature,
        buffer,
        contents,
    })
}
