use {
    crate::config::Config,
    anyhow::{bail, Context},
    solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig},
    solana_sdk::{
        commitment_config::CommitmentConfig,
        instruction::Instruction,
        pubkey::Pubkey,
        signature::{Keypair, Signature, Signer},
        transaction::Transaction,
    },
    std::time::Duration,
};

const CONFIRMATION_POLLS: usize = 120;
const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// What the scenarios need from a cluster.
pub trait Ledger {
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> anyhow::Result<Signature>;

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64>;

    /// Sign with `payer` followed by `signers`, submit, and wait for confirmation.
    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> anyhow::Result<Signature>;

    /// Raw account data, `None` if the account does not exist.
    async fn account_data(&self, address: &Pubkey) -> anyhow::Result<Option<Vec<u8>>>;
}

pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(config: &Config) -> Self {
        Self {
            client: RpcClient::new_with_commitment(config.json_rpc_url.clone(), config.commitment),
            commitment: config.commitment,
        }
    }

    async fn confirm(&self, signature: &Signature) -> anyhow::Result<()> {
        for _ in 0..CONFIRMATION_POLLS {
            let status = self
                .client
                .get_signature_status_with_commitment(signature, self.commitment)
                .await
                .context("Couldn't fetch signature status")?;
            match status {
                Some(Ok(())) => return Ok(()),
                Some(Err(err)) => bail!("Transaction {signature} failed: {err}"),
                None => tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await,
            }
        }
        bail!("Transaction {signature} was not confirmed after {CONFIRMATION_POLLS} polls")
    }
}

impl Ledger for RpcLedger {
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> anyhow::Result<Signature> {
        let signature = self
            .client
            .request_airdrop(to, lamports)
            .await
            .context("Failed to request airdrop")?;
        self.confirm(&signature).await?;
        Ok(signature)
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .context("Couldn't fetch rent exemption balance")
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> anyhow::Result<Signature> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .context("Couldn't fetch latest blockhash")?;

        let all_signers = std::iter::once(payer)
            .chain(signers.iter().copied())
            .collect::<Vec<_>>();
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &all_signers,
            blockhash,
        );

        log::debug!("Sending transaction with {} instructions", instructions.len());
        let signature = self
            .client
            .send_transaction_with_config(
                &transaction,
                RpcSendTransactionConfig {
                    skip_preflight: true,
                    ..RpcSendTransactionConfig::default()
                },
            )
            .await
            .context("Failed transaction submission")?;

        self.confirm(&signature).await?;
        Ok(signature)
    }

    async fn account_data(&self, address: &Pubkey) -> anyhow::Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .with_context(|| format!("Couldn't fetch account {address}"))?;
        Ok(response.value.map(|account| account.data))
    }
}
