use {
    anyhow::Context,
    solana_cli_config::CONFIG_FILE,
    solana_sdk::{
        commitment_config::CommitmentConfig, native_token::LAMPORTS_PER_SOL, signature::Signature,
    },
    std::{env, path::Path, str::FromStr},
    url::{form_urlencoded, Url},
};

pub const DEVNET_URL: &str = "https://api.devnet.solana.com";
const EXPLORER_URL: &str = "https://explorer.solana.com";

const RPC_URL_VAR: &str = "ECHO_RPC_URL";
const COMMITMENT_VAR: &str = "ECHO_COMMITMENT";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub json_rpc_url: String,
    pub commitment: CommitmentConfig,
    pub airdrop_lamports: u64,
}

impl Config {
    /// Environment first, then the Solana CLI config file if one exists, then devnet.
    pub fn load() -> anyhow::Result<Self> {
        let cli_config = match &*CONFIG_FILE {
            Some(path) if Path::new(path).exists() => Some(
                solana_cli_config::Config::load(path)
                    .with_context(|| format!("Failed to read Solana config file {path}"))?,
            ),
            _ => None,
        };
        let (cli_url, cli_commitment) = cli_config
            .map(|config| (Some(config.json_rpc_url), Some(config.commitment)))
            .unwrap_or_default();

        Self::resolve(
            env::var(RPC_URL_VAR).ok().or(cli_url),
            env::var(COMMITMENT_VAR).ok().or(cli_commitment),
        )
    }

    fn resolve(json_rpc_url: Option<String>, commitment: Option<String>) -> anyhow::Result<Self> {
        let json_rpc_url = json_rpc_url.unwrap_or_else(|| DEVNET_URL.to_string());
        Url::parse(&json_rpc_url).with_context(|| format!("Invalid RPC URL {json_rpc_url}"))?;

        let commitment = match commitment {
            Some(level) => CommitmentConfig::from_str(&level)
                .map_err(|err| anyhow::anyhow!("Invalid commitment level {level}: {err}"))?,
            None => CommitmentConfig::confirmed(),
        };

        Ok(Self {
            json_rpc_url,
            commitment,
            airdrop_lamports: LAMPORTS_PER_SOL,
        })
    }

    /// Explorer link for a transaction on the configured cluster.
    pub fn explorer_tx_url(&self, signature: &Signature) -> String {
        let host = Url::parse(&self.json_rpc_url)
            .ok()
            .and_then(|rpc| rpc.host_str().map(str::to_string))
            .unwrap_or_default();

        let mut query = form_urlencoded::Serializer::new(String::new());
        if host.contains("devnet") {
            query.append_pair("cluster", "devnet");
        } else if host.contains("testnet") {
            query.append_pair("cluster", "testnet");
        } else if !host.contains("mainnet") {
            query
                .append_pair("cluster", "custom")
                .append_pair("customUrl", &self.json_rpc_url);
        }

        let query = query.finish();
        if query.is_empty() {
            format!("{EXPLORER_URL}/tx/{signature}")
        } else {
            format!("{EXPLORER_URL}/tx/{signature}?{query}")
        }
    }
}
