use {
    anyhow::Context,
    clap::{crate_description, crate_name, crate_version, App, Arg},
    ledger::{Ledger, RpcLedger},
    rand::Rng,
    solana_clap_utils::{input_parsers::pubkey_of, input_validators::is_pubkey},
    solana_sdk::signature::{Keypair, Signer},
};

mod config;
mod ledger;
mod scenarios;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::with_name("program_id")
                .value_name("PROGRAM_ID")
                .index(1)
                .required(true)
                .validator(is_pubkey)
                .help("Program ID (base58 encoded) of the deployed echo program"),
        )
        .arg(
            Arg::with_name("echo")
                .value_name("ECHO")
                .index(2)
                .required(true)
                .help("The string to copy on-chain"),
        )
        .get_matches();

    let program_id = pubkey_of(&matches, "program_id").context("Missing program id")?;
    let text = matches.value_of("echo").context("Missing echo string")?;

    let config = config::Config::load()?;
    log::info!("Using RPC endpoint {}", config.json_rpc_url);
    let ledger = RpcLedger::new(&config);

    let fee_payer = Keypair::new();
    log::info!("Requesting airdrop of {} lamports", config.airdrop_lamports);
    ledger
        .request_airdrop(&fee_payer.pubkey(), config.airdrop_lamports)
        .await?;
    log::info!("Airdrop received");

    let buffer = Keypair::new();
    let echo = scenarios::run_echo(&ledger, &fee_payer, &buffer, &program_id, text).await?;
    println!("{}", config.explorer_tx_url(&echo.signature));
    println!("Echo Buffer {} Text: {}", echo.buffer, echo.text);

    let buffer_seed = rand::thread_rng().gen::<u64>();
    let authorized =
        scenarios::run_authorized_echo(&ledger, &fee_payer, &program_id, buffer_seed).await?;
    println!("{}", config.explorer_tx_url(&authorized.signature));
    println!(
        "Authorized Buffer {}: bump {}, seed {}, text {:?}",
        authorized.buffer,
        authorized.contents.bump_seed,
        authorized.contents.buffer_seed,
        authorized.contents.text()?,
    );

    Ok(())
}
