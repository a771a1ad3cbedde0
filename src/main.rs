use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use url::Url;

use nrlxplore::cli::{Cli, Commands, print_address_view, print_txn_view};
use nrlxplore::config::load_configuration;
use nrlxplore::feed::{AddressFeedController, AddressQuery};
use nrlxplore::http::{ExplorerApi, ExplorerHttpClient};
use nrlxplore::log::init_logging;
use nrlxplore::txn::TxnDetailController;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logging()?;
    let cli = Cli::parse();

    let mut config = load_configuration(&cli.config)?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let client = ExplorerHttpClient::with_config(Url::parse(&config.api_url)?, config.max_retries, config.timeout())?;
    info!(api_url = &*client.get_address(); "Using explorer API");
    let api: Arc<dyn ExplorerApi> = Arc::new(client);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, dropping in-flight responses");
            signal_token.cancel();
        }
    });

    match cli.command {
        Commands::Address {
            address,
            currency,
            pages,
        } => {
            let currency = currency.unwrap_or(config.currency);
            let controller = AddressFeedController::with_cancel_token(api, shutdown.child_token());

            controller
                .on_query_established(AddressQuery::new(address, currency.clone()))
                .await;
            for _ in 1..pages {
                if !controller.view().has_more_txns || controller.is_torn_down() {
                    break;
                }
                controller.request_next_page().await;
            }
            controller.teardown();

            let view = controller.view();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_address_view(&view, &currency);
            }
        },
        Commands::Txn { hash, currency } => {
            let currency = currency.unwrap_or(config.currency);
            let controller = TxnDetailController::with_cancel_token(api, currency.clone(), shutdown.child_token());

            controller.on_hash_established(&hash).await;
            controller.teardown();

            let view = controller.view();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_txn_view(&view, &currency);
            }
        },
    }

    Ok(())
}
