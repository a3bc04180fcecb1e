use clap::Parser;
use vitals_relay::utils::{logger, validation::Validate};
use vitals_relay::{CliConfig, GradioClient, RelayConfig, RelayError, VitalsRelay};

fn fail(e: &RelayError) -> ! {
    tracing::error!("❌ vitals-relay failed: {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e);
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌（stderr）
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    // 載入並驗證配置
    let config = match RelayConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let client = match GradioClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => fail(&e),
    };
    let relay = VitalsRelay::from_config(client, &config);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = relay.run(stdin.lock(), stdout.lock()).await {
        fail(&e);
    }

    tracing::debug!("Result written to stdout");
}
