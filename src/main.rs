use anyhow::{bail, Context, Result};
use chrono::Local;
use log::info;
use std::io;
use std::io::Write;
use std::sync::Arc;

use wopay_channel::models::{Request, Transaction};
use wopay_channel::{AdapterSettings, ChannelConfig, Processor, WechatProcessor};

const USAGE: &str = "Usage:\n  \
    wopay-channel query <config.json> <channel_serial_no>\n  \
    wopay-channel notify <config.json> <notification.xml>";

fn load_config(path: &str) -> Result<Arc<ChannelConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read channel config {}", path))?;
    let config = ChannelConfig::from_json(&content)
        .with_context(|| format!("Invalid channel config {}", path))?;
    Ok(Arc::new(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    let mut log_builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    log_builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S %:z"),
                record.level(),
                record.args()
            )
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        })
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, config_path, argument) = match args.as_slice() {
        [command, config_path, argument] => (command.as_str(), config_path, argument),
        _ => bail!("{}", USAGE),
    };

    let settings = AdapterSettings::from_env().context("Failed to load adapter settings")?;
    settings.validate()?;

    let config = load_config(config_path)?;
    let processor = WechatProcessor::with_settings(settings).context("Failed to create processor")?;

    match command {
        "query" => {
            let mut request = Request::transaction_query(
                config,
                wopay_channel::utils::id::uuid(),
                vec![Transaction {
                    channel_serial_no: Some(argument.clone()),
                    ..Default::default()
                }],
            );
            let response = processor
                .execute(&mut request)
                .await
                .context("Transaction query failed")?;

            for transaction in response.transactions() {
                info!(
                    "{:?} status={:?} code={:?} message={:?}",
                    transaction.channel_serial_no,
                    transaction.status,
                    transaction.code,
                    transaction.message
                );
            }
        }
        "notify" => {
            let notification = std::fs::read_to_string(argument)
                .with_context(|| format!("Failed to read notification {}", argument))?;
            let request = processor
                .receive(&notification, config)
                .context("Notification rejected")?;
            info!("Received {:?}", request.body);
            println!("{}", processor.acknowledge(&request)?);
        }
        other => bail!("Unknown command '{}'\n{}", other, USAGE),
    }

    Ok(())
}
