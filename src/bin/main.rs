//! walletd daemon - bitcoind-compatible JSON-RPC gateway
//!
//! Options:
//!   -prod                     Use prod network (default is testnet)
//!   -rpcbind <addr>           Bind address for JSON-RPC (default: 127.0.0.1)
//!   -rpcport <port>           JSON-RPC port (default: 9332 prod / 19332 testnet)
//!   -apiurl <url>             Hosted wallet service base URL
//!                             (or WALLETD_API_URL)
//!   -proxy                    Proxy non-wallet commands to a bitcoind backend
//!   -proxyhost <host>         Backend host (default: localhost)
//!   -proxyport <port>         Backend port (default: 8332 prod / 18332 testnet)
//!   -proxyuser <user>         Backend RPC username (default: bitcoinrpc)
//!   -proxypassword <pass>     Backend RPC password
//!
//! Network selection also honors WALLETD_NETWORK=prod.

use anyhow::{bail, Context, Result};
use std::env;
use std::sync::Arc;
use tracing::info;

use walletd::{create_router, Gateway, GatewayConfig, HttpWalletApi, Network, ProxyConfig};

fn main() -> Result<()> {
    walletd::init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..])?;

    if opts.help {
        print_usage();
        return Ok(());
    }
    if opts.version {
        println!("walletd 0.1.0");
        return Ok(());
    }

    let config = opts.into_config();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}

#[derive(Default)]
struct ParsedArgs {
    prod: bool,
    rpc_bind: Option<String>,
    rpc_port: Option<u16>,
    api_url: Option<String>,
    proxy: bool,
    proxy_host: Option<String>,
    proxy_port: Option<u16>,
    proxy_user: Option<String>,
    proxy_password: Option<String>,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut opts = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |name: &str| -> Result<String> {
                iter.next()
                    .cloned()
                    .with_context(|| format!("{name} requires a value"))
            };
            match arg.as_str() {
                "-prod" => opts.prod = true,
                "-rpcbind" => opts.rpc_bind = Some(value("-rpcbind")?),
                "-rpcport" => opts.rpc_port = Some(value("-rpcport")?.parse()?),
                "-apiurl" => opts.api_url = Some(value("-apiurl")?),
                "-proxy" => opts.proxy = true,
                "-proxyhost" => opts.proxy_host = Some(value("-proxyhost")?),
                "-proxyport" => opts.proxy_port = Some(value("-proxyport")?.parse()?),
                "-proxyuser" => opts.proxy_user = Some(value("-proxyuser")?),
                "-proxypassword" => opts.proxy_password = Some(value("-proxypassword")?),
                "-h" | "--help" => opts.help = true,
                "-v" | "--version" => opts.version = true,
                other => bail!("unknown option: {other}"),
            }
        }
        Ok(opts)
    }

    fn into_config(self) -> GatewayConfig {
        let network = Network::resolve(self.prod);
        let mut proxy = ProxyConfig {
            enabled: self.proxy,
            ..Default::default()
        };
        if let Some(host) = self.proxy_host {
            proxy.host = host;
        }
        proxy.port = self.proxy_port;
        if let Some(user) = self.proxy_user {
            proxy.user = user;
        }
        proxy.password = self.proxy_password;

        let mut config = GatewayConfig::new(network).with_proxy(proxy);
        if let Some(bind) = self.rpc_bind {
            config.rpc_bind = bind;
        }
        config.rpc_port = self.rpc_port;
        config.api_url = self.api_url;
        config
    }
}

async fn run(config: GatewayConfig) -> Result<()> {
    let api_url = config
        .api_url()
        .context("wallet service URL required (-apiurl or WALLETD_API_URL)")?;
    let api = Arc::new(HttpWalletApi::new(api_url));

    info!(network = config.network.as_str(), "starting walletd");
    let gateway = Gateway::new(config.clone(), api);
    let registry = Arc::new(gateway.registry());
    let router = create_router(registry);

    let addr = format!("{}:{}", config.rpc_bind, config.rpc_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("JSON-RPC server active on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler");
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Ctrl+C handler");
        info!("received Ctrl+C");
    }
}

fn print_usage() {
    println!(
        "walletd - bitcoind-compatible JSON-RPC gateway for a hosted wallet service

USAGE:
    walletd [OPTIONS]

OPTIONS:
    -prod                    Use prod network (default is testnet)
    -rpcbind <addr>          Bind address for JSON-RPC (default: 127.0.0.1)
    -rpcport <port>          JSON-RPC port (default: 9332 or testnet: 19332)
    -apiurl <url>            Hosted wallet service base URL (or WALLETD_API_URL)
    -proxy                   Proxy non-wallet commands to a bitcoind backend
    -proxyhost <host>        Backend host (default: localhost)
    -proxyport <port>        Backend port (default: 8332 or testnet: 18332)
    -proxyuser <user>        Backend RPC username (default: bitcoinrpc)
    -proxypassword <pass>    Backend RPC password
    -h, --help               Print help
    -v, --version            Print version"
    );
}
