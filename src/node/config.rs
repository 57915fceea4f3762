//! Gateway configuration - network, listen endpoint, wallet API, proxy

/// Which bitcoin network the gateway fronts. Drives the default listen and
/// proxy ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Prod,
    #[default]
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Prod => "prod",
            Network::Testnet => "testnet",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "mainnet" => Some(Network::Prod),
            "testnet" | "test" => Some(Network::Testnet),
            _ => None,
        }
    }

    /// The `-prod` flag and the `WALLETD_NETWORK` environment override are
    /// both honored; either selects prod.
    pub fn resolve(prod_flag: bool) -> Self {
        let env_prod = std::env::var("WALLETD_NETWORK")
            .ok()
            .and_then(|v| Network::from_str(&v))
            .map(|n| n == Network::Prod)
            .unwrap_or(false);
        if prod_flag || env_prod {
            Network::Prod
        } else {
            Network::Testnet
        }
    }

    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Network::Prod => 9332,
            Network::Testnet => 19332,
        }
    }

    pub fn default_proxy_port(&self) -> u16 {
        match self {
            Network::Prod => 8332,
            Network::Testnet => 18332,
        }
    }
}

/// Proxied bitcoind backend endpoint.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".into(),
            port: None,
            user: "bitcoinrpc".into(),
            password: None,
        }
    }
}

/// Gateway configuration. The bootstrap layer constructs this.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub network: Network,
    pub rpc_bind: String,
    pub rpc_port: Option<u16>,
    pub api_url: Option<String>,
    pub proxy: ProxyConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_bind: "127.0.0.1".into(),
            rpc_port: None,
            api_url: None,
            proxy: ProxyConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Default::default()
        }
    }

    pub fn with_rpc_bind(mut self, bind: impl Into<String>) -> Self {
        self.rpc_bind = bind.into();
        self
    }

    pub fn with_rpc_port(mut self, port: u16) -> Self {
        self.rpc_port = Some(port);
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn rpc_port(&self) -> u16 {
        self.rpc_port
            .unwrap_or_else(|| self.network.default_rpc_port())
    }

    pub fn proxy_port(&self) -> u16 {
        self.proxy
            .port
            .unwrap_or_else(|| self.network.default_proxy_port())
    }

    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}", self.proxy.host, self.proxy_port())
    }

    /// Explicit value wins; `WALLETD_API_URL` is the fallback.
    pub fn api_url(&self) -> Option<String> {
        self.api_url
            .clone()
            .or_else(|| std::env::var("WALLETD_API_URL").ok())
    }
}
