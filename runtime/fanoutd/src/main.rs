//! Fan-out proxy node daemon
//!
//! Serves the node API over TCP. Calls naming several `targets` in their
//! metadata are fanned out to those nodes; everything else goes to the
//! node-local service.
//!
//! ```bash
//! fanoutd -c /etc/fanoutd.toml
//! RUST_LOG=fanout_proxy=debug fanoutd -b 0.0.0.0:50000 -s os
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use argh::FromArgs;
use fanout_fabric::server::serve;
use fanout_fabric::transport::TcpTransportListener;
use fanout_fabric::Handler;
use fanout_proxy::{LocalForwarder, Proxy, ProxyInterceptor, Registrator, StaticCredentials};

use crate::config::DaemonConfig;

#[derive(FromArgs)]
/// fan-out proxy node daemon
struct Args {
    /// path to a TOML configuration file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// address to serve on, overrides the config file
    #[argh(option, short = 'b')]
    bind: Option<SocketAddr>,

    /// port the backend nodes serve on, overrides the config file
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// only fan out methods of this package or package.Service
    #[argh(option, short = 's')]
    scope: Option<String>,
}

impl Args {
    fn apply(self, config: &mut DaemonConfig) {
        if let Some(bind) = self.bind {
            config.listen = Some(bind);
        }
        if let Some(port) = self.port {
            config.proxy.backend_port = port;
        }
        if self.scope.is_some() {
            config.proxy.scope = self.scope;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut config = match &args.config {
        Some(path) => DaemonConfig::load(path)?,
        None => DaemonConfig::default(),
    };
    args.apply(&mut config);

    let registry = config.registry();
    if registry.is_empty() {
        tracing::warn!("no services configured, fan-out calls will be rejected");
    }

    let local: Arc<dyn Handler> = match &config.proxy.local_socket {
        Some(path) => {
            tracing::info!(path = %path.display(), "forwarding local calls");
            Arc::new(LocalForwarder::new(path))
        }
        None => Arc::new(Registrator::new()),
    };

    let interceptor = ProxyInterceptor::new(
        Proxy::new(Arc::new(registry), &config.proxy),
        Arc::new(StaticCredentials::insecure()),
        local,
    )
    .with_scope(config.proxy.scope.clone());

    let addr = config.listen_addr()?;
    let listener = TcpTransportListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        backend_port = config.proxy.backend_port,
        scope = config.proxy.scope.as_deref().unwrap_or("*"),
        "fanoutd listening"
    );

    tokio::select! {
        _ = serve(listener, interceptor) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}
