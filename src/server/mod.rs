pub mod api;

use crate::cli::Args;
use crate::orchestrator::Orchestrator;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use log::{ info, warn };

pub struct Server {
    addr: String,
    orchestrator: Arc<Orchestrator>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, orchestrator: Arc<Orchestrator>, args: Args) -> Self {
        Self {
            addr,
            orchestrator,
            args,
        }
    }

    fn tls_paths(&self) -> Result<Option<api::TlsPaths>, Box<dyn Error + Send + Sync>> {
        if !self.args.enable_tls {
            info!("TLS not enabled. Running plain HTTP server.");
            return Ok(None);
        }
        match (&self.args.tls_cert_path, &self.args.tls_key_path) {
            (Some(cert_path), Some(key_path)) => {
                Ok(
                    Some(api::TlsPaths {
                        cert_path: cert_path.clone(),
                        key_path: key_path.clone(),
                    })
                )
            }
            (Some(_), None) | (None, Some(_)) => {
                Err("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.".into())
            }
            (None, None) => Err("--enable-tls was set but no certificate/key paths provided.".into()),
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid server address '{}': {}", self.addr, e))?;
        let tls = self.tls_paths()?;
        if tls.is_none() && (self.args.tls_cert_path.is_some() || self.args.tls_key_path.is_some()) {
            warn!("TLS paths given but --enable-tls is not set; serving plain HTTP.");
        }

        let app = api::router(self.orchestrator.clone(), self.args.max_body_bytes);
        api::start_http_server(addr, app, tls).await
    }
}
