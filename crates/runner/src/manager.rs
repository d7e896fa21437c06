//! Market Manager - symbol -> market server registry

use crate::config::AppConfig;
use crate::error::ManagerError;
use crate::market_loop::{LoopSettings, ServerDeps};
use crate::server::MarketServer;
use dashmap::DashMap;
use log::info;
use std::sync::Arc;
use vigil_notifier::Notifier;
use vigil_ports::AlertChannel;
use vigil_store::JsonLedgerStore;

#[derive(Default)]
pub struct MarketManager {
    servers: DashMap<String, Arc<MarketServer>>,
}

impl MarketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and start one market server per configured symbol
    pub async fn initialize_all(
        config: &AppConfig,
        deps: ServerDeps,
        alerts: Arc<dyn AlertChannel>,
    ) -> Result<Self, ManagerError> {
        config.validate()?;
        let settings = LoopSettings {
            poll_interval: config.server.poll_interval(),
            trim_provisional: config.server.trim_provisional,
        };

        let manager = Self::new();
        for symbol in &config.symbols {
            let ledger = Arc::new(JsonLedgerStore::for_symbol(&config.data_dir, symbol));
            let notifier =
                Notifier::open(symbol.clone(), config.mailing_list.clone(), ledger, alerts.clone())
                    .await;
            let server = Arc::new(MarketServer::new(
                symbol.clone(),
                deps.clone(),
                Arc::new(notifier),
                settings,
            ));
            server.start();
            manager.insert(server);
        }
        info!("Started {} market servers", manager.len());
        Ok(manager)
    }

    /// Track a server under its symbol, replacing any previous one
    pub fn insert(&self, server: Arc<MarketServer>) -> Option<Arc<MarketServer>> {
        self.servers.insert(server.symbol().to_string(), server)
    }

    pub fn get_server(&self, symbol: &str) -> Result<Arc<MarketServer>, ManagerError> {
        self.servers
            .get(symbol)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ManagerError::UnknownSymbol(symbol.to_string()))
    }

    /// Tracked symbols, sorted
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.servers.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Stop every server; each one flushes its notification ledger
    pub async fn stop_all(&self) {
        let servers: Vec<Arc<MarketServer>> =
            self.servers.iter().map(|e| e.value().clone()).collect();
        for server in servers {
            server.stop().await;
        }
        info!("All market servers stopped");
    }
}
