//! Weather backend: async detection and fetching.
//! All network work runs off the UI thread; results sent via mpsc.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use panahon_weather::{detect_municipality, Catalog, PositionSource, WeatherFetcher};
use tokio::runtime::Handle;

use crate::state::{Command, Outcome};

/// Runs `Command`s on a tokio runtime and reports `Outcome`s back.
pub struct WeatherService {
    runtime: Handle,
    fetcher: Arc<WeatherFetcher>,
    catalog: Arc<Catalog>,
    position: PositionSource,
    position_timeout: Duration,
    tx: Sender<Outcome>,
}

impl WeatherService {
    pub fn new(
        runtime: Handle,
        fetcher: WeatherFetcher,
        catalog: Arc<Catalog>,
        position: PositionSource,
        position_timeout: Duration,
    ) -> (Self, Receiver<Outcome>) {
        let (tx, rx) = std::sync::mpsc::channel();
        let service = Self {
            runtime,
            fetcher: Arc::new(fetcher),
            catalog,
            position,
            position_timeout,
            tx,
        };
        (service, rx)
    }

    /// Start a command without blocking. The outcome arrives on the receiver
    /// returned by `new`. Fetches are never cancelled; stale results are
    /// dropped by the state machine.
    pub fn dispatch(&self, command: Command) {
        let tx = self.tx.clone();
        match command {
            Command::Fetch {
                ticket,
                municipality,
            } => {
                let fetcher = self.fetcher.clone();
                self.runtime.spawn(async move {
                    let result = fetcher.fetch(&municipality).await;
                    let _ = tx.send(Outcome::Fetched { ticket, result });
                });
            }
            Command::Detect => {
                let fetcher = self.fetcher.clone();
                let catalog = self.catalog.clone();
                let position = self.position.clone();
                let timeout = self.position_timeout;
                self.runtime.spawn(async move {
                    let result =
                        detect_municipality(&position, timeout, fetcher.geocoder(), &catalog).await;
                    let _ = tx.send(Outcome::Detected(result));
                });
            }
        }
    }

    /// Run a command to completion on the calling thread.
    /// For one-shot CLI use; never call from inside the runtime.
    pub fn run_blocking(&self, command: Command) -> Outcome {
        match command {
            Command::Fetch {
                ticket,
                municipality,
            } => {
                let result = self.runtime.block_on(self.fetcher.fetch(&municipality));
                Outcome::Fetched { ticket, result }
            }
            Command::Detect => {
                let result = self.runtime.block_on(detect_municipality(
                    &self.position,
                    self.position_timeout,
                    self.fetcher.geocoder(),
                    &self.catalog,
                ));
                Outcome::Detected(result)
            }
        }
    }
}
