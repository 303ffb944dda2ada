//! Widget state machine.
//!
//! All mutation goes through the transitions below. A transition that needs
//! network work returns the `Command` the service layer should run; the
//! result comes back as an `Outcome`.
//!
//! Fetch results are sequenced: every fetch carries a ticket and only the
//! latest ticket's result is applied, so a slow response for an earlier
//! selection can never overwrite the current one.

use panahon_weather::{LookupFailure, Municipality, WeatherSnapshot};

/// Sequence number of a forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the forecast for a municipality
    Fetch {
        ticket: FetchTicket,
        municipality: String,
    },
    /// Run auto-detection from the device position
    Detect,
}

/// Result of a command, delivered back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Fetched {
        ticket: FetchTicket,
        result: Result<WeatherSnapshot, LookupFailure>,
    },
    Detected(Result<Municipality, LookupFailure>),
}

#[derive(Debug, Clone, Default)]
pub struct WidgetState {
    selection: String,
    search: String,
    snapshot: Option<WeatherSnapshot>,
    status: Option<String>,
    latest_ticket: u64,
    detection_requested: bool,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The catalog finished loading. Requests auto-detection once, and only
    /// while nothing is selected and the catalog has entries.
    pub fn catalog_loaded(&mut self, entries: usize) -> Option<Command> {
        if self.detection_requested || !self.selection.is_empty() || entries == 0 {
            return None;
        }
        self.detection_requested = true;
        Some(Command::Detect)
    }

    /// The selected municipality changed. Re-selecting the current value is a no-op.
    pub fn select(&mut self, municipality: impl Into<String>) -> Option<Command> {
        let municipality = municipality.into();
        if municipality == self.selection {
            return None;
        }

        self.selection = municipality;
        // Any in-flight fetch now belongs to a stale selection.
        self.latest_ticket += 1;

        if self.selection.is_empty() {
            return None;
        }

        tracing::debug!(
            "Selection changed to {:?} (ticket {})",
            self.selection,
            self.latest_ticket
        );
        Some(Command::Fetch {
            ticket: FetchTicket(self.latest_ticket),
            municipality: self.selection.clone(),
        })
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Apply a fetched snapshot. Returns false when the result was stale and dropped.
    pub fn fetch_succeeded(&mut self, ticket: FetchTicket, snapshot: WeatherSnapshot) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.snapshot = Some(snapshot);
        self.status = None;
        true
    }

    /// Record a failed fetch. Any previous snapshot stays as it was.
    /// Returns false when the result was stale and dropped.
    pub fn fetch_failed(&mut self, ticket: FetchTicket, failure: &LookupFailure) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.status = Some(failure.user_message());
        true
    }

    /// Apply an auto-detection result. Ignored once the user has picked
    /// something themselves.
    pub fn detection_finished(
        &mut self,
        result: Result<Municipality, LookupFailure>,
    ) -> Option<Command> {
        if !self.selection.is_empty() {
            tracing::debug!("Ignoring detection result, selection already made");
            return None;
        }
        match result {
            Ok(found) => self.select(found.name),
            Err(failure) => {
                self.status = Some(failure.user_message());
                None
            }
        }
    }

    /// Dispatch an outcome to the matching transition.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Command> {
        match outcome {
            Outcome::Fetched { ticket, result } => {
                let applied = match result {
                    Ok(snapshot) => self.fetch_succeeded(ticket, snapshot),
                    Err(failure) => self.fetch_failed(ticket, &failure),
                };
                if !applied {
                    tracing::debug!("Dropped stale fetch result {:?}", ticket);
                }
                None
            }
            Outcome::Detected(result) => self.detection_finished(result),
        }
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest_ticket
    }
}
