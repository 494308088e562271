use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Integration events. Each one draws its amount from a different batch column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Event {
    #[serde(rename = "HC30%")]
    Hc30,
    #[serde(rename = "HCP")]
    Hcp,
    #[serde(rename = "CALCS")]
    Calcs,
    #[serde(rename = "HSP")]
    Hsp,
    #[serde(rename = "CALCP")]
    Calcp,
}

impl Event {
    /// Every event, in generation order.
    pub const ALL: [Event; 5] = [Event::Hc30, Event::Hcp, Event::Calcs, Event::Hsp, Event::Calcp];

    /// Identifier written into outputs and file names.
    pub fn id(&self) -> &'static str {
        match self {
            Event::Hc30 => "HC30%",
            Event::Hcp => "HCP",
            Event::Calcs => "CALCS",
            Event::Hsp => "HSP",
            Event::Calcp => "CALCP",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Event {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Event::ALL
            .into_iter()
            .find(|e| e.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown event '{wanted}' (expected one of HC30%, HCP, CALCS, HSP, CALCP)"))
    }
}

/// Logical output fields bound to batch columns at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalField {
    #[serde(rename = "PROCESSO")]
    Process,
    #[serde(rename = "EVENTO")]
    EventAmount,
}

impl LogicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::Process => "PROCESSO",
            LogicalField::EventAmount => "EVENTO",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requester id used when the operator leaves it blank.
pub const DEFAULT_REQUESTER_ID: &str = "45270";

/// Everything the operator typed for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    /// Column text for `PROCESSO`, shared by every event.
    pub process_column: String,
    /// Column text for `EVENTO`, per event. Events may be missing.
    pub event_columns: BTreeMap<Event, String>,
    pub requester_id: String,
}

impl FieldMapping {
    pub fn new(process_column: impl Into<String>) -> Self {
        Self {
            process_column: process_column.into(),
            event_columns: BTreeMap::new(),
            requester_id: DEFAULT_REQUESTER_ID.to_string(),
        }
    }

    pub fn with_event(mut self, event: Event, column: impl Into<String>) -> Self {
        self.event_columns.insert(event, column.into());
        self
    }

    /// Blank ids fall back to [`DEFAULT_REQUESTER_ID`].
    pub fn with_requester(mut self, requester_id: impl Into<String>) -> Self {
        let id = requester_id.into();
        self.requester_id = if id.trim().is_empty() {
            DEFAULT_REQUESTER_ID.to_string()
        } else {
            id.trim().to_string()
        };
        self
    }

    pub fn event_column(&self, event: Event) -> Option<&str> {
        self.event_columns.get(&event).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for event in Event::ALL {
            assert_eq!(event.id().parse::<Event>(), Ok(event));
        }
        assert_eq!("hc30%".parse::<Event>(), Ok(Event::Hc30));
        assert!("HC40%".parse::<Event>().is_err());
    }

    #[test]
    fn serde_uses_event_ids() {
        let json = serde_json::to_string(&Event::Hc30).unwrap();
        assert_eq!(json, "\"HC30%\"");
        let back: Event = serde_json::from_str("\"CALCP\"").unwrap();
        assert_eq!(back, Event::Calcp);
    }

    #[test]
    fn blank_requester_falls_back_to_default() {
        let m = FieldMapping::new("Processo").with_requester("  ");
        assert_eq!(m.requester_id, DEFAULT_REQUESTER_ID);
        let m = FieldMapping::new("Processo").with_requester(" 123 ");
        assert_eq!(m.requester_id, "123");
    }

    #[test]
    fn unmapped_event_reads_none() {
        let m = FieldMapping::new("Processo").with_event(Event::Hcp, "Contratual CHM");
        assert_eq!(m.event_column(Event::Hcp), Some("Contratual CHM"));
        assert_eq!(m.event_column(Event::Hsp), None);
    }
}
