use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Latest SimBrief operational flight plan, reduced to what the briefing shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    pub origin_icao: String,
    pub destination_icao: String,
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub aircraft_icao: Option<String>,
    pub aircraft_name: Option<String>,
    pub route: Option<String>,
    pub cruise_altitude: Option<String>,
}

impl FlightPlan {
    /// Airline code and flight number, e.g. `BAW117`.
    pub fn callsign(&self) -> Option<String> {
        match (&self.airline, &self.flight_number) {
            (Some(a), Some(n)) => Some(format!("{}{}", a, n)),
            (None, Some(n)) => Some(n.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub icao: String,
    pub raw_text: String,
    pub flight_rules: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Which end of the flight an ATIS is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtisRole {
    Departure,
    Arrival,
}

impl AtisRole {
    /// Callsign infix VATSIM uses for a split broadcast of this role.
    pub fn designator(self) -> &'static str {
        match self {
            AtisRole::Departure => "D",
            AtisRole::Arrival => "A",
        }
    }
}

impl std::fmt::Display for AtisRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtisRole::Departure => write!(f, "departure"),
            AtisRole::Arrival => write!(f, "arrival"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtisReport {
    pub icao: String,
    pub facility_id: String,
    pub frequency: Option<String>,
    pub code: Option<String>,
    pub text: String,
}

/// AVWX `/metar/{station}` body. Only the fields the briefing uses.
#[derive(Debug, Deserialize)]
pub struct AvwxMetar {
    pub raw: String,
    pub flight_rules: Option<String>,
    pub station: Option<String>,
}

/// VATSIM v3 data feed, restricted to the ATIS list.
#[derive(Debug, Deserialize)]
pub struct VatsimFeed {
    #[serde(default)]
    pub atis: Vec<VatsimAtis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VatsimAtis {
    pub callsign: String,
    pub frequency: Option<String>,
    pub atis_code: Option<String>,
    pub text_atis: Option<Vec<String>>,
}

impl From<&VatsimAtis> for AtisReport {
    fn from(station: &VatsimAtis) -> Self {
        let icao = station
            .callsign
            .split('_')
            .next()
            .unwrap_or_default()
            .to_uppercase();
        Self {
            icao,
            facility_id: station.callsign.to_uppercase(),
            frequency: station.frequency.clone(),
            code: station.atis_code.clone().filter(|c| !c.trim().is_empty()),
            text: station.text_atis.clone().unwrap_or_default().join("\n"),
        }
    }
}

/// SimBrief converts its XML to JSON, so empty elements arrive as `{}`
/// rather than `""`. Read a string at `pointer`, treating anything else
/// (or a blank string) as absent.
pub fn text_at(json: &Value, pointer: &str) -> Option<String> {
    json.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_at_ignores_empty_elements() {
        let doc = json!({"general": {"route": {}, "icao_airline": " ", "flight_number": "117"}});
        assert_eq!(text_at(&doc, "/general/route"), None);
        assert_eq!(text_at(&doc, "/general/icao_airline"), None);
        assert_eq!(text_at(&doc, "/general/flight_number").as_deref(), Some("117"));
        assert_eq!(text_at(&doc, "/missing/path"), None);
    }

    #[test]
    fn test_atis_report_from_feed_entry() {
        let station = VatsimAtis {
            callsign: "eddf_d_atis".into(),
            frequency: Some("118.025".into()),
            atis_code: Some("Q".into()),
            text_atis: Some(vec!["FRANKFURT DEPARTURE INFORMATION Q".into(), "RWY 18".into()]),
        };
        let report = AtisReport::from(&station);
        assert_eq!(report.icao, "EDDF");
        assert_eq!(report.facility_id, "EDDF_D_ATIS");
        assert_eq!(report.text, "FRANKFURT DEPARTURE INFORMATION Q\nRWY 18");
    }

    #[test]
    fn test_callsign() {
        let mut plan = FlightPlan {
            origin_icao: "KJFK".into(),
            destination_icao: "EGLL".into(),
            origin_name: None,
            destination_name: None,
            airline: Some("BAW".into()),
            flight_number: Some("117".into()),
            aircraft_icao: None,
            aircraft_name: None,
            route: None,
            cruise_altitude: None,
        };
        assert_eq!(plan.callsign().as_deref(), Some("BAW117"));
        plan.airline = None;
        assert_eq!(plan.callsign().as_deref(), Some("117"));
        plan.flight_number = None;
        assert_eq!(plan.callsign(), None);
    }
}
