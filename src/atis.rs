//! VATSIM ATIS lookup.
//!
//! The public data feed lists every connected ATIS. An airport publishes
//! either one combined broadcast (`EDDF_ATIS`) or a departure/arrival pair
//! (`EDDF_D_ATIS`, `EDDF_A_ATIS`), occasionally both. [`select_atis`] picks
//! the one that applies to a role and refuses to guess when the feed is
//! ambiguous.

use crate::error::BriefingError;
use crate::http::HttpFetch;
use crate::models::{AtisReport, AtisRole, VatsimAtis, VatsimFeed};
use tracing::{debug, info, warn};

/// How a feed entry's callsign designates its broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Designation {
    Combined,
    Split(AtisRole),
}

/// Classifies `callsign` for `icao`, or `None` if it is not an ATIS of that
/// airport (or uses an infix other than `D`/`A`).
fn designation(callsign: &str, icao: &str) -> Option<Designation> {
    let upper = callsign.trim().to_uppercase();
    let parts: Vec<&str> = upper.split('_').collect();

    match parts.as_slice() {
        [airport, "ATIS"] if *airport == icao => Some(Designation::Combined),
        [airport, infix, "ATIS"] if *airport == icao => [AtisRole::Departure, AtisRole::Arrival]
            .into_iter()
            .find(|role| role.designator() == *infix)
            .map(Designation::Split),
        _ => None,
    }
}

/// Picks the ATIS that applies to `role` at `icao`.
///
/// A split broadcast for the role wins over a combined one. A combined
/// broadcast serves either role. More than one candidate at the deciding
/// step is ambiguous and yields `None`.
pub fn select_atis<'a>(stations: &'a [VatsimAtis], icao: &str, role: AtisRole) -> Option<&'a VatsimAtis> {
    let icao = icao.trim().to_uppercase();
    let mut split = Vec::new();
    let mut combined = Vec::new();

    for station in stations {
        match designation(&station.callsign, &icao) {
            Some(Designation::Split(r)) if r == role => split.push(station),
            Some(Designation::Combined) => combined.push(station),
            _ => {}
        }
    }

    let candidates = if split.is_empty() { combined } else { split };
    match candidates.as_slice() {
        [only] => Some(*only),
        [] => None,
        many => {
            let callsigns: Vec<&str> = many.iter().map(|s| s.callsign.as_str()).collect();
            warn!(icao = %icao, role = %role, ?callsigns, "Ambiguous ATIS, treating as unavailable");
            None
        }
    }
}

/// Fetches the VATSIM data feed and selects an ATIS from it.
pub struct VatsimClient<H> {
    http: H,
    feed_url: String,
}

impl<H: HttpFetch> VatsimClient<H> {
    pub fn new(http: H, feed_url: impl Into<String>) -> Self {
        Self {
            http,
            feed_url: feed_url.into(),
        }
    }

    pub async fn fetch_atis(&self, icao: &str, role: AtisRole) -> Result<AtisReport, BriefingError> {
        info!("Calling VATSIM data feed for {} {} ATIS", icao, role);
        let response = self.http.get(&self.feed_url, None).await?;
        if !response.is_success() {
            return Err(BriefingError::NetworkError(format!(
                "HTTP {} from VATSIM",
                response.status
            )));
        }

        let feed: VatsimFeed =
            serde_json::from_str(&response.body).map_err(|e| BriefingError::parse("VATSIM", e))?;
        debug!(stations = feed.atis.len(), "VATSIM feed parsed");

        match select_atis(&feed.atis, icao, role) {
            Some(station) => {
                info!("Got {} ATIS {}", role, station.callsign);
                Ok(AtisReport::from(station))
            }
            None => Err(BriefingError::AtisUnavailable {
                icao: icao.trim().to_uppercase(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockFetcher;
    use crate::http::HttpResponse;

    fn station(callsign: &str, text: &str) -> VatsimAtis {
        VatsimAtis {
            callsign: callsign.to_string(),
            frequency: Some("122.800".to_string()),
            atis_code: Some("A".to_string()),
            text_atis: Some(vec![text.to_string()]),
        }
    }

    fn pick<'a>(stations: &'a [VatsimAtis], icao: &str, role: AtisRole) -> Option<&'a str> {
        select_atis(stations, icao, role).map(|s| s.callsign.as_str())
    }

    #[test]
    fn test_split_preferred_over_combined() {
        let stations = vec![
            station("EDDF_ATIS", "combined"),
            station("EDDF_D_ATIS", "departure"),
            station("EDDF_A_ATIS", "arrival"),
        ];
        assert_eq!(pick(&stations, "EDDF", AtisRole::Departure), Some("EDDF_D_ATIS"));
        assert_eq!(pick(&stations, "EDDF", AtisRole::Arrival), Some("EDDF_A_ATIS"));
    }

    #[test]
    fn test_combined_serves_both_roles() {
        let stations = vec![station("KJFK_ATIS", "combined"), station("KLGA_ATIS", "other")];
        assert_eq!(pick(&stations, "kjfk", AtisRole::Departure), Some("KJFK_ATIS"));
        assert_eq!(pick(&stations, "KJFK", AtisRole::Arrival), Some("KJFK_ATIS"));
    }

    #[test]
    fn test_combined_used_when_role_split_missing() {
        let stations = vec![station("EGLL_ATIS", "combined"), station("EGLL_A_ATIS", "arrival")];
        assert_eq!(pick(&stations, "EGLL", AtisRole::Departure), Some("EGLL_ATIS"));
    }

    #[test]
    fn test_only_opposite_split_is_unavailable() {
        let stations = vec![station("EDDM_A_ATIS", "arrival")];
        assert_eq!(pick(&stations, "EDDM", AtisRole::Departure), None);
        assert_eq!(pick(&stations, "EDDM", AtisRole::Arrival), Some("EDDM_A_ATIS"));
    }

    #[test]
    fn test_ambiguous_degrades_to_none() {
        let stations = vec![station("EHAM_D_ATIS", "one"), station("EHAM_D_ATIS", "two")];
        assert_eq!(pick(&stations, "EHAM", AtisRole::Departure), None);

        let stations = vec![station("EHAM_ATIS", "one"), station("eham_atis", "two")];
        assert_eq!(pick(&stations, "EHAM", AtisRole::Arrival), None);
    }

    #[test]
    fn test_prefix_match_is_exact() {
        let stations = vec![station("EDDFX_ATIS", "x"), station("EDDF_X_ATIS", "y"), station("EDDF_APP", "z")];
        assert_eq!(pick(&stations, "EDDF", AtisRole::Departure), None);
    }

    #[tokio::test]
    async fn test_fetch_atis_from_feed() {
        let body = serde_json::json!({
            "general": {"version": 3},
            "atis": [
                {"cid": 1, "callsign": "EGLL_ATIS", "frequency": "113.750", "atis_code": "K",
                 "text_atis": ["HEATHROW INFORMATION K", "RWY 27R"]},
                {"cid": 2, "callsign": "KJFK_ATIS", "frequency": "128.725", "atis_code": null,
                 "text_atis": null}
            ]
        })
        .to_string();
        let client = VatsimClient::new(
            MockFetcher::with(vec![Ok(HttpResponse::ok(body.clone())), Ok(HttpResponse::ok(body))]),
            "https://data.vatsim.net/v3/vatsim-data.json",
        );

        let report = client.fetch_atis("EGLL", AtisRole::Arrival).await.unwrap();
        assert_eq!(report.facility_id, "EGLL_ATIS");
        assert_eq!(report.code.as_deref(), Some("K"));
        assert_eq!(report.text, "HEATHROW INFORMATION K\nRWY 27R");

        let report = client.fetch_atis("KJFK", AtisRole::Departure).await.unwrap();
        assert_eq!(report.code, None);
        assert_eq!(report.text, "");
    }

    #[tokio::test]
    async fn test_fetch_atis_unavailable_and_errors() {
        let client = VatsimClient::new(
            MockFetcher::with(vec![
                Ok(HttpResponse::ok(r#"{"atis": []}"#)),
                Ok(HttpResponse::new(500, "")),
                Ok(HttpResponse::ok("<!DOCTYPE html>")),
            ]),
            "https://data.vatsim.net/v3/vatsim-data.json",
        );

        assert_eq!(
            client.fetch_atis("LFPG", AtisRole::Departure).await,
            Err(BriefingError::AtisUnavailable { icao: "LFPG".into() })
        );
        assert!(matches!(
            client.fetch_atis("LFPG", AtisRole::Departure).await,
            Err(BriefingError::NetworkError(_))
        ));
        assert!(matches!(
            client.fetch_atis("LFPG", AtisRole::Departure).await,
            Err(BriefingError::ParseError { .. })
        ));
    }
}
