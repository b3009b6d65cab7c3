use crate::error::BriefingError;
use crate::http::HttpFetch;
use crate::models::{text_at, FlightPlan};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

const SOURCE: &str = "SimBrief";

/// Fetches the latest OFP for a SimBrief user.
pub struct SimbriefClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpFetch> SimbriefClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn build_url(&self, username: &str) -> Result<String, BriefingError> {
        Url::parse_with_params(&self.base_url, &[("username", username), ("json", "1")])
            .map(String::from)
            .map_err(|e| {
                BriefingError::NetworkError(format!("Invalid SimBrief URL {}: {}", self.base_url, e))
            })
    }

    pub async fn fetch_latest_plan(&self, username: &str) -> Result<FlightPlan, BriefingError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(BriefingError::NoPlanFound {
                username: String::new(),
            });
        }

        info!("Calling SimBrief API for {}", username);
        let response = self.http.get(&self.build_url(username)?, None).await?;

        // SimBrief answers an unknown user, or a user without an OFP, with 400.
        if response.status == 400 {
            warn!(status = response.status, "SimBrief returned no plan");
            return Err(BriefingError::NoPlanFound {
                username: username.to_string(),
            });
        }
        if !response.is_success() {
            return Err(BriefingError::NetworkError(format!(
                "HTTP {} from SimBrief",
                response.status
            )));
        }

        let json: Value =
            serde_json::from_str(&response.body).map_err(|e| BriefingError::parse(SOURCE, e))?;

        if let Some(status) = text_at(&json, "/fetch/status") {
            if !status.eq_ignore_ascii_case("success") {
                debug!(status = %status, "SimBrief fetch status");
                return Err(BriefingError::NoPlanFound {
                    username: username.to_string(),
                });
            }
        }

        let plan = parse_plan(&json)?;
        info!(
            "Got flight plan {} -> {}",
            plan.origin_icao, plan.destination_icao
        );
        Ok(plan)
    }
}

fn parse_plan(json: &Value) -> Result<FlightPlan, BriefingError> {
    let icao = |pointer: &str, what: &str| {
        text_at(json, pointer)
            .map(|s| s.to_uppercase())
            .ok_or_else(|| BriefingError::parse(SOURCE, format!("missing {} ICAO", what)))
    };

    Ok(FlightPlan {
        origin_icao: icao("/origin/icao_code", "origin")?,
        destination_icao: icao("/destination/icao_code", "destination")?,
        origin_name: text_at(json, "/origin/name"),
        destination_name: text_at(json, "/destination/name"),
        airline: text_at(json, "/general/icao_airline"),
        flight_number: text_at(json, "/general/flight_number"),
        aircraft_icao: text_at(json, "/aircraft/icaocode"),
        aircraft_name: text_at(json, "/aircraft/name"),
        route: text_at(json, "/general/route"),
        cruise_altitude: text_at(json, "/general/initial_altitude"),
    })
}
