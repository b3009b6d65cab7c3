use crate::error::BriefingError;
use crate::http::HttpFetch;
use crate::models::{AvwxMetar, WeatherReport};
use chrono::Utc;
use tracing::{info, warn};

/// Four ASCII letters or digits. Anything else never reaches AVWX.
pub fn is_valid_icao(icao: &str) -> bool {
    icao.len() == 4 && icao.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Current METAR from the AVWX REST API.
pub struct AvwxClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpFetch> AvwxClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_metar(&self, icao: &str, api_token: &str) -> Result<WeatherReport, BriefingError> {
        let icao = icao.trim().to_uppercase();
        if !is_valid_icao(&icao) {
            return Err(BriefingError::StationNotFound { icao });
        }
        if api_token.trim().is_empty() {
            return Err(BriefingError::AuthError);
        }

        let url = format!("{}/metar/{}", self.base_url.trim_end_matches('/'), icao);
        info!("Calling AVWX API for {}", icao);
        let response = self.http.get(&url, Some(api_token.trim())).await?;

        match response.status {
            200 => {}
            // AVWX answers 204 when the station has no current report.
            204 | 400 | 404 => {
                warn!(status = response.status, "AVWX has no METAR for {}", icao);
                return Err(BriefingError::StationNotFound { icao });
            }
            401 | 403 => {
                warn!(status = response.status, "AVWX rejected token");
                return Err(BriefingError::AuthError);
            }
            status => {
                return Err(BriefingError::NetworkError(format!("HTTP {} from AVWX", status)));
            }
        }

        let metar: AvwxMetar =
            serde_json::from_str(&response.body).map_err(|e| BriefingError::parse("AVWX", e))?;
        if metar.raw.trim().is_empty() {
            return Err(BriefingError::StationNotFound { icao });
        }

        info!("Got METAR for {}", icao);
        Ok(WeatherReport {
            icao: metar.station.map(|s| s.to_uppercase()).unwrap_or(icao),
            raw_text: metar.raw.trim().to_string(),
            flight_rules: metar.flight_rules.filter(|r| !r.is_empty()),
            fetched_at: Utc::now(),
        })
    }
}
