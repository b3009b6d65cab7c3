//! Briefing aggregation.
//!
//! [`Aggregator::run`] fetches the latest plan, then the METAR and ATIS for
//! both ends of it, and folds everything into a [`Briefing`]. The plan is
//! the only fatal step: every weather/ATIS failure is kept on its field.

use crate::atis::VatsimClient;
use crate::config::{AppSettings, Credentials};
use crate::error::BriefingError;
use crate::http::{HttpFetch, ReqwestFetcher};
use crate::metar::AvwxClient;
use crate::models::{AtisReport, AtisRole, FlightPlan, WeatherReport};
use crate::simbrief::SimbriefClient;
use chrono::{DateTime, Local, Utc};
use std::future::Future;
use tracing::{info, warn};

pub trait PlanSource: Send + Sync {
    fn latest_plan(&self, username: &str) -> impl Future<Output = Result<FlightPlan, BriefingError>> + Send;
}

pub trait MetarSource: Send + Sync {
    fn metar(&self, icao: &str, api_token: &str) -> impl Future<Output = Result<WeatherReport, BriefingError>> + Send;
}

pub trait AtisSource: Send + Sync {
    fn atis(&self, icao: &str, role: AtisRole) -> impl Future<Output = Result<AtisReport, BriefingError>> + Send;
}

impl<H: HttpFetch> PlanSource for SimbriefClient<H> {
    async fn latest_plan(&self, username: &str) -> Result<FlightPlan, BriefingError> {
        self.fetch_latest_plan(username).await
    }
}

impl<H: HttpFetch> MetarSource for AvwxClient<H> {
    async fn metar(&self, icao: &str, api_token: &str) -> Result<WeatherReport, BriefingError> {
        self.fetch_metar(icao, api_token).await
    }
}

impl<H: HttpFetch> AtisSource for VatsimClient<H> {
    async fn atis(&self, icao: &str, role: AtisRole) -> Result<AtisReport, BriefingError> {
        self.fetch_atis(icao, role).await
    }
}

/// Weather and ATIS for one end of the flight.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportBriefing {
    pub icao: String,
    pub role: AtisRole,
    pub metar: Result<WeatherReport, BriefingError>,
    pub atis: Result<AtisReport, BriefingError>,
}

impl AirportBriefing {
    fn to_text(&self) -> String {
        let atis = match &self.atis {
            Ok(report) if report.text.is_empty() => format!("{} (no text published)", report.facility_id),
            Ok(report) => report.text.clone(),
            Err(e) => e.to_string(),
        };
        let (metar, rules) = match &self.metar {
            Ok(report) => (
                report.raw_text.clone(),
                report.flight_rules.clone().unwrap_or_else(|| "-".to_string()),
            ),
            Err(e) => (e.to_string(), "-".to_string()),
        };

        format!(
            "ICAO: {}\n\nVatsim ATIS: {}\nMETAR: {}\nFlight rules: {}",
            self.icao, atis, metar, rules
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Briefing {
    pub plan: FlightPlan,
    pub requested_at: DateTime<Utc>,
    pub departure: AirportBriefing,
    pub arrival: AirportBriefing,
}

impl Briefing {
    /// Number of METAR/ATIS fields that came back successfully (0..=4).
    pub fn available_fields(&self) -> usize {
        [&self.departure, &self.arrival]
            .iter()
            .map(|a| a.metar.is_ok() as usize + a.atis.is_ok() as usize)
            .sum()
    }

    /// Plain-text rendition for stdout and the log.
    pub fn to_text(&self) -> String {
        let plan = &self.plan;
        let mut header = format!(
            "Request time: {}\n\nFlight: {} {} -> {}",
            self.requested_at.with_timezone(&Local).format("%H:%M"),
            plan.callsign().unwrap_or_else(|| "-".to_string()),
            plan.origin_icao,
            plan.destination_icao
        );
        if let Some(aircraft) = &plan.aircraft_icao {
            header.push_str(&format!(" ({})", aircraft));
        }
        if let Some(route) = &plan.route {
            header.push_str(&format!("\nRoute: {}", route));
        }

        let line_separator = "-".repeat(100);
        format!(
            "{}\n\n{}\n\n{}\n\n{}\n",
            header,
            self.departure.to_text(),
            line_separator,
            self.arrival.to_text()
        )
    }
}

/// Orchestrates the three sources for one briefing run.
pub struct Aggregator<P, M, A> {
    plans: P,
    metars: M,
    atis: A,
}

pub type LiveAggregator =
    Aggregator<SimbriefClient<ReqwestFetcher>, AvwxClient<ReqwestFetcher>, VatsimClient<ReqwestFetcher>>;

impl LiveAggregator {
    /// Builds the production clients from the endpoint settings.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, BriefingError> {
        let http = ReqwestFetcher::new(settings.request_timeout_seconds)?;
        let endpoints = &settings.endpoints;
        Ok(Aggregator::new(
            SimbriefClient::new(http.clone(), endpoints.simbrief_url.clone()),
            AvwxClient::new(http.clone(), endpoints.avwx_url.clone()),
            VatsimClient::new(http, endpoints.vatsim_url.clone()),
        ))
    }
}

impl<P: PlanSource, M: MetarSource, A: AtisSource> Aggregator<P, M, A> {
    pub fn new(plans: P, metars: M, atis: A) -> Self {
        Self { plans, metars, atis }
    }

    /// Runs one briefing.
    ///
    /// Only a failed plan fetch is returned as `Err`; in that case no METAR
    /// or ATIS request is made.
    pub async fn run(&self, credentials: &Credentials) -> Result<Briefing, BriefingError> {
        let requested_at = Utc::now();

        let plan = match self.plans.latest_plan(&credentials.simbrief_username).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Flight plan fetch failed: {}", e);
                return Err(e);
            }
        };

        let origin = plan.origin_icao.as_str();
        let destination = plan.destination_icao.as_str();
        let token = credentials.api_token.as_str();

        let (dep_metar, arr_metar, dep_atis, arr_atis) = tokio::join!(
            self.metars.metar(origin, token),
            self.metars.metar(destination, token),
            self.atis.atis(origin, AtisRole::Departure),
            self.atis.atis(destination, AtisRole::Arrival),
        );

        let briefing = Briefing {
            departure: AirportBriefing {
                icao: origin.to_string(),
                role: AtisRole::Departure,
                metar: dep_metar,
                atis: dep_atis,
            },
            arrival: AirportBriefing {
                icao: destination.to_string(),
                role: AtisRole::Arrival,
                metar: arr_metar,
                atis: arr_atis,
            },
            requested_at,
            plan,
        };

        info!(
            "Briefing {} -> {} ready, {}/4 fields available",
            briefing.departure.icao,
            briefing.arrival.icao,
            briefing.available_fields()
        );
        Ok(briefing)
    }
}
