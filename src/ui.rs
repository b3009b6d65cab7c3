//! TUI rendering for the briefing
//!
//! This module handles all UI rendering logic using the `ratatui` crate:
//! the briefing view (flight plan header plus one panel per airport) and
//! the settings view that edits `userdata.json`.

use crate::app::{App, ViewMode};
use crate::briefing::{AirportBriefing, Briefing};
use crate::config::CREDENTIALS_FILE;
use crate::models::AtisRole;
use chrono::Local;
use ratatui::{prelude::*, widgets::*};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Renders one frame of the TUI based on current application state.
pub fn render(f: &mut Frame, app: &App) {
    match app.view_mode {
        ViewMode::Briefing => render_briefing_view(f, app),
        ViewMode::Settings => render_settings_view(f, app),
    }
}

/// Briefing view: plan header, departure/arrival panels side by side, and
/// a one-line status/help footer.
///
/// Without a briefing the body shows the fatal error of the last run, or a
/// hint to press `r`.
fn render_briefing_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    match &app.briefing {
        Some(briefing) => {
            render_plan_header(f, briefing, chunks[0]);

            let panels = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);
            render_airport_panel(f, &briefing.departure, panels[0]);
            render_airport_panel(f, &briefing.arrival, panels[1]);
        }
        None => {
            let (text, style) = match &app.last_error {
                Some(e) => (e.to_string(), Style::default().fg(Color::Red)),
                None if app.is_fetching => (String::new(), Style::default()),
                None => (
                    "Press r to fetch your latest SimBrief plan.".to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            };
            let p = Paragraph::new(text)
                .style(style)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title(" Briefing ")
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded),
                );
            let body = Rect {
                y: chunks[0].y,
                height: chunks[0].height + chunks[1].height,
                ..chunks[0]
            };
            f.render_widget(p, body);
        }
    }

    let status = if app.is_fetching {
        Span::styled(
            format!(" {} Fetching...", SPINNER[app.tick_count % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::raw("")
    };
    let footer = Paragraph::new(Line::from(vec![
        status,
        Span::styled(
            "   r Refresh   s Settings   q Quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    f.render_widget(footer, chunks[2]);
}

fn render_plan_header(f: &mut Frame, briefing: &Briefing, area: Rect) {
    let plan = &briefing.plan;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let endpoint = |icao: &str, name: &Option<String>| match name {
        Some(n) => format!("{} ({})", icao, n),
        None => icao.to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Flight:   ", bold),
            Span::styled(
                plan.callsign().unwrap_or_else(|| "-".to_string()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("  │  "),
            Span::styled("Aircraft: ", bold),
            Span::raw(format!(
                "{} {}",
                plan.aircraft_icao.as_deref().unwrap_or("---"),
                plan.aircraft_name.as_deref().unwrap_or("")
            )),
            Span::raw("  │  "),
            Span::styled("Cruise: ", bold),
            Span::raw(plan.cruise_altitude.as_deref().unwrap_or("---").to_string()),
        ]),
        Line::from(vec![
            Span::styled("From:     ", bold),
            Span::styled(endpoint(&plan.origin_icao, &plan.origin_name), Style::default().fg(Color::Cyan)),
            Span::raw("  →  "),
            Span::styled(
                endpoint(&plan.destination_icao, &plan.destination_name),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(vec![
            Span::styled("Route:    ", bold),
            Span::raw(plan.route.as_deref().unwrap_or("---").to_string()),
        ]),
    ];

    let title = format!(
        " Flight Plan · requested {} ",
        briefing.requested_at.with_timezone(&Local).format("%H:%M")
    );
    let p = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(p, area);
}

fn render_airport_panel(f: &mut Frame, airport: &AirportBriefing, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let unavailable = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled("METAR", bold)));
    match &airport.metar {
        Ok(report) => {
            lines.push(Line::from(report.raw_text.as_str()));
            let rules = report.flight_rules.as_deref().unwrap_or("---");
            lines.push(Line::from(vec![
                Span::raw("Flight rules: "),
                Span::styled(rules, Style::default().fg(flight_rules_color(rules)).add_modifier(Modifier::BOLD)),
            ]));
        }
        Err(e) => lines.push(Line::from(Span::styled(e.label(), unavailable))),
    }

    lines.push(Line::from(""));
    match &airport.atis {
        Ok(report) => {
            let mut header = vec![Span::styled(format!("ATIS {}", report.facility_id), bold)];
            if let Some(freq) = &report.frequency {
                header.push(Span::raw(format!("  {}", freq)));
            }
            if let Some(code) = &report.code {
                header.push(Span::styled(
                    format!("  Information {}", code),
                    Style::default().fg(Color::Yellow),
                ));
            }
            lines.push(Line::from(header));
            if report.text.is_empty() {
                lines.push(Line::from(Span::styled("(no text published)", unavailable)));
            }
            lines.extend(report.text.lines().map(|l| Line::from(l.to_string())));
        }
        Err(e) => {
            lines.push(Line::from(Span::styled("ATIS", bold)));
            lines.push(Line::from(Span::styled(e.label(), unavailable)));
        }
    }

    let role = match airport.role {
        AtisRole::Departure => "Departure",
        AtisRole::Arrival => "Arrival",
    };
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(format!(" {} {} ", role, airport.icao))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .padding(Padding::horizontal(1)),
    );
    f.render_widget(p, area);
}

/// Settings view: edits the credentials draft. ↑/↓ select, type to edit,
/// Enter saves, Esc goes back.
fn render_settings_view(f: &mut Frame, app: &App) {
    let area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    let title = Paragraph::new(" Settings ")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let sel = app.settings_selected_index;
    let rows = [
        (0, "SimBrief username ", app.draft.simbrief_username.clone()),
        (1, "AVWX API token    ", mask_token(&app.draft.api_token, sel == 1)),
    ];
    let items: Vec<Line> = rows
        .iter()
        .map(|(idx, label, value)| {
            let style = if *idx == sel {
                Style::default()
                    .fg(Color::Cyan)
                    .bg(Color::Rgb(30, 30, 60))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let cursor = if *idx == sel { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("  {} ", label), style),
                Span::styled(format!("{}{}", value, cursor), style),
            ])
        })
        .collect();

    let block = Block::default()
        .title(format!(" {} ", CREDENTIALS_FILE))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);
    f.render_widget(Paragraph::new(items), inner);

    let help = Paragraph::new(" ↑/↓ select   type to edit   Backspace delete   Enter Save   Esc back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);

    if let Some(ref msg) = app.settings_message {
        let p = Paragraph::new(msg.as_str())
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(p, chunks[3]);
    }
}

/// Shows the token only while it is being edited.
fn mask_token(token: &str, editing: bool) -> String {
    if editing {
        token.to_string()
    } else {
        "*".repeat(token.chars().count())
    }
}

/// Conventional chart colors for VFR/MVFR/IFR/LIFR.
fn flight_rules_color(rules: &str) -> Color {
    match rules.to_uppercase().as_str() {
        "VFR" => Color::Green,
        "MVFR" => Color::Blue,
        "IFR" => Color::Red,
        "LIFR" => Color::Magenta,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::error::BriefingError;
    use crate::models::{AtisReport, FlightPlan, WeatherReport};
    use chrono::Utc;
    use ratatui::backend::TestBackend;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn briefing() -> Briefing {
        Briefing {
            plan: FlightPlan {
                origin_icao: "KJFK".into(),
                destination_icao: "EGLL".into(),
                origin_name: None,
                destination_name: None,
                airline: Some("BAW".into()),
                flight_number: Some("117".into()),
                aircraft_icao: Some("B77W".into()),
                aircraft_name: None,
                route: None,
                cruise_altitude: None,
            },
            requested_at: Utc::now(),
            departure: AirportBriefing {
                icao: "KJFK".into(),
                role: AtisRole::Departure,
                metar: Ok(WeatherReport {
                    icao: "KJFK".into(),
                    raw_text: "KJFK 191751Z 31012KT 10SM FEW250".into(),
                    flight_rules: Some("VFR".into()),
                    fetched_at: Utc::now(),
                }),
                atis: Ok(AtisReport {
                    icao: "KJFK".into(),
                    facility_id: "KJFK_D_ATIS".into(),
                    frequency: Some("135.900".into()),
                    code: Some("B".into()),
                    text: "KENNEDY DEPARTURE INFO B".into(),
                }),
            },
            arrival: AirportBriefing {
                icao: "EGLL".into(),
                role: AtisRole::Arrival,
                metar: Err(BriefingError::NetworkError("timeout".into())),
                atis: Err(BriefingError::AtisUnavailable { icao: "EGLL".into() }),
            },
        }
    }

    #[test]
    fn test_briefing_view_shows_both_airports() {
        let mut app = App::new();
        app.set_credentials(Credentials::new("pilot42", "tok"));
        app.briefing = Some(briefing());

        let screen = draw(&app);
        assert!(screen.contains("BAW117"));
        assert!(screen.contains("Departure KJFK"));
        assert!(screen.contains("Arrival EGLL"));
        assert!(screen.contains("KENNEDY DEPARTURE INFO B"));
        assert!(screen.contains("unavailable (network)"));
        assert!(screen.contains("no ATIS online"));
    }

    #[test]
    fn test_fatal_error_is_shown() {
        let mut app = App::new();
        app.set_credentials(Credentials::new("pilot42", "tok"));
        app.last_error = Some(BriefingError::NoPlanFound { username: "pilot42".into() });

        assert!(draw(&app).contains("no recent flight plan"));
    }

    #[test]
    fn test_settings_masks_unselected_token() {
        let mut app = App::new();
        app.set_credentials(Credentials::new("pilot42", "secret"));
        app.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('s'),
            crossterm::event::KeyModifiers::NONE,
        ));

        let screen = draw(&app);
        assert!(screen.contains("pilot42_"));
        assert!(screen.contains("******"));
        assert!(!screen.contains("secret"));
    }

    #[test]
    fn test_flight_rules_color() {
        assert_eq!(flight_rules_color("vfr"), Color::Green);
        assert_eq!(flight_rules_color("LIFR"), Color::Magenta);
        assert_eq!(flight_rules_color("---"), Color::White);
    }
}
