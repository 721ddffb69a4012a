use dashboard_core::{CurrentConditions, DailyPoint, DashboardState};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{Axis, Block, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget},
};

const TITLE: &str = "Weather Dashboard";
const LOADING: &str = "Loading...";
const CURRENT_HEIGHT: u16 = 4;
const CHART_HEIGHT: u16 = 14;

/// Draw the dashboard into an off-screen buffer and return it as text lines.
pub fn render_lines(state: &DashboardState, width: u16) -> Vec<String> {
    let mut height = 1;
    if state.is_loading() {
        height += 2;
    }
    if state.current().is_some() {
        height += 1 + CURRENT_HEIGHT;
    }
    if state.show_forecast_panel() {
        height += 1 + CHART_HEIGHT;
    }

    let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
    let mut y = 0;

    Paragraph::new(Line::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)))
        .render(Rect::new(0, y, width, 1), &mut buf);
    y += 1;

    if state.is_loading() {
        Paragraph::new(LOADING).render(Rect::new(0, y + 1, width, 1), &mut buf);
        y += 2;
    }

    if let Some(current) = state.current() {
        current_panel(current).render(Rect::new(0, y + 1, width, CURRENT_HEIGHT), &mut buf);
        y += 1 + CURRENT_HEIGHT;
    }

    if state.show_forecast_panel() {
        let data: Vec<(f64, f64)> =
            state.daily().iter().enumerate().map(|(i, p)| (i as f64, p.temperature_c)).collect();
        forecast_chart(state.daily(), &data)
            .render(Rect::new(0, y + 1, width, CHART_HEIGHT), &mut buf);
    }

    buffer_lines(&buf)
}

fn current_panel(current: &CurrentConditions) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(format!("Temperature: {}°C", current.temperature_c)),
        Line::from(format!("Condition: {}", current.condition)),
    ])
    .block(Block::bordered().title(format!("Current Weather in {}", current.location_name)))
}

fn forecast_chart<'a>(points: &[DailyPoint], data: &'a [(f64, f64)]) -> Chart<'a> {
    let (lo, hi) = temperature_bounds(points);
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let dataset = Dataset::default()
        .name("Temperature (°C)")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Blue))
        .data(data);

    Chart::new(vec![dataset])
        .block(Block::bordered().title("5-Day Forecast"))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(points.iter().map(|p| p.label.clone()).collect::<Vec<_>>()),
        )
        .y_axis(
            Axis::default()
                .bounds([lo, hi])
                .labels(vec![format!("{lo:.0}"), format!("{hi:.0}")]),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
}

/// Whole-degree y-axis range with at least one degree of headroom on each side.
fn temperature_bounds(points: &[DailyPoint]) -> (f64, f64) {
    let min = points.iter().map(|p| p.temperature_c).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.temperature_c).fold(f64::NEG_INFINITY, f64::max);
    ((min - 1.0).floor(), (max + 1.0).ceil())
}

fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let width = usize::from(buf.area.width.max(1));
    buf.content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>().trim_end().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::{SearchError, SearchOutcome};

    fn outcome(daily: usize) -> SearchOutcome {
        SearchOutcome {
            current: CurrentConditions {
                location_name: "London".into(),
                temperature_c: 14.2,
                condition: "light rain".into(),
            },
            daily: (1..=daily as u32)
                .map(|d| {
                    let date = NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
                    DailyPoint {
                        date,
                        label: date.format("%-m/%-d/%Y").to_string(),
                        temperature_c: 10.0 + d as f64,
                    }
                })
                .collect(),
        }
    }

    fn text(state: &DashboardState) -> String {
        render_lines(state, 72).join("\n")
    }

    #[test]
    fn idle_screen_is_just_the_title() {
        let lines = render_lines(&DashboardState::default(), 72);
        assert_eq!(lines, vec![TITLE.to_string()]);
    }

    #[test]
    fn loading_screen_shows_indicator_only() {
        let (state, _) = DashboardState::default().begin_search();
        let out = text(&state);

        assert!(out.contains("Loading..."));
        assert!(!out.contains("Current Weather"));
    }

    #[test]
    fn success_shows_current_panel_and_chart() {
        let (state, id) = DashboardState::default().begin_search();
        let state = state.complete(id, Ok(outcome(5)));
        let out = text(&state);

        assert!(out.contains("Current Weather in London"));
        assert!(out.contains("Temperature: 14.2°C"));
        assert!(out.contains("Condition: light rain"));
        assert!(out.contains("5-Day Forecast"));
        assert!(!out.contains("Loading..."));
    }

    #[test]
    fn empty_daily_points_hide_the_chart() {
        let (state, id) = DashboardState::default().begin_search();
        let state = state.complete(id, Ok(outcome(0)));
        let out = text(&state);

        assert!(out.contains("Current Weather in London"));
        assert!(!out.contains("5-Day Forecast"));
    }

    #[test]
    fn single_point_chart_still_renders() {
        let (state, id) = DashboardState::default().begin_search();
        let state = state.complete(id, Ok(outcome(1)));
        assert!(text(&state).contains("5-Day Forecast"));
    }

    #[test]
    fn failed_search_renders_blank_dashboard() {
        let (state, id) = DashboardState::default().begin_search();
        let state = state.complete(id, Err(SearchError::CityNotFound { city: "X".into() }));

        assert_eq!(render_lines(&state, 72), vec![TITLE.to_string()]);
    }

    #[test]
    fn bounds_pad_flat_series() {
        let points = outcome(1).daily;
        assert_eq!(temperature_bounds(&points), (10.0, 12.0));
    }
}
