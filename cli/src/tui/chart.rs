use ratatui::{
    layout::Rect as Area,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Block, BorderType, Borders,
    },
    Frame,
};
use robodash_core::chart::{Point, Rect, Series, TextAnchor, TextRole};
use robodash_core::{render_bar_chart, ChartArea, ChartData, ChartGeometry, DrawSurface, Legend};
use unicode_width::UnicodeWidthStr;

use crate::tui::ui::THEME;

/// Adapts the logical chart canvas (origin top-left, y down) to a ratatui
/// canvas (origin bottom-left, y up).
struct CanvasSurface<'c, 'a> {
    ctx: &'c mut Context<'a>,
    height: f64,
    /// Logical units covered by one terminal column.
    units_per_col: f64,
    /// Horizontal distance between the vertical strokes that fill a bar.
    fill_step: f64,
}

impl CanvasSurface<'_, '_> {
    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }
}

fn series_color(series: Series) -> Color {
    match series {
        Series::First => THEME.success,
        Series::Second => THEME.failure,
    }
}

fn role_style(role: TextRole) -> Style {
    match role {
        TextRole::Value => Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
        TextRole::Category | TextRole::Legend => Style::default().fg(THEME.text),
        TextRole::Axis => Style::default().fg(THEME.muted),
        TextRole::Placeholder => Style::default().fg(THEME.muted).add_modifier(Modifier::ITALIC),
    }
}

impl DrawSurface for CanvasSurface<'_, '_> {
    fn line(&mut self, from: Point, to: Point) {
        let line = CanvasLine {
            x1: from.x,
            y1: self.flip(from.y),
            x2: to.x,
            y2: self.flip(to.y),
            color: THEME.muted,
        };
        self.ctx.draw(&line);
    }

    fn fill_rect(&mut self, rect: Rect, series: Series) {
        let color = series_color(series);
        let (top, bottom) = (self.flip(rect.y), self.flip(rect.y + rect.height));
        let mut x = rect.x;
        while x <= rect.x + rect.width {
            self.ctx.draw(&CanvasLine {
                x1: x,
                y1: bottom,
                x2: x,
                y2: top,
                color,
            });
            x += self.fill_step;
        }
    }

    fn text(&mut self, at: Point, text: &str, anchor: TextAnchor, role: TextRole) {
        let width = text.width() as f64 * self.units_per_col;
        let x = match anchor {
            TextAnchor::Start => at.x,
            TextAnchor::Middle => at.x - width / 2.0,
            TextAnchor::End => at.x - width,
        };
        let y = self.flip(at.y);
        self.ctx
            .print(x.max(0.0), y, Span::styled(text.to_string(), role_style(role)));
    }
}

pub fn draw_bar_chart(
    f: &mut Frame,
    area: Area,
    title: &str,
    chart_area: ChartArea,
    data: &ChartData,
    legend: &Legend<'_>,
) {
    let geometry = ChartGeometry::compute(chart_area, data);
    let cols = f64::from(area.width.saturating_sub(2).max(1));
    let units_per_col = chart_area.width / cols;
    // braille cells are two dots wide
    let fill_step = (units_per_col / 2.0).max(0.5);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, chart_area.width])
        .y_bounds([0.0, chart_area.height])
        .paint(|ctx| {
            let mut surface = CanvasSurface {
                ctx,
                height: chart_area.height,
                units_per_col,
                fill_step,
            };
            render_bar_chart(&mut surface, &geometry, legend);
        });

    f.render_widget(canvas, area);
}
