use ansi_term::Colour;

use crate::{
    tracker::summary::CategorySummary,
    utils::{percentage::duration_percentage, time::rounded_minutes},
};

/// `#0088FE #00C49F #FFBB28 #FF8042 #8884D8`, repeated by category index.
pub const PALETTE: [Colour; 5] = [
    Colour::RGB(0x00, 0x88, 0xFE),
    Colour::RGB(0x00, 0xC4, 0x9F),
    Colour::RGB(0xFF, 0xBB, 0x28),
    Colour::RGB(0xFF, 0x80, 0x42),
    Colour::RGB(0x88, 0x84, 0xD8),
];

pub const DEFAULT_CHART_WIDTH: usize = 60;

pub fn category_colour(index: usize) -> Colour {
    PALETTE[index % PALETTE.len()]
}

/// One proportional segment of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    pub category: &'a str,
    pub colour: Colour,
    pub width: usize,
    pub minutes: i64,
    pub percentage: f64,
}

/// Splits `width` cells between the categories proportionally to their totals. Rounding is
/// settled with the largest remainders so the segments always fill the whole width.
pub fn segments(summaries: &[CategorySummary], width: usize) -> Vec<Segment<'_>> {
    let total: i64 = summaries.iter().map(|s| s.total_duration).sum();
    if total <= 0 {
        return vec![];
    }

    let exact = summaries
        .iter()
        .map(|s| s.total_duration as f64 / total as f64 * width as f64)
        .collect::<Vec<_>>();
    let mut widths = exact.iter().map(|v| v.floor() as usize).collect::<Vec<_>>();

    let mut leftover = width.saturating_sub(widths.iter().sum());
    let mut by_remainder = (0..exact.len()).collect::<Vec<_>>();
    by_remainder.sort_by(|a, b| {
        let ra = exact[*a] - exact[*a].floor();
        let rb = exact[*b] - exact[*b].floor();
        rb.total_cmp(&ra)
    });
    for index in by_remainder {
        if leftover == 0 {
            break;
        }
        widths[index] += 1;
        leftover -= 1;
    }

    summaries
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (summary, width))| Segment {
            category: &summary.category,
            colour: category_colour(index),
            width,
            minutes: rounded_minutes(summary.total_duration),
            percentage: *duration_percentage(summary.total_duration, total),
        })
        .collect()
}

/// Renders the bar and a legend line per category.
pub fn render_distribution(summaries: &[CategorySummary], width: usize) -> String {
    let segments = segments(summaries, width);
    if segments.is_empty() {
        return "No completed entries yet.\n".into();
    }

    let mut output = String::new();
    for segment in &segments {
        output += &segment.colour.paint("█".repeat(segment.width)).to_string();
    }
    output.push('\n');

    for segment in &segments {
        output += &format!(
            "{} {}\t{} minutes\t{:.0}%\n",
            segment.colour.paint("■"),
            segment.category,
            segment.minutes,
            segment.percentage
        );
    }
    output
}
