use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use webbrowser::Browser;

use threestyle::{
    app::App,
    clock::TimeSource,
    session::{SessionPhase, TrialResult, Verdict},
    store::ResultStore,
    util::format_secs,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// Borrowed view of the app for rendering
pub struct PracticeView<'a, S: ResultStore, T: TimeSource>(pub &'a App<S, T>);

fn instructions(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "Press N To Start A Session",
        SessionPhase::AwaitingStart | SessionPhase::Paused => "Press Space To Start Next Pair",
        SessionPhase::Running => "Press Space When Finished",
        SessionPhase::AwaitingVerdict => {
            "Press C for correct, W for wrong and S for showing the correct algorithm (do this before judging the attempt)"
        }
        SessionPhase::Finished => "The Test Is Over",
    }
}

fn result_line(index: usize, result: &TrialResult) -> Line<'static> {
    let verdict_style = match result.verdict {
        Verdict::Correct => Style::default().fg(Color::Green),
        Verdict::Wrong => Style::default().fg(Color::Red),
        Verdict::Pending => Style::default().add_modifier(Modifier::DIM),
    };
    Line::from(vec![
        Span::raw(format!(
            "{}. {}: {} - ",
            index + 1,
            result.pair_id,
            format_secs(result.elapsed_ms)
        )),
        Span::styled(result.verdict.to_string(), verdict_style),
        Span::raw(format!(". Algorithm: {}", result.algorithm)),
    ])
}

impl<S: ResultStore, T: TimeSource> Widget for PracticeView<'_, S, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let session = &app.session;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let magenta_style = Style::default().fg(Color::Magenta);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1), // timer
                    Constraint::Length(1), // pair
                    Constraint::Length(1), // revealed algorithm
                    Constraint::Length(2), // instructions
                    Constraint::Min(3),    // results
                    Constraint::Length(2), // verification
                    Constraint::Length(7), // summary
                    Constraint::Length(1), // status
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        let (judged, total) = session.progress();
        Paragraph::new(Span::styled(
            format!("{:.3}", session.clock().elapsed_secs()),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let pair = session
            .current_pair()
            .map(|p| format!("{p}   ({judged}/{total})"))
            .unwrap_or_default();
        Paragraph::new(Span::styled(pair, magenta_style.patch(bold_style)))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        if let Some(alg) = &app.revealed {
            Paragraph::new(Span::styled(alg.clone(), bold_style))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
        }

        Paragraph::new(Span::styled(instructions(session.phase()), italic_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        // Newest results at the bottom of the visible window
        let results = session.results();
        let visible = chunks[4].height as usize;
        let first = results.len().saturating_sub(visible);
        let lines: Vec<Line> = results[first..]
            .iter()
            .enumerate()
            .map(|(i, result)| result_line(first + i, result))
            .collect();
        Paragraph::new(lines).render(chunks[4], buf);

        let verification = session.verification_sequence();
        if !verification.is_empty() {
            Paragraph::new(Span::styled(
                format!("Verification Algorithm: {verification}"),
                dim_bold_style,
            ))
            .wrap(Wrap { trim: true })
            .render(chunks[5], buf);
        }

        if let Some(summary) = session.summary() {
            Paragraph::new(summary.to_string())
                .style(Style::default().fg(Color::Cyan))
                .render(chunks[6], buf);
        }

        if let Some(status) = &app.status {
            Paragraph::new(Span::styled(
                status.clone(),
                Style::default().fg(Color::Yellow),
            ))
            .render(chunks[7], buf);
        }

        let legend = if Browser::is_available() {
            "(n)ew / (v)erify / (esc)ape"
        } else {
            "(n)ew / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[8], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_phase_has_instructions() {
        for phase in [
            SessionPhase::Idle,
            SessionPhase::AwaitingStart,
            SessionPhase::Running,
            SessionPhase::AwaitingVerdict,
            SessionPhase::Paused,
            SessionPhase::Finished,
        ] {
            assert!(!instructions(phase).is_empty());
        }
    }

    #[test]
    fn result_line_reads_like_results_panel() {
        let result = TrialResult {
            pair_id: "AB".into(),
            algorithm: "[R, U]".into(),
            elapsed_ms: 2345,
            verdict: Verdict::Wrong,
        };
        let text: String = result_line(0, &result)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "1. AB: 2.345 - Wrong. Algorithm: [R, U]");
    }
}
