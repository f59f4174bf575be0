// Output formatting for classified results: CSV export and a plain-text
// table for the terminal.

use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

use startcast_engine::ClassifiedResult;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    rank: usize,
    team: &'a str,
    tier: String,
    score: f64,
    points: f64,
    pitching: f64,
    batting: Option<f64>,
    hits: f64,
    walks: f64,
    strikeouts: f64,
    home_runs: f64,
    runs: f64,
    wins: f64,
    losses: f64,
}

impl<'a> From<&'a ClassifiedResult> for ExportRow<'a> {
    fn from(r: &'a ClassifiedResult) -> Self {
        let c = &r.result.counts;
        ExportRow {
            rank: r.rank,
            team: &c.team,
            tier: r.tier.to_string(),
            score: (r.score * 1000.0).round() / 1000.0,
            points: r.result.total_points,
            pitching: r.result.pitching_points,
            batting: r.result.batting_points,
            hits: c.hits,
            walks: c.walks,
            strikeouts: c.strikeouts,
            home_runs: c.home_runs,
            runs: c.runs,
            wins: c.wins,
            losses: c.losses,
        }
    }
}

/// Write results as CSV with a header row. `batting` is blank when batting
/// points are not scored.
pub fn write_csv<W: Write>(results: &[ClassifiedResult], out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for r in results {
        writer.serialize(ExportRow::from(r))?;
    }
    writer.flush()?;
    Ok(())
}

/// Fixed-width table, one line per team.
pub fn render_table(results: &[ClassifiedResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<5} {:<26} {:>8} {:>9}  {:>5} {:>5} {:>5} {:>5} {:>5}",
        "#", "Team", "Name", "Points", "Tier", "H", "BB", "K", "HR", "R"
    );
    for r in results {
        let c = &r.result.counts;
        let _ = writeln!(
            out,
            "{:>4}  {:<5} {:<26} {:>8.2} {:>9}  {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>5.2}",
            r.rank,
            c.team,
            truncate(&c.team_name, 26),
            r.result.total_points,
            r.tier.to_string(),
            c.hits,
            c.walks,
            c.strikeouts,
            c.home_runs,
            c.runs,
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).chain(std::iter::once('…')).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use startcast_engine::stats::{PerNineRates, SplitStats};
    use startcast_engine::{
        project_all, Handedness, LeagueLabel, PitchingEvent, ProjectionRequest, ScoringWeights,
        TeamSplitStats,
    };

    fn team(abbr: &str, name: &str, h9: f64) -> TeamSplitStats {
        let split = SplitStats {
            era: 4.0,
            per_nine: PerNineRates {
                hits: h9,
                walks: 3.0,
                strikeouts: 9.0,
                home_runs: 1.0,
            },
            ..SplitStats::default()
        };
        TeamSplitStats {
            abbreviation: abbr.into(),
            name: name.into(),
            total_plate_appearances: None,
            games_played: None,
            vs_lefty: split.clone(),
            vs_righty: split,
        }
    }

    fn results() -> Vec<ClassifiedResult> {
        let weights = ScoringWeights::new()
            .with_pitching(PitchingEvent::Inning, 3.0)
            .with_pitching(PitchingEvent::Walk, -1.0)
            .with_pitching(PitchingEvent::EarnedRun, -1.0)
            .with_pitching(PitchingEvent::HitAllowed, -1.0)
            .with_pitching(PitchingEvent::HomeRunAllowed, -1.0)
            .with_pitching(PitchingEvent::Strikeout, 1.0);
        let request =
            ProjectionRequest::new(Handedness::Lefty, 6, weights, LeagueLabel::preset("Custom"));
        let teams = vec![
            team("SEA", "Seattle Mariners", 9.0),
            team("COL", "Colorado Rockies", 12.0),
        ];
        project_all(&request, &teams).unwrap().results
    }

    #[test]
    fn csv_has_header_and_one_row_per_team() {
        let mut buf = Vec::new();
        write_csv(&results(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "rank,team,tier,score,points,pitching,batting,hits,walks,strikeouts,home_runs,runs,wins,losses"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,SEA,excellent,1.0,12.67,12.67,,6.0,"));
        assert!(lines[2].starts_with("2,COL,poor,0.0,"));
    }

    #[test]
    fn table_lists_teams_in_rank_order() {
        let table = render_table(&results());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("SEA"));
        assert!(lines[1].contains("Seattle Mariners"));
        assert!(lines[1].contains("12.67"));
        assert!(lines[2].contains("COL"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("Abcdefghij", 5).chars().count(), 5);
    }
}
