use crate::interfaces::hud_interface::RaceState;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One CSV row per simulated tick.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TelemetryRow {
    pub tick: u64,
    pub racetime: f64,
    pub player_x: f64,
    pub player_y: f64,
    pub player_heading: f64,
    pub player_speed: f64,
    pub player_health: f64,
    pub player_damage: u32,
    pub on_track: bool,
    pub lap_valid: bool,
    pub laps: u32,
    pub ai_x: f64,
    pub ai_y: f64,
    pub ai_heading: f64,
    pub ai_speed: f64,
    pub ai_damage: u32,
    pub ai_target_index: usize,
}

impl From<&RaceState> for TelemetryRow {
    fn from(state: &RaceState) -> Self {
        TelemetryRow {
            tick: state.tick,
            racetime: state.racetime,
            player_x: state.player.x,
            player_y: state.player.y,
            player_heading: state.player.heading,
            player_speed: state.player.speed,
            player_health: state.health,
            player_damage: state.player.damage,
            on_track: state.on_track,
            lap_valid: state.lap_valid,
            laps: state.laps,
            ai_x: state.ai.x,
            ai_y: state.ai.y,
            ai_heading: state.ai.heading,
            ai_speed: state.ai.speed,
            ai_damage: state.ai.damage,
            ai_target_index: state.ai_target_index,
        }
    }
}

/// TelemetryWriter writes the race states to a CSV file with a header line.
pub struct TelemetryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl TelemetryWriter<File> {
    pub fn create(path: &Path) -> anyhow::Result<TelemetryWriter<File>> {
        let writer = csv::Writer::from_path(path).context(format!(
            "Failed to create telemetry file {}!",
            path.display()
        ))?;
        Ok(TelemetryWriter { writer })
    }
}

impl<W: Write> TelemetryWriter<W> {
    pub fn from_writer(inner: W) -> TelemetryWriter<W> {
        TelemetryWriter {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn write(&mut self, state: &RaceState) -> anyhow::Result<()> {
        self.writer
            .serialize(TelemetryRow::from(state))
            .context("Failed to write telemetry row!")?;
        Ok(())
    }

    /// finish flushes the CSV and returns the inner writer.
    pub fn finish(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush telemetry: {}", e.error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let mut telemetry = TelemetryWriter::from_writer(Vec::new());
        for tick in 1..=2 {
            let state = RaceState {
                tick,
                on_track: true,
                ..RaceState::default()
            };
            telemetry.write(&state).unwrap();
        }

        let csv = String::from_utf8(telemetry.finish().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("tick,racetime,player_x"));
        assert!(lines[1].starts_with("1,0.0,"));
        assert!(lines[2].starts_with("2,0.0,"));
    }
}
