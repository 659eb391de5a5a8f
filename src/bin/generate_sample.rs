use std::path::PathBuf;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const PLAY_TYPES: [&str; 5] = ["run", "pass", "punt", "field_goal", "kickoff"];

const HEADER: [&str; 11] = [
    "game_id",
    "play_id",
    "quarter",
    "down",
    "yards_gained",
    "epa",
    "play_type",
    "scoring_play",
    "penalty_yards",
    "weather",
    "drive",
];

/// Writes a synthetic play-by-play CSV covering every column type the
/// importer infers: integer, float, boolean, text, mixed and all-empty.
fn main() -> Result<()> {
    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_plays.csv"));

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    writer.write_record(HEADER).context("writing header")?;

    let mut rows = 0usize;
    for game_id in 1..=4i64 {
        let mut drive = 1;
        for play_id in 1..=60i64 {
            let quarter = (play_id - 1) / 15 + 1;
            let play_type = PLAY_TYPES[rng.range(0, PLAY_TYPES.len() as i64 - 1) as usize];
            let down = if play_type == "kickoff" {
                String::new()
            } else {
                rng.range(1, 4).to_string()
            };
            let yards = match play_type {
                "run" => rng.range(-4, 25),
                "pass" => rng.range(0, 45),
                _ => 0,
            };
            let epa = (rng.next_f64() * 6.0 - 3.0) * 100.0;
            let scoring = play_type == "field_goal" || (yards > 20 && rng.chance(0.3));
            let penalty = if rng.chance(0.1) {
                (rng.range(1, 3) * 5).to_string()
            } else {
                String::new()
            };
            if play_type == "punt" || scoring {
                drive += 1;
            }
            // Overtime drives carry a label, which keeps this column text.
            let drive_label = if quarter == 4 && play_id == 60 {
                "OT".to_string()
            } else {
                drive.to_string()
            };

            writer
                .write_record([
                    game_id.to_string(),
                    play_id.to_string(),
                    quarter.to_string(),
                    down,
                    yards.to_string(),
                    format!("{:.2}", epa.round() / 100.0),
                    play_type.to_string(),
                    if scoring { "True" } else { "False" }.to_string(),
                    penalty,
                    String::new(),
                    drive_label,
                ])
                .with_context(|| format!("writing row {rows}"))?;
            rows += 1;
        }
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {rows} plays to {}", output_path.display());
    Ok(())
}
