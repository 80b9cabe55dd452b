use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// `(NOC code, country name)`; includes the Olympic-only codes.
const NOCS: &[(&str, &str)] = &[
    ("USA", "United States"),
    ("CHN", "China"),
    ("JPN", "Japan"),
    ("FRA", "France"),
    ("GBR", "Great Britain"),
    ("AUS", "Australia"),
    ("KEN", "Kenya"),
    ("BRA", "Brazil"),
    ("CAN", "Canada"),
    ("NZL", "New Zealand"),
    ("ITA", "Italy"),
    ("KOR", "Korea"),
    ("AIN", "Individual Neutral Athletes"),
    ("EOR", "Refugee Olympic Team"),
];

/// `(sport, events, venue)`
const SPORTS: &[(&str, &[&str], &str)] = &[
    (
        "Athletics",
        &["Men's 100m", "Women's 100m", "Men's Marathon", "Women's Marathon"],
        "Stade de France",
    ),
    (
        "Swimming",
        &[
            "Men's 200m Freestyle",
            "Women's 200m Freestyle",
            "Mixed 4x100m Medley",
        ],
        "Paris La Defense Arena",
    ),
    (
        "Judo",
        &["Men -73 kg", "Women -57 kg", "Mixed Team"],
        "Champ-de-Mars Arena",
    ),
    (
        "Cycling Track",
        &["Men's Sprint", "Women's Keirin"],
        "Saint-Quentin-en-Yvelines Velodrome",
    ),
    (
        "Rowing",
        &["Men's Single Sculls", "Women's Eight"],
        "Vaires-sur-Marne Nautical Stadium",
    ),
];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Sam", "Jordan", "Kim", "Lee", "Noa", "Ari", "Yuki", "Rene", "Dana",
];
const LAST_NAMES: &[&str] = &[
    "Martin", "Tanaka", "Smith", "Okoye", "Silva", "Chen", "Rossi", "Brown", "Park", "Kariuki",
];
const MEDALS: [(&str, i64); 3] = [
    ("Gold Medal", 1),
    ("Silver Medal", 2),
    ("Bronze Medal", 3),
];

/// Date of the `day`-th day of the games, counting from 0.
fn games_day(day: usize) -> String {
    format!("2024-07-{:02}", 27 + day)
}

struct Athlete {
    name: String,
    gender: &'static str,
    noc: (&'static str, &'static str),
    sport: &'static str,
}

fn gender_of_event(event: &str, athlete_gender: &'static str) -> &'static str {
    if event.starts_with("Mixed") {
        "X"
    } else if athlete_gender == "Female" {
        "W"
    } else {
        "M"
    }
}

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("sample_data"), PathBuf::from);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // ---- Athletes ----
    let athletes: Vec<Athlete> = (0..120)
        .map(|i| {
            let gender = if i % 2 == 0 { "Male" } else { "Female" };
            Athlete {
                name: format!(
                    "{} {} {i}",
                    rng.pick(LAST_NAMES).to_uppercase(),
                    rng.pick(FIRST_NAMES)
                ),
                gender,
                noc: *rng.pick(NOCS),
                sport: rng.pick(SPORTS).0,
            }
        })
        .collect();

    let athlete_rows: Vec<Vec<String>> = athletes
        .iter()
        .map(|a| {
            vec![
                a.name.clone(),
                a.gender.to_string(),
                a.noc.0.to_string(),
                a.noc.1.to_string(),
                format!("['{}']", a.sport),
            ]
        })
        .collect();
    write_csv(
        &out_dir.join("athletes.csv"),
        &["name", "gender", "country_code", "country", "disciplines"],
        &athlete_rows,
    )?;

    // ---- Medals (Parquet) + medallists + totals ----
    let mut medal_cols: [Vec<String>; 8] = Default::default();
    let mut medal_codes: Vec<i64> = Vec::new();
    let mut medallist_rows = Vec::new();
    let mut totals: BTreeMap<&str, [i64; 3]> = BTreeMap::new();

    for (day, &(sport, events, _)) in SPORTS.iter().enumerate() {
        let entrants: Vec<&Athlete> = athletes.iter().filter(|a| a.sport == sport).collect();
        if entrants.is_empty() {
            continue;
        }
        for &event in events {
            for (rank, &(medal, code)) in MEDALS.iter().enumerate() {
                let winner = *rng.pick(&entrants);
                let gender = gender_of_event(event, winner.gender);
                let date = games_day(day + rng.below(2));
                for (col, value) in medal_cols.iter_mut().zip([
                    medal,
                    date.as_str(),
                    winner.name.as_str(),
                    gender,
                    sport,
                    event,
                    winner.noc.0,
                    winner.noc.1,
                ]) {
                    col.push(value.to_string());
                }
                medal_codes.push(code);
                medallist_rows.push(vec![
                    winner.name.clone(),
                    medal.to_string(),
                    gender.to_string(),
                    winner.noc.0.to_string(),
                    sport.to_string(),
                    event.to_string(),
                ]);
                totals.entry(winner.noc.0).or_default()[rank] += 1;
            }
        }
    }

    let names = [
        "medal_type",
        "medal_date",
        "name",
        "gender",
        "discipline",
        "event",
        "country_code",
        "country",
    ];
    let mut fields: Vec<Field> = names
        .iter()
        .map(|n| Field::new(*n, DataType::Utf8, false))
        .collect();
    fields.push(Field::new("medal_code", DataType::Int64, false));
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<arrow::array::ArrayRef> = medal_cols
        .iter()
        .map(|col| {
            Arc::new(StringArray::from(col.iter().map(String::as_str).collect::<Vec<_>>()))
                as arrow::array::ArrayRef
        })
        .collect();
    arrays.push(Arc::new(Int64Array::from(medal_codes)));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building medals batch")?;

    let medals_path = out_dir.join("medals.parquet");
    let file = std::fs::File::create(&medals_path)
        .with_context(|| format!("creating {}", medals_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing medals")?;
    writer.close().context("closing parquet writer")?;

    write_csv(
        &out_dir.join("medallists.csv"),
        &["name", "medal_type", "gender", "country_code", "discipline", "event"],
        &medallist_rows,
    )?;

    let total_rows: Vec<Vec<String>> = totals
        .iter()
        .map(|(code, [g, s, b])| {
            let country = NOCS.iter().find(|(c, _)| c == code).map_or("", |n| n.1);
            vec![
                code.to_string(),
                country.to_string(),
                g.to_string(),
                s.to_string(),
                b.to_string(),
                (g + s + b).to_string(),
            ]
        })
        .collect();
    write_csv(
        &out_dir.join("medals_total.csv"),
        &["country_code", "country", "Gold Medal", "Silver Medal", "Bronze Medal", "Total"],
        &total_rows,
    )?;

    // ---- Reference tables ----
    let noc_rows: Vec<Vec<String>> = NOCS
        .iter()
        .map(|(c, n)| vec![c.to_string(), n.to_string()])
        .collect();
    write_csv(&out_dir.join("nocs.csv"), &["code", "country"], &noc_rows)?;

    let mut event_rows = Vec::new();
    let mut schedule_rows = Vec::new();
    let mut venue_rows = Vec::new();
    for (day, &(sport, events, venue)) in SPORTS.iter().enumerate() {
        venue_rows.push(vec![venue.to_string(), format!("['{sport}']")]);
        for &event in events {
            event_rows.push(vec![event.to_string(), sport.to_string()]);
            schedule_rows.push(vec![
                games_day(day),
                sport.to_string(),
                event.to_string(),
                venue.to_string(),
            ]);
        }
    }
    write_csv(&out_dir.join("events.csv"), &["event", "sport"], &event_rows)?;
    write_csv(
        &out_dir.join("schedules.csv"),
        &["start_date", "discipline", "event", "venue"],
        &schedule_rows,
    )?;
    write_csv(&out_dir.join("venues.csv"), &["venue", "sports"], &venue_rows)?;

    let coach_rows: Vec<Vec<String>> = (0..20)
        .map(|i| {
            let noc = rng.pick(NOCS);
            vec![
                format!(
                    "{} {}",
                    rng.pick(LAST_NAMES).to_uppercase(),
                    rng.pick(FIRST_NAMES)
                ),
                if i % 3 == 0 { "Female" } else { "Male" }.to_string(),
                "Head Coach".to_string(),
                noc.0.to_string(),
                rng.pick(SPORTS).0.to_string(),
            ]
        })
        .collect();
    write_csv(
        &out_dir.join("coaches.csv"),
        &["name", "gender", "function", "country_code", "disciplines"],
        &coach_rows,
    )?;

    println!(
        "Wrote {} athletes and {} medals to {}",
        athletes.len(),
        medallist_rows.len(),
        out_dir.display()
    );
    Ok(())
}
