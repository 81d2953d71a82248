//! Dataset files: summary CSV and detailed JSON.
//!
//! The summary CSV carries one row of derived metrics per member. The
//! detailed JSON carries every member attribute including tasks, and reads
//! back into the same [`Population`].

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::member::{round2, Member, MemberStatus, Task};
use crate::population::Population;
use crate::profile::Archetype;

/// Summary CSV header, in column order.
pub const CSV_COLUMNS: [&str; 5] = [
    "Name",
    "Total_Score",
    "Tasks_Completed",
    "Average_Mark",
    "Average_Rating",
];

/// One member's summary metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub total_score: f64,
    pub tasks_completed: u32,
    pub average_mark: f64,
    pub average_rating: f64,
}

impl From<&Member> for ScoreRecord {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            total_score: member.total_score() as f64,
            tasks_completed: member.task_count() as u32,
            average_mark: round2(member.average_mark()),
            average_rating: round2(member.average_rating()),
        }
    }
}

/// Summary rows for every member, in population order.
pub fn summary_records(population: &Population) -> Vec<ScoreRecord> {
    population.iter().map(ScoreRecord::from).collect()
}

/// Total scores of the given records, in order.
pub fn scores(records: &[ScoreRecord]) -> Vec<f64> {
    records.iter().map(|r| r.total_score).collect()
}

/// Keep only records scoring at least `min_score`.
pub fn apply_score_floor(records: &[ScoreRecord], min_score: f64) -> Vec<ScoreRecord> {
    records
        .iter()
        .filter(|r| r.total_score >= min_score)
        .cloned()
        .collect()
}

// === Summary CSV ===

pub fn write_summary_csv<W: Write>(records: &[ScoreRecord], mut writer: W) -> io::Result<()> {
    writeln!(writer, "{}", CSV_COLUMNS.join(","))?;
    for r in records {
        writeln!(
            writer,
            "{},{},{},{:.2},{:.2}",
            escape_field(&r.name),
            format_score(r.total_score),
            r.tasks_completed,
            r.average_mark,
            r.average_rating
        )?;
    }
    writer.flush()
}

pub fn read_summary_csv<R: BufRead>(reader: R) -> Result<Vec<ScoreRecord>, DatasetError> {
    let mut lines = reader.lines().enumerate();
    let header = match lines.next() {
        Some((_, line)) => split_line(&line?).map_err(|reason| DatasetError::Csv { line: 1, reason })?,
        None => return Err(DatasetError::Empty),
    };

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DatasetError::Csv {
                line: 1,
                reason: format!("missing column '{}'", name),
            })
    };
    let name_col = column("Name")?;
    let score_col = column("Total_Score")?;
    let tasks_col = column("Tasks_Completed")?;
    let mark_col = column("Average_Mark")?;
    let rating_col = column("Average_Rating")?;

    let mut records = Vec::new();
    for (idx, line) in lines {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(&line).map_err(|reason| DatasetError::Csv { line: line_no, reason })?;
        let field = |col: usize| -> Result<&str, DatasetError> {
            fields.get(col).map(|f| f.trim()).ok_or_else(|| DatasetError::Csv {
                line: line_no,
                reason: format!("expected at least {} fields, found {}", col + 1, fields.len()),
            })
        };
        let number = |col: usize| -> Result<f64, DatasetError> {
            let raw = field(col)?;
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(DatasetError::Csv {
                    line: line_no,
                    reason: format!("'{}' is not a finite number", raw),
                }),
            }
        };

        let tasks = number(tasks_col)?;
        if tasks < 0.0 || tasks.fract() != 0.0 {
            return Err(DatasetError::Csv {
                line: line_no,
                reason: format!("task count {} is not a whole number", tasks),
            });
        }
        records.push(ScoreRecord {
            name: field(name_col)?.to_string(),
            total_score: number(score_col)?,
            tasks_completed: tasks as u32,
            average_mark: number(mark_col)?,
            average_rating: number(rating_col)?,
        });
    }
    Ok(records)
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

/// Rows are one line each, so line breaks inside a field become spaces.
fn escape_field(field: &str) -> String {
    let field = field.replace(['\r', '\n'], " ");
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

/// Split one CSV line, honouring double-quoted fields.
fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            (c, _) => current.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(current);
    Ok(fields)
}

// === Detailed JSON ===

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TaskRecord {
    task_id: String,
    mark: u8,
    rating: i8,
    score: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_completed: Option<NaiveDate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct MemberRecord {
    name: String,
    archetype: Archetype,
    status: MemberStatus,
    joined: NaiveDate,
    total_score: i32,
    tasks_completed: usize,
    average_mark: f64,
    average_rating: f64,
    tasks: Vec<TaskRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DetailedFile {
    reference_date: NaiveDate,
    members: Vec<MemberRecord>,
}

impl From<&Member> for MemberRecord {
    fn from(m: &Member) -> Self {
        Self {
            name: m.name.clone(),
            archetype: m.archetype,
            status: m.status,
            joined: m.joined,
            total_score: m.total_score(),
            tasks_completed: m.task_count(),
            average_mark: round2(m.average_mark()),
            average_rating: round2(m.average_rating()),
            tasks: m
                .tasks
                .iter()
                .map(|t| TaskRecord {
                    task_id: t.task_id.clone(),
                    mark: t.mark,
                    rating: t.rating,
                    score: t.score(),
                    task_type: t.task_type.clone(),
                    date_completed: t.date_completed,
                })
                .collect(),
        }
    }
}

impl TryFrom<MemberRecord> for Member {
    type Error = DatasetError;

    fn try_from(record: MemberRecord) -> Result<Self, Self::Error> {
        let mut tasks = Vec::with_capacity(record.tasks.len());
        for t in record.tasks {
            let task = Task {
                task_id: t.task_id,
                mark: t.mark,
                rating: t.rating,
                task_type: t.task_type,
                date_completed: t.date_completed,
            };
            if task.score() != t.score {
                return Err(DatasetError::InconsistentTask {
                    member: record.name,
                    task_id: task.task_id,
                    mark: task.mark,
                    rating: task.rating,
                    score: t.score,
                });
            }
            tasks.push(task);
        }

        let member = Member {
            name: record.name,
            archetype: record.archetype,
            tasks,
            joined: record.joined,
            status: record.status,
        };
        if member.total_score() != record.total_score {
            return Err(DatasetError::InconsistentTotal {
                recorded: record.total_score,
                computed: member.total_score(),
                member: member.name,
            });
        }
        Ok(member)
    }
}

pub fn write_detailed_json<W: Write>(population: &Population, writer: W) -> Result<(), DatasetError> {
    let file = DetailedFile {
        reference_date: population.reference_date,
        members: population.iter().map(MemberRecord::from).collect(),
    };
    serde_json::to_writer_pretty(writer, &file)?;
    Ok(())
}

pub fn read_detailed_json<R: io::Read>(reader: R) -> Result<Population, DatasetError> {
    let file: DetailedFile = serde_json::from_reader(reader)?;
    let members = file
        .members
        .into_iter()
        .map(Member::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Population {
        members,
        reference_date: file.reference_date,
    })
}

// === File helpers ===

/// On-disk dataset formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
}

pub fn save_summary_csv(records: &[ScoreRecord], path: &Path) -> Result<(), DatasetError> {
    let file = File::create(path)?;
    write_summary_csv(records, BufWriter::new(file))?;
    Ok(())
}

pub fn save_detailed_json(population: &Population, path: &Path) -> Result<(), DatasetError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_detailed_json(population, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Load summary records from either format.
pub fn load_records(path: &Path, format: DatasetFormat) -> Result<Vec<ScoreRecord>, DatasetError> {
    let file = File::open(path)?;
    let records = match format {
        DatasetFormat::Csv => read_summary_csv(BufReader::new(file))?,
        DatasetFormat::Json => summary_records(&read_detailed_json(BufReader::new(file))?),
    };
    tracing::debug!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{generate_population_seeded, DistributionRatios};
    use crate::sampler::TaskRange;

    fn record(name: &str, total: f64) -> ScoreRecord {
        ScoreRecord {
            name: name.to_string(),
            total_score: total,
            tasks_completed: 4,
            average_mark: 3.25,
            average_rating: 1.5,
        }
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        write_summary_csv(&[record("Ana Popa", 21.0)], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Name,Total_Score,Tasks_Completed,Average_Mark,Average_Rating\nAna Popa,21,4,3.25,1.50\n"
        );
    }

    #[test]
    fn test_csv_quoting() {
        let records = vec![record("Popa, \"Ana\"", -3.0), record("Ion Radu", 40.0)];
        let mut out = Vec::new();
        write_summary_csv(&records, &mut out).unwrap();
        let back = read_summary_csv(out.as_slice()).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_csv_reorders_columns_by_header() {
        let text = "Total_Score,Name,Average_Rating,Average_Mark,Tasks_Completed\n12,Dana Stan,0.5,2.75,8\n";
        let records = read_summary_csv(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Dana Stan");
        assert_eq!(records[0].total_score, 12.0);
        assert_eq!(records[0].tasks_completed, 8);
    }

    #[test]
    fn test_csv_errors() {
        let missing = "Name,Total_Score\nAna,3\n";
        assert!(matches!(
            read_summary_csv(missing.as_bytes()),
            Err(DatasetError::Csv { line: 1, .. })
        ));

        let bad = "Name,Total_Score,Tasks_Completed,Average_Mark,Average_Rating\nAna,abc,3,1,1\n";
        assert!(matches!(
            read_summary_csv(bad.as_bytes()),
            Err(DatasetError::Csv { line: 2, .. })
        ));

        assert!(matches!(read_summary_csv("".as_bytes()), Err(DatasetError::Empty)));
    }

    #[test]
    fn test_csv_rejects_non_finite_numbers() {
        for raw in ["NaN", "inf", "-inf"] {
            let text = format!(
                "Name,Total_Score,Tasks_Completed,Average_Mark,Average_Rating\nAna,{},3,1,1\n",
                raw
            );
            assert!(matches!(
                read_summary_csv(text.as_bytes()),
                Err(DatasetError::Csv { line: 2, .. })
            ));
        }
        let text = "Name,Total_Score,Tasks_Completed,Average_Mark,Average_Rating\nAna,3,3,NaN,1\n";
        assert!(matches!(
            read_summary_csv(text.as_bytes()),
            Err(DatasetError::Csv { line: 2, .. })
        ));
    }

    #[test]
    fn test_csv_line_breaks_in_names_stay_on_one_row() {
        let records = vec![record("Ana\nPopa", 12.0), record("Ion,\r\nRadu", 7.0)];
        let mut out = Vec::new();
        write_summary_csv(&records, &mut out).unwrap();
        let back = read_summary_csv(out.as_slice()).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].name, "Ana Popa");
        assert_eq!(back[1].name, "Ion,  Radu");
        assert_eq!(back[1].total_score, 7.0);
    }

    #[test]
    fn test_score_floor() {
        let records = vec![record("a", 10.0), record("b", 40.0), record("c", 39.5)];
        let kept = apply_score_floor(&records, 39.5);
        let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_detailed_json_is_lossless() {
        let pop = generate_population_seeded(25, &DistributionRatios::default(), TaskRange::default(), 11).unwrap();
        let mut out = Vec::new();
        write_detailed_json(&pop, &mut out).unwrap();
        let back = read_detailed_json(out.as_slice()).unwrap();
        assert_eq!(back, pop);
    }

    #[test]
    fn test_detailed_json_rejects_bad_score() {
        let json = r#"{
            "reference_date": "2025-01-01",
            "members": [{
                "name": "Ana Popa",
                "archetype": "high_performer",
                "status": "volunteer",
                "joined": "2024-01-01",
                "total_score": 9,
                "tasks_completed": 1,
                "average_mark": 3.0,
                "average_rating": 2.0,
                "tasks": [{"task_id": "T001", "mark": 3, "rating": 2, "score": 9}]
            }]
        }"#;
        assert!(matches!(
            read_detailed_json(json.as_bytes()),
            Err(DatasetError::InconsistentTask { score: 9, .. })
        ));
    }

    #[test]
    fn test_summary_records_follow_population() {
        let pop = generate_population_seeded(10, &DistributionRatios::default(), TaskRange::default(), 2).unwrap();
        let records = summary_records(&pop);
        assert_eq!(records.len(), 10);
        for (r, m) in records.iter().zip(&pop) {
            assert_eq!(r.name, m.name);
            assert_eq!(r.total_score, m.total_score() as f64);
            assert_eq!(r.tasks_completed as usize, m.task_count());
        }
        assert_eq!(scores(&records), pop.scores());
    }
}
