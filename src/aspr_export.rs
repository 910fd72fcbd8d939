// Per-tick time series export
//
// One row per recorded tick:
//   t, n0-color, n0-ttl, ..., score, c0-n-active, ..., c0-total-ttl, ...
// Unassigned nodes are written with color -1.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;

use crate::aspr_error::{Result, SimError};
use crate::aspr_interface::{Color, Tick, UNASSIGNED_COLOR};
use crate::aspr_state::{State, StateStatistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRecord {
    pub color: i64,
    pub ttl: u32,
}

impl NodeRecord {
    pub fn color(&self) -> Option<Color> {
        if self.color == UNASSIGNED_COLOR {
            None
        } else {
            Some(self.color as Color)
        }
    }
}

/// Flattened, serializable summary of one `State`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    pub t: Tick,
    pub nodes: Vec<NodeRecord>,
    pub score: f64,
    pub stats: StateStatistics,
}

impl StateRecord {
    pub fn from_state(state: &State) -> Self {
        Self {
            t: state.t(),
            nodes: state
                .nodes()
                .iter()
                .map(|n| NodeRecord {
                    color: n.color_code(),
                    ttl: n.ttl(),
                })
                .collect(),
            score: state.score(),
            stats: state.statistics(),
        }
    }

    /// Ordered column name → value map for this row.
    pub fn columns(&self) -> IndexMap<String, f64> {
        let mut cols = IndexMap::new();
        cols.insert("t".to_string(), self.t as f64);
        for (id, node) in self.nodes.iter().enumerate() {
            cols.insert(format!("n{}-color", id), node.color as f64);
            cols.insert(format!("n{}-ttl", id), node.ttl as f64);
        }
        cols.insert("score".to_string(), self.score);
        for (name, v) in self.stats.active_per_color() {
            cols.insert(name, v as f64);
        }
        for (name, v) in self.stats.ttl_per_color() {
            cols.insert(name, v as f64);
        }
        cols
    }
}

pub fn write_csv<P: AsRef<Path>>(path: P, records: &[StateRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    if let Some(first) = records.first() {
        writer.write_record(first.columns().keys())?;
    }
    for record in records {
        writer.write_record(record.columns().values().map(|v| v.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<StateRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let layout = ColumnLayout::from_headers(reader.headers()?)?;

    let mut records = Vec::new();
    for row in reader.records() {
        records.push(layout.parse(&row?)?);
    }
    Ok(records)
}

// ============================================================================
// Header parsing
// ============================================================================

struct ColumnLayout {
    t: usize,
    score: usize,
    nodes: Vec<(usize, usize)>,
    colors: Vec<Color>,
    stats: Vec<(usize, usize)>,
}

fn invalid(reason: impl Into<String>) -> SimError {
    SimError::InvalidRecord {
        reason: reason.into(),
    }
}

/// Narrows a parsed integer into its column type, rejecting negatives and overflow.
fn narrow<T: TryFrom<i64>>(value: i64, column: &str) -> Result<T> {
    T::try_from(value).map_err(|_| invalid(format!("{} out of range for {}", value, column)))
}

fn parse_index(name: &str, prefix: &str, suffix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?.strip_suffix(suffix)?.parse().ok()
}

fn pairs(
    map: BTreeMap<usize, (Option<usize>, Option<usize>)>,
    what: &str,
) -> Result<Vec<(usize, (usize, usize))>> {
    map.into_iter()
        .map(|(key, cols)| match cols {
            (Some(a), Some(b)) => Ok((key, (a, b))),
            _ => Err(invalid(format!("incomplete columns for {} {}", what, key))),
        })
        .collect()
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut t = None;
        let mut score = None;
        let mut nodes: BTreeMap<usize, (Option<usize>, Option<usize>)> = BTreeMap::new();
        let mut colors: BTreeMap<Color, (Option<usize>, Option<usize>)> = BTreeMap::new();

        for (idx, name) in headers.iter().enumerate() {
            if name == "t" {
                t = Some(idx);
            } else if name == "score" {
                score = Some(idx);
            } else if let Some(id) = parse_index(name, "n", "-color") {
                nodes.entry(id).or_default().0 = Some(idx);
            } else if let Some(id) = parse_index(name, "n", "-ttl") {
                nodes.entry(id).or_default().1 = Some(idx);
            } else if let Some(c) = parse_index(name, "c", "-n-active") {
                colors.entry(c).or_default().0 = Some(idx);
            } else if let Some(c) = parse_index(name, "c", "-total-ttl") {
                colors.entry(c).or_default().1 = Some(idx);
            } else {
                return Err(invalid(format!("unexpected column '{}'", name)));
            }
        }

        let nodes = pairs(nodes, "node")?;
        if nodes.iter().enumerate().any(|(i, (id, _))| i != *id) {
            return Err(invalid("node columns are not contiguous"));
        }
        let colors = pairs(colors, "color")?;

        Ok(Self {
            t: t.ok_or_else(|| invalid("missing column 't'"))?,
            score: score.ok_or_else(|| invalid("missing column 'score'"))?,
            nodes: nodes.into_iter().map(|(_, cols)| cols).collect(),
            colors: colors.iter().map(|(c, _)| *c).collect(),
            stats: colors.into_iter().map(|(_, cols)| cols).collect(),
        })
    }

    fn parse(&self, row: &csv::StringRecord) -> Result<StateRecord> {
        let field = |idx: usize| -> Result<&str> {
            row.get(idx)
                .ok_or_else(|| invalid(format!("row is missing column {}", idx)))
        };
        let int = |idx: usize| -> Result<i64> {
            let raw = field(idx)?;
            raw.parse::<i64>()
                .or_else(|_| match raw.parse::<f64>() {
                    Ok(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
                        Ok(v as i64)
                    }
                    _ => Err(()),
                })
                .map_err(|_| invalid(format!("'{}' is not an integer", raw)))
        };

        let nodes = self
            .nodes
            .iter()
            .map(|&(color, ttl)| {
                let color = int(color)?;
                if color < UNASSIGNED_COLOR {
                    return Err(invalid(format!("{} is not a node color", color)));
                }
                Ok(NodeRecord {
                    color,
                    ttl: narrow(int(ttl)?, "node ttl")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let raw_score = field(self.score)?;
        let score = raw_score
            .parse::<f64>()
            .map_err(|_| invalid(format!("'{}' is not a score", raw_score)))?;

        let mut active = Vec::with_capacity(self.stats.len());
        let mut total_ttl = Vec::with_capacity(self.stats.len());
        for &(a, l) in &self.stats {
            active.push(narrow(int(a)?, "active count")?);
            total_ttl.push(narrow(int(l)?, "total ttl")?);
        }

        Ok(StateRecord {
            t: narrow::<Tick>(int(self.t)?, "t")?,
            nodes,
            score,
            stats: StateStatistics {
                colors: self.colors.clone(),
                active,
                total_ttl,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspr_interface::color_range;
    use crate::aspr_interference::BinaryInterference;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_columns_order() {
        let mut state = State::new(2, Box::new(BinaryInterference), color_range(2));
        state.tick().activate(1);
        let record = StateRecord::from_state(&state);

        let names: Vec<_> = record.columns().keys().cloned().collect();
        assert_eq!(
            names,
            vec![
                "t", "n0-color", "n0-ttl", "n1-color", "n1-ttl", "score",
                "c0-n-active", "c1-n-active", "c0-total-ttl", "c1-total-ttl",
            ]
        );
        let values: Vec<_> = record.columns().values().copied().collect();
        assert_eq!(values, vec![1.0, 1.0, 10.0, -1.0, 10.0, 0.0, 0.0, 1.0, 0.0, 10.0]);
    }

    #[test]
    fn test_csv_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.csv");

        let mut state = State::new(3, Box::new(BinaryInterference), color_range(2));
        let mut records = vec![StateRecord::from_state(&state)];
        for color in [0, 0, 1] {
            state.tick().activate(color);
            records.push(StateRecord::from_state(&state));
        }
        for _ in 0..12 {
            state.tick();
            records.push(StateRecord::from_state(&state));
        }

        write_csv(&path, &records).unwrap();
        let read_back = read_csv(&path).unwrap();
        assert_eq!(read_back, records);
        assert_eq!(read_back[2].nodes[0].color(), Some(0));
        assert_eq!(read_back[2].score, 1.0);
    }

    #[test]
    fn test_rejects_unknown_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "t,score,bogus\n0,0,1\n").unwrap();

        assert!(matches!(read_csv(&path), Err(SimError::InvalidRecord { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let dir = TempDir::new().unwrap();
        let header = "t,n0-color,n0-ttl,score,c0-n-active,c0-total-ttl\n";
        let rows = [
            "1,0,-3,0,1,10",
            "1,0,4294967296,0,1,10",
            "-1,0,10,0,1,10",
            "1,-2,10,0,1,10",
            "1,0,10,0,-1,10",
            "1,0,10,0,1,-10",
            "1e300,0,10,0,1,10",
        ];
        for (i, row) in rows.iter().enumerate() {
            let path = dir.path().join(format!("bad-{}.csv", i));
            fs::write(&path, format!("{}{}\n", header, row)).unwrap();
            assert!(
                matches!(read_csv(&path), Err(SimError::InvalidRecord { .. })),
                "row {} was accepted",
                row
            );
        }

        let path = dir.path().join("good.csv");
        fs::write(&path, format!("{}2.0,-1,10,0,0,0\n", header)).unwrap();
        let records = read_csv(&path).unwrap();
        assert_eq!(records[0].t, 2);
        assert_eq!(records[0].nodes[0], NodeRecord { color: -1, ttl: 10 });
    }
}
