use std::path::Path;
use log::info;

/// Ordered table of string records with a stable column schema.
///
/// This is both the in-memory accumulator and the on-disk checkpoint: `save`
/// overwrites the whole CSV, so whatever is on disk after any save is a
/// complete, restartable snapshot.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>) -> Self {
        RecordTable { columns, rows: Vec::new() }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, csv::Error> {
        let mut rdr = csv::Reader::from_path(path.as_ref())?;
        let columns = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        info!("Loaded {} rows from {:?}", rows.len(), path.as_ref());
        Ok(RecordTable { columns, rows })
    }

    /// Overwrite `path` with the full table. Checkpoint semantics: called
    /// after every unit of work, never appends.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_path(path.as_ref())?;
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            if row.len() < self.columns.len() {
                // Pad short rows so the schema stays rectangular on disk.
                let mut padded = row.clone();
                padded.resize(self.columns.len(), String::new());
                wtr.write_record(&padded)?;
            } else {
                wtr.write_record(row)?;
            }
        }
        wtr.flush()?;
        info!("Saved {} rows to {:?}", self.rows.len(), path.as_ref());
        Ok(())
    }

    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of `name`, appending the column (empty for every existing row)
    /// when it is not already present.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.resize(self.columns.len(), String::new());
        }
        self.columns.len() - 1
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(String::as_str).unwrap_or("")
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: String) {
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value;
    }

    /// Projection of the table with the named columns removed. Row order and
    /// the relative order of surviving columns are preserved.
    pub fn without_columns(&self, drop: &[&str]) -> RecordTable {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !drop.contains(&c.as_str()))
            .map(|(i, _)| i)
            .collect();

        RecordTable {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    keep.iter()
                        .map(|&i| row.get(i).cloned().unwrap_or_default())
                        .collect()
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordTable {
        let mut t = RecordTable::new(vec!["Name".into(), "Address".into()]);
        t.push_row(vec!["State Library".into(), "1 Swanston St".into()]);
        t.push_row(vec!["City Library".into(), "253 Flinders Ln".into()]);
        t
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let t = sample();
        t.save(&path).unwrap();
        let back = RecordTable::load(&path).unwrap();
        assert_eq!(back.columns, t.columns);
        assert_eq!(back.rows, t.rows);
    }

    #[test]
    fn save_overwrites_rather_than_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let t = sample();
        t.save(&path).unwrap();
        t.save(&path).unwrap();
        let back = RecordTable::load(&path).unwrap();
        assert_eq!(back.rows.len(), 2);
    }

    #[test]
    fn ensure_column_is_idempotent_and_backfills() {
        let mut t = sample();
        let idx = t.ensure_column("Latitude");
        assert_eq!(idx, 2);
        assert_eq!(t.cell(0, idx), "");
        assert_eq!(t.rows[1].len(), 3);
        // Second call must not add another column.
        assert_eq!(t.ensure_column("Latitude"), 2);
        assert_eq!(t.columns.len(), 3);
    }

    #[test]
    fn without_columns_drops_only_named() {
        let mut t = RecordTable::new(vec![
            "Name".into(),
            "Location".into(),
            "Details".into(),
            "Address".into(),
        ]);
        t.push_row(vec!["A".into(), "loc".into(), "det".into(), "addr".into()]);
        let p = t.without_columns(&["Location", "Details", "Web catalogue"]);
        assert_eq!(p.columns, vec!["Name".to_string(), "Address".to_string()]);
        assert_eq!(p.rows, vec![vec!["A".to_string(), "addr".to_string()]]);
    }

    #[test]
    fn short_rows_are_padded_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut t = RecordTable::new(vec!["Name".into(), "Address".into(), "OrgID".into()]);
        t.push_row(vec!["A".into()]);
        t.save(&path).unwrap();
        let back = RecordTable::load(&path).unwrap();
        assert_eq!(back.rows[0], vec!["A".to_string(), String::new(), String::new()]);
    }
}
