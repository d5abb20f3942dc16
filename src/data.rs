//! Loading of whitespace-delimited numeric tables and typed views over them

use crate::error::TableError;
use ndarray::{s, Array1, Array2, ArrayView1};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Numeric rows together with the physical line each row came from
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub values: Array2<f64>,
    /// 1-based source line of every row
    pub lines: Vec<usize>,
}

impl Table {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }
}

/// An in-memory array numbers its rows as consecutive lines starting at 1.
impl From<Array2<f64>> for Table {
    fn from(values: Array2<f64>) -> Self {
        let lines = (1..=values.nrows()).collect();
        Self { values, lines }
    }
}

/// Read a table with exactly `columns` values per row.
///
/// Rows are separated by newlines and values by any run of whitespace.
/// Blank lines and lines starting with `#` are skipped. A file holding a
/// single row still yields a two-dimensional `(1, columns)` array.
pub fn load_table<P: AsRef<Path>>(path: P, columns: usize) -> Result<Table, TableError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = parse_table(&text, columns, path)?;
    debug!(path = %path.display(), rows = table.nrows(), columns, "loaded table");
    Ok(table)
}

/// Parse table text. `origin` is only used to label errors.
pub fn parse_table(text: &str, columns: usize, origin: &Path) -> Result<Table, TableError> {
    let mut values = Vec::new();
    let mut lines = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let start = values.len();
        for token in line.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| TableError::Parse {
                path: origin.to_path_buf(),
                line: idx + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }

        let found = values.len() - start;
        if found != columns {
            return Err(TableError::ColumnCount {
                path: origin.to_path_buf(),
                line: idx + 1,
                expected: columns,
                found,
            });
        }
        lines.push(idx + 1);
    }

    if lines.is_empty() {
        return Err(TableError::Empty {
            path: origin.to_path_buf(),
        });
    }

    // Row widths were checked above, so the shape always matches.
    let values = Array2::from_shape_vec((lines.len(), columns), values)
        .unwrap_or_else(|_| unreachable!("row widths are validated while parsing"));
    Ok(Table { values, lines })
}

fn ensure_finite(table: &Table, origin: &Path) -> Result<(), TableError> {
    for (values, &line) in table.values.outer_iter().zip(&table.lines) {
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(TableError::NonFinite {
                path: origin.to_path_buf(),
                line,
                column: idx + 1,
            });
        }
    }
    Ok(())
}

fn ensure_columns(table: &Table, columns: usize, origin: &Path) -> Result<(), TableError> {
    if table.nrows() == 0 {
        return Err(TableError::Empty {
            path: origin.to_path_buf(),
        });
    }
    if table.ncols() != columns {
        return Err(TableError::Width {
            path: origin.to_path_buf(),
            expected: columns,
            found: table.ncols(),
        });
    }
    Ok(())
}

/// One pixel of a color table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    /// Normalized horizontal position
    pub x: f64,
    /// Normalized vertical position
    pub y: f64,
    /// `r + g + b`
    pub color_sum: f64,
    pub rgb: [f64; 3],
}

impl ColorSample {
    fn from_row(row: ArrayView1<f64>) -> Self {
        Self {
            x: row[0],
            y: row[1],
            color_sum: row[2],
            rgb: [row[3], row[4], row[5]],
        }
    }

    /// Whether every channel lies in `[0, 1]`
    pub fn in_gamut(&self) -> bool {
        self.rgb.iter().all(|c| (0.0..=1.0).contains(c))
    }

    /// Channels scaled to bytes, clamped to the displayable range
    pub fn rgb8(&self) -> (u8, u8, u8) {
        let to_byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (to_byte(self.rgb[0]), to_byte(self.rgb[1]), to_byte(self.rgb[2]))
    }
}

/// Per-pixel color statistics: columns `x y color_sum r g b`
#[derive(Debug, Clone)]
pub struct ColorSamples {
    pub table: Array2<f64>,
}

impl ColorSamples {
    pub const COLUMNS: usize = 6;

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        Self::from_table(load_table(path, Self::COLUMNS)?, path)
    }

    pub fn from_table<T: Into<Table>>(table: T, origin: &Path) -> Result<Self, TableError> {
        let table = table.into();
        ensure_columns(&table, Self::COLUMNS, origin)?;
        ensure_finite(&table, origin)?;
        Ok(Self {
            table: table.values,
        })
    }

    pub fn len(&self) -> usize {
        self.table.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.table.nrows() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ColorSample> + '_ {
        self.table.outer_iter().map(ColorSample::from_row)
    }

    /// Number of rows with at least one channel outside `[0, 1]`
    pub fn out_of_gamut(&self) -> usize {
        self.iter().filter(|sample| !sample.in_gamut()).count()
    }
}

/// Points with their cluster assignment: columns `x y z cluster_label`
#[derive(Debug, Clone)]
pub struct ClusterPoints {
    /// Point coordinates, shape `(n, 3)`
    pub coords: Array2<f64>,
    pub labels: Array1<usize>,
}

impl ClusterPoints {
    pub const COLUMNS: usize = 4;

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        Self::from_table(load_table(path, Self::COLUMNS)?, path)
    }

    pub fn from_table<T: Into<Table>>(table: T, origin: &Path) -> Result<Self, TableError> {
        let table = table.into();
        ensure_columns(&table, Self::COLUMNS, origin)?;
        ensure_finite(&table, origin)?;

        // Exact integers only; anything above 2^53 has lost precision already.
        const MAX_LABEL: f64 = 9_007_199_254_740_992.0;
        let labels = table
            .values
            .column(3)
            .iter()
            .zip(&table.lines)
            .map(|(&value, &line)| {
                if value < 0.0 || value.fract() != 0.0 || value > MAX_LABEL {
                    Err(TableError::InvalidLabel {
                        path: origin.to_path_buf(),
                        line,
                        value,
                    })
                } else {
                    Ok(value as usize)
                }
            })
            .collect::<Result<Array1<usize>, _>>()?;

        Ok(Self {
            coords: table.values.slice(s![.., 0..3]).to_owned(),
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Distinct labels in ascending order
    pub fn distinct_labels(&self) -> Vec<usize> {
        self.cluster_sizes().into_iter().map(|(label, _)| label).collect()
    }

    /// Coordinates of every point carrying `label`
    pub fn points_in(&self, label: usize) -> Vec<(f64, f64, f64)> {
        self.coords
            .outer_iter()
            .zip(self.labels.iter())
            .filter(|(_, &l)| l == label)
            .map(|(p, _)| (p[0], p[1], p[2]))
            .collect()
    }

    /// `(label, point count)` pairs in ascending label order
    pub fn cluster_sizes(&self) -> Vec<(usize, usize)> {
        let mut sizes = BTreeMap::new();
        for &label in self.labels.iter() {
            *sizes.entry(label).or_insert(0usize) += 1;
        }
        sizes.into_iter().collect()
    }
}

/// Cluster centres: columns `x y z`
#[derive(Debug, Clone)]
pub struct Centroids {
    pub coords: Array2<f64>,
}

impl Centroids {
    pub const COLUMNS: usize = 3;

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        Self::from_table(load_table(path, Self::COLUMNS)?, path)
    }

    pub fn from_table<T: Into<Table>>(table: T, origin: &Path) -> Result<Self, TableError> {
        let table = table.into();
        ensure_columns(&table, Self::COLUMNS, origin)?;
        ensure_finite(&table, origin)?;
        Ok(Self {
            coords: table.values,
        })
    }

    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }

    pub fn points(&self) -> Vec<(f64, f64, f64)> {
        self.coords
            .outer_iter()
            .map(|p| (p[0], p[1], p[2]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn origin() -> &'static Path {
        Path::new("test.txt")
    }

    #[test]
    fn test_parse_table_any_whitespace() {
        let text = "1 2  3\n\t4\t5 6 \n\n# comment\n7 8 9\n";
        let table = parse_table(text, 3, origin()).unwrap();
        assert_eq!(
            table.values,
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]
        );
        assert_eq!(table.lines, vec![1, 2, 5]);
    }

    #[test]
    fn test_single_row_stays_two_dimensional() {
        let table = parse_table("0.5 -1e-3 2\n", 3, origin()).unwrap();
        assert_eq!(table.values.shape(), &[1, 3]);
        assert_eq!(table.values[[0, 1]], -1e-3);
    }

    #[test]
    fn test_ragged_row_reports_line() {
        let err = parse_table("1 2 3\n\n4 5\n", 3, origin()).unwrap_err();
        match err {
            TableError::ColumnCount {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_token() {
        let err = parse_table("1 2 x\n", 3, origin()).unwrap_err();
        assert!(matches!(err, TableError::Parse { line: 1, ref token, .. } if token == "x"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            parse_table("\n# only comments\n", 3, origin()),
            Err(TableError::Empty { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_table("/nonexistent/centroids.txt", 3).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }

    #[test]
    fn test_load_table_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0.1 0.2 1.5 0.5 0.5 0.5").unwrap();
        writeln!(file, "0.2 0.2 0.3 0.1 0.1 0.1").unwrap();

        let samples = ColorSamples::load(file.path()).unwrap();
        assert_eq!(samples.len(), 2);
        let first = samples.iter().next().unwrap();
        assert_eq!(first.x, 0.1);
        assert_eq!(first.color_sum, 1.5);
        assert_eq!(first.rgb8(), (128, 128, 128));
    }

    #[test]
    fn test_color_clamping() {
        let table = array![[0.0, 0.0, 1.7, 1.2, 0.5, 0.0], [0.0, 0.0, 0.0, -0.1, 0.0, 0.0]];
        let samples = ColorSamples::from_table(table, origin()).unwrap();
        assert_eq!(samples.out_of_gamut(), 2);

        let colors: Vec<_> = samples.iter().map(|s| s.rgb8()).collect();
        assert_eq!(colors[0], (255, 128, 0));
        assert_eq!(colors[1], (0, 0, 0));
    }

    #[test]
    fn test_non_finite_rejected() {
        let table = array![[0.0, f64::NAN, 0.0]];
        let err = Centroids::from_table(table, origin()).unwrap_err();
        assert!(matches!(err, TableError::NonFinite { line: 1, column: 2, .. }));
    }

    #[test]
    fn test_non_finite_reports_source_line() {
        let table = parse_table("# h\n1 1 1\nnan 0 0\n", 3, Path::new("k.txt")).unwrap();
        let err = Centroids::from_table(table, Path::new("k.txt")).unwrap_err();
        assert!(matches!(err, TableError::NonFinite { line: 3, column: 1, .. }));
        assert_eq!(err.to_string(), "k.txt:3: non-finite value in column 1");
    }

    #[test]
    fn test_invalid_label_reports_source_line() {
        let table = parse_table("# header\n0 0 0 0\n\n0 0 0 -2\n", 4, Path::new("c.txt")).unwrap();
        let err = ClusterPoints::from_table(table, Path::new("c.txt")).unwrap_err();
        assert!(matches!(err, TableError::InvalidLabel { line: 4, .. }));
        assert!(err.to_string().starts_with("c.txt:4:"));
    }

    #[test]
    fn test_cluster_grouping() {
        let table = array![
            [0.0, 0.0, 0.0, 2.0],
            [1.0, 1.0, 1.0, 0.0],
            [2.0, 2.0, 2.0, 2.0],
            [3.0, 3.0, 3.0, 7.0],
        ];
        let points = ClusterPoints::from_table(table, origin()).unwrap();

        assert_eq!(points.len(), 4);
        assert_eq!(points.distinct_labels(), vec![0, 2, 7]);
        assert_eq!(points.cluster_sizes(), vec![(0, 1), (2, 2), (7, 1)]);
        assert_eq!(points.points_in(2), vec![(0.0, 0.0, 0.0), (2.0, 2.0, 2.0)]);
        assert!(points.points_in(5).is_empty());
    }

    #[test]
    fn test_invalid_labels() {
        for bad in [-1.0, 0.5, 1e300] {
            let table = array![[0.0, 0.0, 0.0, 1.0], [0.0, 0.0, 0.0, bad]];
            let err = ClusterPoints::from_table(table, origin()).unwrap_err();
            assert!(matches!(err, TableError::InvalidLabel { line: 2, .. }), "{bad}");
        }
    }

    #[test]
    fn test_wrong_width_for_layout() {
        let table = array![[0.0, 0.0, 0.0]];
        assert!(matches!(
            ClusterPoints::from_table(table, origin()),
            Err(TableError::Width { expected: 4, found: 3, .. })
        ));
    }
}
