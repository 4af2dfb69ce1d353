//! Plain text point files, one `x y z` triple per line.

use std::io::{BufRead, Write};

use log::{debug, info, warn};

use crate::{
    bounding::{Point, Real},
    tree::Octree,
    TreeError,
};

/// Bulk load errors
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Line that is not three numbers
    #[error("Parse error at line {line}: {content:?}")]
    Parse { line: usize, content: String },
}

/// What happened to the points of a bulk load.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    /// Points already stored, including repeats within the input.
    pub duplicates: usize,
    /// Points outside the tree bounds.
    pub rejected: usize,
}

/// Parses one `x y z` line.
pub fn parse_point<R: Real>(line: &str) -> Option<Point<R>> {
    let mut fields = line.split_whitespace().map(str::parse::<R>);
    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Some(Point::new(x, y, z)),
        _ => None,
    }
}

impl<R: Real> Octree<R> {
    /// Inserts every point of a whitespace separated `x y z` listing.
    ///
    /// Empty lines and lines starting with `#` are skipped.
    /// The whole input is parsed before the tree is touched, so a
    /// malformed line leaves the tree unchanged.
    ///
    /// Points already stored are skipped, as are points outside the bounds.
    ///
    /// ```rust
    /// use pointree::prelude::*;
    ///
    /// let mut tree = Octree::<f32>::from_cube(Cube::new(Point::zero(), 100.0).unwrap());
    /// let input = "1 2 3\n1 2 3\n500 0 0\n";
    ///
    /// let report = tree.load_points(input.as_bytes()).unwrap();
    /// assert_eq!(report, LoadReport { inserted: 1, duplicates: 1, rejected: 1 });
    /// ```
    pub fn load_points<B: BufRead>(&mut self, reader: B) -> Result<LoadReport, LoadError> {
        let mut points = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let point = parse_point(trimmed).ok_or_else(|| LoadError::Parse {
                line: idx + 1,
                content: line.clone(),
            })?;
            points.push(point);
        }

        let mut report = LoadReport::default();
        for point in points {
            if self.contains(&point) {
                debug!("Skipping duplicate {point}");
                report.duplicates += 1;
                continue;
            }
            match self.insert(point) {
                Ok(()) => report.inserted += 1,
                Err(TreeError::OutOfTreeBounds(msg)) => {
                    warn!("Rejected point. {msg}");
                    report.rejected += 1;
                }
                Err(err) => {
                    warn!("Rejected {point}. {err}");
                    report.rejected += 1;
                }
            }
        }

        info!(
            "Loaded {} points, skipped {} duplicates, rejected {}",
            report.inserted, report.duplicates, report.rejected
        );
        Ok(report)
    }

    /// Writes every stored point as an `x y z` line, readable by
    /// [`load_points`](Self::load_points).
    pub fn write_points<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for p in self.points() {
            writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
        }
        writer.flush()
    }
}
