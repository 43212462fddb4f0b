use crate::error::Result;
use crate::geometry::{Point, STATION_TOLERANCE};
use crate::roughness::{self, RoughnessRow, RoughnessSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankTag {
    Left,
    Right,
}

impl BankTag {
    /// Parse a grid tag; anything other than `LB`/`RB` is not a bank.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "LB" => Some(BankTag::Left),
            "RB" => Some(BankTag::Right),
            _ => None,
        }
    }
}

// One row of the cross-section table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionRow {
    pub station: f64,
    pub elevation: f64,
    pub tag: Option<BankTag>,
    pub n: Option<f64>,
}

impl SectionRow {
    pub fn new(station: f64, elevation: f64) -> Self {
        SectionRow {
            station,
            elevation,
            tag: None,
            n: None,
        }
    }

    pub fn with_tag(mut self, tag: BankTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_n(mut self, n: f64) -> Self {
        self.n = Some(n);
        self
    }
}

/// A station-sorted bed profile with its bank stations and row roughness.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossSection {
    points: Vec<Point>,
    roughness_rows: Vec<RoughnessRow>,
    left_bank: Option<f64>,
    right_bank: Option<f64>,
}

impl CrossSection {
    /// Rows without a finite station and elevation are dropped. Banks come
    /// from the first `LB`/`RB` tag.
    pub fn from_rows(rows: &[SectionRow]) -> Self {
        let mut rows: Vec<SectionRow> = rows
            .iter()
            .filter(|r| r.station.is_finite() && r.elevation.is_finite())
            .copied()
            .collect();
        rows.sort_by(|a, b| a.station.total_cmp(&b.station));

        let bank = |side: BankTag| rows.iter().find(|r| r.tag == Some(side)).map(|r| r.station);
        let left_bank = bank(BankTag::Left);
        let right_bank = bank(BankTag::Right);

        CrossSection {
            points: rows.iter().map(|r| Point::new(r.station, r.elevation)).collect(),
            roughness_rows: rows.iter().map(|r| RoughnessRow::new(r.station, r.n)).collect(),
            left_bank,
            right_bank,
        }
    }

    /// Override tagged bank stations.
    pub fn with_banks(mut self, left: Option<f64>, right: Option<f64>) -> Self {
        if left.is_some() {
            self.left_bank = left;
        }
        if right.is_some() {
            self.right_bank = right;
        }
        self
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn roughness_rows(&self) -> &[RoughnessRow] {
        &self.roughness_rows
    }

    pub fn left_bank(&self) -> Option<f64> {
        self.left_bank
    }

    pub fn right_bank(&self) -> Option<f64> {
        self.right_bank
    }

    /// First and last station, `None` for an empty section.
    pub fn domain(&self) -> Option<(f64, f64)> {
        Some((self.points.first()?.station, self.points.last()?.station))
    }

    /// Lowest bed elevation.
    pub fn thalweg(&self) -> Option<f64> {
        self.points.iter().map(|p| p.elevation).reduce(f64::min)
    }

    pub fn stage_from_depth(&self, depth: f64) -> Option<f64> {
        self.thalweg().map(|z| z + depth)
    }

    /// Station-varying roughness built from the rows' n column.
    pub fn roughness_segments(&self) -> Result<Vec<RoughnessSegment>> {
        roughness::build_segments(&self.roughness_rows)
    }

    /// Runs of explicit n across the whole section, for plotting.
    pub fn explicit_roughness(&self) -> Vec<RoughnessSegment> {
        match self.domain() {
            Some((left, right)) => roughness::explicit_segments(&self.roughness_rows, left, right),
            None => Vec::new(),
        }
    }

    /// Horizontal:vertical ratios of the bank slopes.
    ///
    /// The left ratio uses the segment leaving the left-bank vertex, the right
    /// ratio the segment arriving at the right-bank vertex. `None` when the
    /// bank is not a vertex or its segment is flat.
    pub fn bank_slope_ratios(&self) -> (Option<f64>, Option<f64>) {
        let index_of = |station: Option<f64>| {
            let station = station?;
            self.points
                .iter()
                .position(|p| (p.station - station).abs() <= STATION_TOLERANCE)
        };
        let ratio = |a: &Point, b: &Point| {
            let dz = b.elevation - a.elevation;
            (dz.abs() > 0.0).then(|| ((b.station - a.station) / dz).abs())
        };

        let left = index_of(self.left_bank)
            .and_then(|i| Some((self.points.get(i)?, self.points.get(i + 1)?)))
            .and_then(|(a, b)| ratio(a, b));
        let right = index_of(self.right_bank)
            .and_then(|i| Some((self.points.get(i.checked_sub(1)?)?, self.points.get(i)?)))
            .and_then(|(a, b)| ratio(a, b));

        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn trapezoid() -> CrossSection {
        CrossSection::from_rows(&[
            SectionRow::new(30.0, 10.0).with_tag(BankTag::Right),
            SectionRow::new(0.0, 10.0).with_tag(BankTag::Left).with_n(0.04),
            SectionRow::new(10.0, 0.0),
            SectionRow::new(20.0, 0.0).with_n(0.03),
            SectionRow::new(f64::NAN, 1.0),
        ])
    }

    #[test]
    fn rows_are_sorted_and_banks_tagged() {
        let xs = trapezoid();
        let stations: Vec<f64> = xs.points().iter().map(|p| p.station).collect();
        assert_eq!(stations, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(xs.left_bank(), Some(0.0));
        assert_eq!(xs.right_bank(), Some(30.0));
        assert_eq!(xs.domain(), Some((0.0, 30.0)));
        assert_eq!(xs.thalweg(), Some(0.0));
        assert_eq!(xs.stage_from_depth(2.5), Some(2.5));
    }

    #[test]
    fn bank_overrides_replace_tags() {
        let xs = trapezoid().with_banks(Some(10.0), None);
        assert_eq!(xs.left_bank(), Some(10.0));
        assert_eq!(xs.right_bank(), Some(30.0));
    }

    #[test]
    fn tags_parse_case_insensitively() {
        assert_eq!(BankTag::parse(" lb "), Some(BankTag::Left));
        assert_eq!(BankTag::parse("RB"), Some(BankTag::Right));
        assert_eq!(BankTag::parse("toe"), None);
    }

    #[test]
    fn bank_slopes_use_adjacent_segments() {
        let (left, right) = trapezoid().bank_slope_ratios();
        assert_eq!(left, Some(1.0));
        assert_eq!(right, Some(1.0));

        let flat_bank = trapezoid().with_banks(Some(10.0), Some(20.0));
        assert_eq!(flat_bank.bank_slope_ratios(), (None, None));

        let off_vertex = trapezoid().with_banks(Some(5.0), None);
        assert_eq!(off_vertex.bank_slope_ratios().0, None);
    }

    #[test]
    fn row_roughness_feeds_segments() {
        let segments = trapezoid().roughness_segments().unwrap();
        let ns: Vec<f64> = segments.iter().map(|s| s.n).collect();
        assert_eq!(ns, vec![0.04, 0.04, 0.03]);

        let explicit = trapezoid().explicit_roughness();
        assert_eq!(explicit.len(), 2);
        assert_eq!(explicit[1].right, 30.0);
    }

    #[test]
    fn missing_leftmost_row_n_propagates() {
        let xs = CrossSection::from_rows(&[SectionRow::new(0.0, 1.0), SectionRow::new(5.0, 0.0).with_n(0.03)]);
        assert!(matches!(
            xs.roughness_segments(),
            Err(Error::MissingInitialRoughness { station: Some(0.0) })
        ));
    }

    #[test]
    fn empty_section_has_no_domain() {
        let xs = CrossSection::from_rows(&[]);
        assert_eq!(xs.domain(), None);
        assert_eq!(xs.thalweg(), None);
        assert!(xs.explicit_roughness().is_empty());
        assert_eq!(xs.bank_slope_ratios(), (None, None));
    }
}
