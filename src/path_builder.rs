//! Representation of canonical Bézier paths.
//!
//! Path data in a document can use relative coordinates, horizontal/vertical shorthands,
//! smooth curves and quadratic curves.  None of that survives parsing: the path parser
//! pushes absolute [`PathSegment`]s into a [`PathBuilder`], and those are only ever
//! moves, lines, cubic curves and closes.
//!
//! * The [`PathBuilder`] is mutable, temporary storage for segments.  It uses a
//! [`TinyVec`] with space for 32 segments on the stack; most paths are shorter than that,
//! and larger ones spill to the heap.
//!
//! * The builder then gets turned into a long-term, immutable [`Path`] that has a more
//! compact representation.

use std::fmt;
use std::slice;

use tinyvec::TinyVec;

use crate::path_parser::{ParseError, PathParser};
use crate::rect::Rect;

/// "C" command for paths; describes a cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CubicBezierCurve {
    /// The (x, y) coordinates of the first control point.
    pub pt1: (f64, f64),
    /// The (x, y) coordinates of the second control point.
    pub pt2: (f64, f64),
    /// The (x, y) coordinates of the end point of this path segment.
    pub to: (f64, f64),
}

impl CubicBezierCurve {
    /// Consumes 6 coordinates and creates a curve segment.
    fn from_coords(coords: &mut slice::Iter<'_, f64>) -> CubicBezierCurve {
        let pt1 = take_two(coords);
        let pt2 = take_two(coords);
        let to = take_two(coords);

        CubicBezierCurve { pt1, pt2, to }
    }

    /// Pushes 6 coordinates to `coords` and returns `PackedSegment::CubicTo`.
    fn to_packed_and_coords(&self, coords: &mut Vec<f64>) -> PackedSegment {
        coords.push(self.pt1.0);
        coords.push(self.pt1.1);
        coords.push(self.pt2.0);
        coords.push(self.pt2.1);
        coords.push(self.to.0);
        coords.push(self.to.1);
        PackedSegment::CubicTo
    }
}

/// A single canonical path segment.
///
/// All points are absolute.  This is returned from iterators on paths and subpaths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CubicTo(CubicBezierCurve),
    ClosePath,
}

// This is just so we can use TinyVec, whose type parameter requires T: Default.
enum_default!(PathSegment, PathSegment::ClosePath);

impl PathSegment {
    /// Returns the number of coordinate values that this segment will generate in a `Path`.
    fn num_coordinates(&self) -> usize {
        match *self {
            PathSegment::MoveTo(..) => 2,
            PathSegment::LineTo(..) => 2,
            PathSegment::CubicTo(_) => 6,
            PathSegment::ClosePath => 0,
        }
    }

    /// Pushes a segment's coordinates to `coords` and returns the corresponding `PackedSegment`.
    fn to_packed(self, coords: &mut Vec<f64>) -> PackedSegment {
        match self {
            PathSegment::MoveTo(x, y) => {
                coords.push(x);
                coords.push(y);
                PackedSegment::MoveTo
            }

            PathSegment::LineTo(x, y) => {
                coords.push(x);
                coords.push(y);
                PackedSegment::LineTo
            }

            PathSegment::CubicTo(ref c) => c.to_packed_and_coords(coords),

            PathSegment::ClosePath => PackedSegment::ClosePath,
        }
    }

    /// Consumes a packed segment's coordinates from the `coords` iterator and returns the
    /// rehydrated `PathSegment`.
    fn from_packed(packed: PackedSegment, coords: &mut slice::Iter<'_, f64>) -> PathSegment {
        match packed {
            PackedSegment::MoveTo => {
                let (x, y) = take_two(coords);
                PathSegment::MoveTo(x, y)
            }

            PackedSegment::LineTo => {
                let (x, y) = take_two(coords);
                PathSegment::LineTo(x, y)
            }

            PackedSegment::CubicTo => PathSegment::CubicTo(CubicBezierCurve::from_coords(coords)),

            PackedSegment::ClosePath => PathSegment::ClosePath,
        }
    }
}

/// Constructs a path out of segments.
///
/// Create this with `PathBuilder::default`; you can then add segments to it or call the
/// `parse` method.  When you are finished constructing a path builder, turn it into a
/// `Path` with `into_path`.
#[derive(Default)]
pub struct PathBuilder {
    segments: TinyVec<[PathSegment; 32]>,
}

/// An immutable path with a compact representation.
///
/// This is constructed from a `PathBuilder` once it is finished.  You can get an iterator
/// for the path's segments with the `iter` method, or an iterator for its subpaths
/// (subsequences of segments that start with a MoveTo) with the `iter_subpath` method.
///
/// Segments are stored as two dense arrays: one with a compact tag per segment, and
/// another with a linear list of the coordinates for each segment.
#[derive(Default, Clone)]
pub struct Path {
    segments: Box<[PackedSegment]>,
    coords: Box<[f64]>,
}

/// Packed version of a `PathSegment`, used in `Path`.
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
enum PackedSegment {
    MoveTo,
    LineTo,
    CubicTo,
    ClosePath,
}

impl PackedSegment {
    // Returns the number of coordinate values that this segment will generate in a `Path`.
    fn num_coordinates(&self) -> usize {
        match *self {
            PackedSegment::MoveTo => 2,
            PackedSegment::LineTo => 2,
            PackedSegment::CubicTo => 6,
            PackedSegment::ClosePath => 0,
        }
    }
}

impl PathBuilder {
    /// Parses path data and appends the resulting segments.
    ///
    /// Parsing is lenient: a malformed or unsupported segment is skipped and parsing
    /// resumes at the next command letter.  All the segments that could be recovered are
    /// kept in the builder; the errors for the skipped parts are returned.
    pub fn parse(&mut self, path_str: &str) -> Result<(), Vec<ParseError>> {
        let mut parser = PathParser::new(self, path_str);
        parser.parse()
    }

    /// Consumes the `PathBuilder` and returns a compact, immutable representation as a `Path`.
    pub fn into_path(self) -> Path {
        let num_coords = self
            .segments
            .iter()
            .map(PathSegment::num_coordinates)
            .sum();

        let mut coords = Vec::with_capacity(num_coords);
        let packed_segments: Vec<_> = self
            .segments
            .iter()
            .map(|seg| seg.to_packed(&mut coords))
            .collect();

        Path {
            segments: packed_segments.into_boxed_slice(),
            coords: coords.into_boxed_slice(),
        }
    }

    /// Adds a MoveTo segment to the path.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::MoveTo(x, y));
    }

    /// Adds a LineTo segment to the path.
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::LineTo(x, y));
    }

    /// Adds a CubicTo segment to the path.
    pub fn curve_to(&mut self, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        let curve = CubicBezierCurve {
            pt1: (x2, y2),
            pt2: (x3, y3),
            to: (x4, y4),
        };
        self.segments.push(PathSegment::CubicTo(curve));
    }

    /// Adds a ClosePath segment to the path.
    pub fn close_path(&mut self) {
        self.segments.push(PathSegment::ClosePath);
    }
}

/// An iterator over the subpaths of a `Path`.
pub struct SubPathIter<'a> {
    path: &'a Path,
    segments_start: usize,
    coords_start: usize,
}

/// A slice of segments and coordinates with a single `MoveTo` at the beginning.
pub struct SubPath<'a> {
    segments: &'a [PackedSegment],
    coords: &'a [f64],
}

/// An iterator over the segments of a subpath.
pub struct SubPathSegmentsIter<'a> {
    segments_iter: slice::Iter<'a, PackedSegment>,
    coords_iter: slice::Iter<'a, f64>,
}

impl<'a> SubPath<'a> {
    /// Returns an iterator over the subpath's segments.
    pub fn iter_segments(&self) -> SubPathSegmentsIter<'_> {
        SubPathSegmentsIter {
            segments_iter: self.segments.iter(),
            coords_iter: self.coords.iter(),
        }
    }

    /// Each subpath starts with a MoveTo; this returns its `(x, y)` coordinates.
    pub fn origin(&self) -> (f64, f64) {
        match self.iter_segments().next() {
            Some(PathSegment::MoveTo(x, y)) => (x, y),
            _ => (0.0, 0.0),
        }
    }
}

impl<'a> Iterator for SubPathIter<'a> {
    type Item = SubPath<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // If we ended on our last segment in the previous iteration, we're done here
        if self.segments_start >= self.path.segments.len() {
            return None;
        }

        // Otherwise we have at least one segment left; every subpath starts with a
        // MoveTo, which the path parser guarantees.
        let segments = &self.path.segments[self.segments_start..];
        let mut num_coords = segments[0].num_coordinates();

        for (i, seg) in segments.iter().enumerate().skip(1) {
            // A MoveTo ends the current subpath
            if let PackedSegment::MoveTo = seg {
                let subpath_coords_start = self.coords_start;

                self.segments_start += i;
                self.coords_start += num_coords;

                return Some(SubPath {
                    segments: &segments[..i],
                    coords: &self.path.coords
                        [subpath_coords_start..subpath_coords_start + num_coords],
                });
            } else {
                num_coords += seg.num_coordinates();
            }
        }

        // If we didn't find any MoveTo, we return the rest of the path and set
        // segments_start so the next iteration will return None.
        self.segments_start = self.path.segments.len();

        let subpath_coords_start = self.coords_start;
        self.coords_start = self.path.coords.len();

        Some(SubPath {
            segments,
            coords: &self.path.coords[subpath_coords_start..],
        })
    }
}

impl<'a> Iterator for SubPathSegmentsIter<'a> {
    type Item = PathSegment;

    fn next(&mut self) -> Option<Self::Item> {
        self.segments_iter
            .next()
            .map(|packed| PathSegment::from_packed(*packed, &mut self.coords_iter))
    }
}

impl Path {
    /// Get an iterator over a path `Subpath`s.
    pub fn iter_subpath(&self) -> SubPathIter<'_> {
        SubPathIter {
            path: self,
            segments_start: 0,
            coords_start: 0,
        }
    }

    /// Get an iterator over a path's segments.
    pub fn iter(&self) -> impl Iterator<Item = PathSegment> + '_ {
        let segments = self.segments.iter();
        let mut coords = self.coords.iter();

        segments.map(move |seg| PathSegment::from_packed(*seg, &mut coords))
    }

    /// Returns whether there are no segments in the path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Bounding box of every point of the path, control points included.
    ///
    /// This is the box of the control polygon, which always contains the curve itself
    /// but may be larger than the tight box.  Returns `None` for an empty path.
    pub fn control_polygon_extents(&self) -> Option<Rect> {
        self.coords
            .chunks_exact(2)
            .map(|pt| Rect::new(pt[0], pt[1], pt[0], pt[1]))
            .reduce(|acc, r| acc.union(&r))
    }
}

impl fmt::Display for Path {
    /// Writes the path back as absolute path data.
    ///
    /// Parsing the result yields the same segments.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }

            match seg {
                PathSegment::MoveTo(x, y) => write!(f, "M {x} {y}")?,
                PathSegment::LineTo(x, y) => write!(f, "L {x} {y}")?,
                PathSegment::CubicTo(CubicBezierCurve { pt1, pt2, to }) => write!(
                    f,
                    "C {} {} {} {} {} {}",
                    pt1.0, pt1.1, pt2.0, pt2.1, to.0, to.1
                )?,
                PathSegment::ClosePath => write!(f, "Z")?,
            }
        }

        Ok(())
    }
}

fn take_one(iter: &mut slice::Iter<'_, f64>) -> f64 {
    iter.next().copied().unwrap_or_default()
}

fn take_two(iter: &mut slice::Iter<'_, f64>) -> (f64, f64) {
    (take_one(iter), take_one(iter))
}
