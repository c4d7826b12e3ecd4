use super::{Bounds, Point};

/// Pointer path accumulated during a brush, eraser or lasso gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokePath {
    points: Vec<Point>,
}

impl StrokePath {
    pub fn new(start: Point) -> Self {
        Self {
            points: vec![start],
        }
    }

    pub fn append_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points.iter().copied())
    }
}

impl FromIterator<Point> for StrokePath {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_path_records_points_in_order() {
        let mut path = StrokePath::new(Point::new(1.0, 1.0));
        path.append_point(Point::new(4.0, 2.0));
        path.append_point(Point::new(3.0, 9.0));

        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(Point::new(3.0, 9.0)));
        assert_eq!(path.bounds(), Some(Bounds::new(1.0, 1.0, 3.0, 8.0)));
    }
}
