use geo::{Coordinate, GeoFloat, Line};

/// Interface for segment inputs of the intersection sweep.
pub trait Crossable {
    type Scalar: GeoFloat;
    fn line(&self) -> Line<Self::Scalar>;
}

impl<T: GeoFloat> Crossable for Line<T> {
    type Scalar = T;

    #[inline]
    fn line(&self) -> Line<T> {
        *self
    }
}

impl<T: GeoFloat> Crossable for (Coordinate<T>, Coordinate<T>) {
    type Scalar = T;

    #[inline]
    fn line(&self) -> Line<T> {
        Line::new(self.0, self.1)
    }
}

impl<C: Crossable> Crossable for &C {
    type Scalar = C::Scalar;

    #[inline]
    fn line(&self) -> Line<Self::Scalar> {
        C::line(*self)
    }
}
