/// Streaming minimum over one frame's pick candidates.
///
/// Offer every candidate first, then [`ClosestPicker::resolve`] once; resolving
/// re-arms the picker so nothing from this frame can leak into the next.
#[derive(Debug, Clone)]
pub struct ClosestPicker<T> {
    best: Option<T>,
    distance: f32,
}

impl<T> Default for ClosestPicker<T> {
    fn default() -> Self {
        Self {
            best: None,
            distance: f32::INFINITY,
        }
    }
}

impl<T> ClosestPicker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps `candidate` only when strictly closer than the current best, so
    /// equal distances favour whichever was offered first.
    pub fn offer(&mut self, candidate: T, distance: f32) -> bool {
        if distance < self.distance {
            self.distance = distance;
            self.best = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn distance(&self) -> Option<f32> {
        self.best.as_ref().map(|_| self.distance)
    }

    pub fn resolve(&mut self) -> Option<T> {
        self.distance = f32::INFINITY;
        self.best.take()
    }

    pub fn reset(&mut self) {
        self.distance = f32::INFINITY;
        self.best = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rearms_the_picker() {
        let mut picker = ClosestPicker::new();
        picker.offer("first", 1.0);
        assert_eq!(picker.resolve(), Some("first"));
        assert_eq!(picker.resolve(), None);
        assert_eq!(picker.distance(), None);

        picker.offer("second", 50.0);
        assert_eq!(picker.resolve(), Some("second"));
    }

    #[test]
    fn ties_keep_first_offer() {
        let mut picker = ClosestPicker::new();
        for (index, distance) in [5.0, 3.0, 3.0, 4.0].into_iter().enumerate() {
            picker.offer(index, distance);
        }
        assert_eq!(picker.distance(), Some(3.0));
        assert_eq!(picker.resolve(), Some(1));
    }

    #[test]
    fn infinite_distances_are_never_kept() {
        let mut picker = ClosestPicker::new();
        assert!(!picker.offer((), f32::INFINITY));
        assert_eq!(picker.resolve(), None);
    }
}
