/// Receives progress notifications from long running computations.
///
/// Notifications are purely informational: the fraction goes from `0` to `1`
/// and observers cannot influence the result.
pub trait ProgressObserver: Sync {
    /// Called with the completed fraction of the work.
    fn on_progress(&self, fraction: f32);
}

impl<F> ProgressObserver for F
where
    F: Fn(f32) + Sync,
{
    fn on_progress(&self, fraction: f32) {
        self(fraction)
    }
}

/// Observer discarding every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _fraction: f32) {}
}

pub(crate) fn report(observer: Option<&dyn ProgressObserver>, done: usize, total: usize) {
    if let Some(observer) = observer {
        observer.on_progress(done as f32 / total.max(1) as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_are_observers() {
        let seen = Mutex::new(Vec::new());
        let observer = |f: f32| seen.lock().unwrap().push(f);
        report(Some(&observer), 1, 4);
        report(Some(&observer), 4, 4);
        report(None, 2, 4);
        assert_eq!(*seen.lock().unwrap(), vec![0.25, 1.0]);
    }
}
