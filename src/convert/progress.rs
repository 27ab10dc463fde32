use log::info;

/// Receives progress updates from a conversion. `fraction` runs from 0 to 1.
pub trait ProgressSink {
    fn report(&mut self, fraction: f32, label: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(f32, &str),
{
    fn report(&mut self, fraction: f32, label: &str) {
        self(fraction, label)
    }
}

/// Ignores every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _fraction: f32, _label: &str) {}
}

/// Logs every update at `info` level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, fraction: f32, label: &str) {
        info!("{:>3.0}% {label}", fraction * 100.0);
    }
}
