/// ProgressReporter port for user-facing progress output
///
/// Progress goes to stderr so stdout stays reserved for `--output -`.
pub trait ProgressReporter {
    /// Reports a one-off status line
    fn report(&self, message: &str);

    /// Reports position within a longer run, e.g. file 3 of 12
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    fn report_error(&self, message: &str);

    /// Reports that the run finished
    fn report_completion(&self, message: &str);
}
