//! Asynchronous timer abstraction providing the one-shot delays used for
//! bounded waits, display holds, and flow-control pacing.

/// Timer trait abstraction; must remain thread-safe when applicable.
pub trait DiagTimer {
    /// Asynchronously wait for `millis` milliseconds.
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl core::future::Future<Output = ()> + 'a;
}

/// [`DiagTimer`] backed by the embassy time driver.
#[cfg(feature = "embassy")]
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyTimer;

#[cfg(feature = "embassy")]
impl DiagTimer for EmbassyTimer {
    async fn delay_ms(&mut self, millis: u32) {
        embassy_time::Timer::after(embassy_time::Duration::from_millis(millis as u64)).await;
    }
}
