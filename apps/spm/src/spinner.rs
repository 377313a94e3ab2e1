//! Optional visual spinner (spec §5): runs on a dedicated thread whose
//! sole communication with the main thread is a single boolean flag
//! read on each tick. The spinner thread is joined before the caller
//! proceeds past the phase it was covering.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(80);

pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner rendering `message` to stderr until stopped.
    #[must_use]
    pub fn start(message: impl Into<String>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let message = message.into();

        let handle = std::thread::spawn(move || {
            let mut frame = 0usize;
            while flag.load(Ordering::Relaxed) {
                eprint!("\r{} {message}", FRAMES[frame % FRAMES.len()]);
                let _ = std::io::stderr().flush();
                frame += 1;
                std::thread::sleep(TICK);
            }
            eprint!("\r{}\r", " ".repeat(message.len() + 2));
            let _ = std::io::stderr().flush();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    /// Signal the thread to stop and join it.
    pub fn stop(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
