use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use pixwarp::imgproc::progress::ProgressReporter;

const BAR_WIDTH: usize = 100;

/// Textual progress bar, rendered as `[====>    ] 42.0 %` on one line.
///
/// Render workers call in concurrently; the writer lock is held only for
/// the print itself. Repeated fractions mapping to the same permille are
/// dropped so a wide image does not flood the terminal.
pub struct ProgressBar {
    last_permille: AtomicUsize,
    out: Mutex<std::io::Stdout>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            last_permille: AtomicUsize::new(usize::MAX),
            out: Mutex::new(std::io::stdout()),
        }
    }
}

impl ProgressReporter for ProgressBar {
    fn report(&self, fraction: f64) {
        let permille = (fraction * 1000.0) as usize;
        if self.last_permille.swap(permille, Ordering::Relaxed) == permille {
            return;
        }

        let pos = (fraction * BAR_WIDTH as f64) as usize;
        let mut line = String::with_capacity(BAR_WIDTH + 16);
        line.push('[');
        for i in 0..BAR_WIDTH {
            line.push(if i < pos {
                '='
            } else if i == pos {
                '>'
            } else {
                ' '
            });
        }
        line.push_str(&format!("] {:.1} %\r", permille as f64 / 10.0));

        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(line.as_bytes());
            let _ = out.flush();
        }
    }
}
