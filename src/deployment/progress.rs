use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while waiting on the model; silent when stderr is not a terminal
pub struct WaitSpinner {
    bar: ProgressBar,
}

impl WaitSpinner {
    pub fn new(message: &str) -> Self {
        let bar = if std::io::stderr().is_terminal() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    pub fn update(&self, message: String) {
        self.bar.set_message(message);
    }

    pub fn success(self, message: &str) {
        self.bar.finish_with_message(format!("✓ {message}"));
    }

    pub fn error(self, message: &str) {
        self.bar.finish_with_message(format!("✗ {message}"));
    }
}
