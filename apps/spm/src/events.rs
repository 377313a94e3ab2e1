//! Renders [`spm_events::Event`]s as they arrive. This is the only
//! place in the crate that turns engine events into user-visible text
//! (spec §2.2: library crates never print).

use console::style;
use spm_events::Event;

pub struct EventHandler {
    colors_enabled: bool,
    debug_enabled: bool,
    json_mode: bool,
}

impl EventHandler {
    #[must_use]
    pub fn new(colors_enabled: bool, debug_enabled: bool, json_mode: bool) -> Self {
        Self {
            colors_enabled,
            debug_enabled,
            json_mode,
        }
    }

    pub fn handle(&self, event: Event) {
        if self.json_mode {
            return;
        }
        match event {
            Event::Phase(message) => self.line("•", &message, false),
            Event::DownloadStarted { url, .. } => self.line("↓", &format!("downloading {url}"), false),
            Event::DownloadProgress { .. } => {}
            Event::DownloadFinished { url } => self.line("✓", &format!("downloaded {url}"), false),
            Event::ResolvedVersion { package, version } => {
                self.line("✓", &format!("resolved {package}={version}"), false)
            }
            Event::InstallSkipped { package, version } => {
                self.line("·", &format!("{package}={version} already installed"), false)
            }
            Event::InstallFinished { package, version } => {
                self.line("✓", &format!("installed {package}={version}"), false)
            }
            Event::Debug(message) => {
                if self.debug_enabled {
                    self.line("?", &message, true);
                }
            }
            Event::Warning(message) => self.line("!", &message, false),
        }
    }

    fn line(&self, icon: &str, message: &str, dim: bool) {
        if self.colors_enabled {
            let styled = if dim { style(message).dim() } else { style(message) };
            eprintln!("{icon} {styled}");
        } else {
            eprintln!("{icon} {message}");
        }
    }
}
