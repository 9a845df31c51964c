//! Request-time helpers for the event creation wizard.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::path::Path;
use std::{env, fs};

/// Raw key/value pairs posted by the wizard form
pub type WizardForm = HashMap<String, String>;

const FORM_DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M";
const FALLBACK_TIMEZONE: &str = "UTC";

/// IANA name of the host's local timezone, `"UTC"` when it cannot be determined.
///
/// Looks at `TZ`, then `/etc/timezone`, then the target of the `/etc/localtime` symlink.
pub fn current_timezone() -> String {
    detect_timezone(
        env::var("TZ").ok(),
        Path::new("/etc/timezone"),
        Path::new("/etc/localtime"),
    )
}

fn detect_timezone(tz_var: Option<String>, timezone_file: &Path, localtime: &Path) -> String {
    let candidates = tz_var
        .into_iter()
        .chain(fs::read_to_string(timezone_file).ok())
        .chain(fs::read_link(localtime).ok().and_then(|target| {
            let target = target.to_str()?.to_string();
            zone_from_zoneinfo_path(&target)
        }));

    candidates
        .map(|candidate| candidate.trim().trim_start_matches(':').to_string())
        .find(|candidate| candidate.parse::<Tz>().is_ok())
        .unwrap_or_else(|| FALLBACK_TIMEZONE.to_string())
}

/// `/usr/share/zoneinfo/Europe/Berlin` -> `Europe/Berlin`
fn zone_from_zoneinfo_path(path: &str) -> Option<String> {
    path.split_once("zoneinfo/")
        .map(|(_, zone)| zone.to_string())
}

/// Combines `{field}_date` (`MM/DD/YYYY`) and `{field}_time` (`HH:MM`) from the form.
///
/// Missing keys and unparseable values both yield `None`.
pub fn event_time_field(form: &WizardForm, field: &str) -> Option<NaiveDateTime> {
    let date = form.get(&format!("{field}_date"))?;
    let time = form.get(&format!("{field}_time"))?;
    NaiveDateTime::parse_from_str(
        &format!("{} {}", date.trim(), time.trim()),
        FORM_DATETIME_FORMAT,
    )
    .ok()
}
