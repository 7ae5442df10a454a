//! JSON listing of the recording's flags.

use ctg_lib::progress::flag_overlay;
use ctg_lib::source::StreamSource;
use ctg_lib::types::{Flag, Timeline};
use serde::Serialize;

use super::CliError;

#[derive(Serialize)]
struct FlagListing<'a> {
    total_duration: f64,
    flags: Vec<FlagEntry<'a>>,
}

#[derive(Serialize)]
struct FlagEntry<'a> {
    #[serde(flatten)]
    flag: &'a Flag,
    /// Where the flag sits on the progress track, in percent.
    left_percent: f64,
    width_percent: f64,
}

/// Serialize a timeline with each flag's progress-track span.
pub fn render(timeline: &Timeline, pretty: bool) -> Result<String, CliError> {
    let spans = flag_overlay(&timeline.flags, timeline.total_duration)?;
    let listing = FlagListing {
        total_duration: timeline.total_duration,
        flags: timeline
            .flags
            .iter()
            .zip(spans)
            .map(|(flag, span)| FlagEntry {
                flag,
                left_percent: span.left,
                width_percent: span.width,
            })
            .collect(),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&listing)?
    } else {
        serde_json::to_string(&listing)?
    };
    Ok(json)
}

pub fn run(pretty: bool, source: &dyn StreamSource) -> Result<i32, CliError> {
    let timeline = source.fetch_timeline()?;
    println!("{}", render(&timeline, pretty)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctg_lib::types::Severity;
    use serde_json::Value;

    #[test]
    fn listing_carries_wire_fields_and_spans() {
        let timeline = Timeline {
            flags: vec![Flag {
                start: 250.0,
                end: 251.0,
                kind: "CRITICAL (Bradycardia)".to_string(),
                category: Some("III".to_string()),
                severity: Severity::High,
                details: None,
            }],
            total_duration: 1000.0,
        };

        let json: Value = serde_json::from_str(&render(&timeline, false).unwrap()).unwrap();
        let flag = &json["flags"][0];
        assert_eq!(json["total_duration"], 1000.0);
        assert_eq!(flag["type"], "CRITICAL (Bradycardia)");
        assert_eq!(flag["severity"], "high");
        assert_eq!(flag["left_percent"], 25.0);
        assert_eq!(flag["width_percent"], 0.5);
    }

    #[test]
    fn invalid_duration_is_an_error() {
        let timeline = Timeline {
            flags: vec![],
            total_duration: 0.0,
        };
        assert!(render(&timeline, true).is_err());
    }
}
