/// Report rendering for the terminal and for JSON consumers
use crate::error::Result;
use loudscope_engine::{Level, LoudnessReport};
use std::fmt::Write;

/// Human-readable summary, optionally followed by the series table
pub fn render_text(report: &LoudnessReport, with_series: bool) -> String {
    let r = &report.result;
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "Integrated loudness: {} LUFS", Level(r.integrated_lufs));
    let _ = writeln!(out, "Loudness range:      {:.1} LU", r.loudness_range_lu);
    let _ = writeln!(out, "Short-term max:      {} LUFS", Level(r.short_term_max_lufs));
    let _ = writeln!(out, "Momentary max:       {} LUFS", Level(r.momentary_max_lufs));
    let _ = writeln!(out, "True peak:           {:.1} dBTP", r.true_peak_dbtp);
    let _ = writeln!(out, "Sample peak:         {:.1} dBFS", r.sample_peak_dbfs);
    let _ = writeln!(
        out,
        "Duration:            {:.2} s ({} Hz, {} ch)",
        r.duration_seconds, r.sample_rate, r.channels
    );

    if with_series && !report.series.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:>9}  {:>10}  {:>10}", "time (s)", "momentary", "short-term");
        let step = report.series.step_seconds;
        for (k, (m, s)) in report
            .series
            .momentary
            .iter()
            .zip(&report.series.short_term)
            .enumerate()
        {
            let _ = writeln!(
                out,
                "{:>9.2}  {:>10}  {:>10}",
                k as f64 * step,
                Level(*m).to_string(),
                Level(*s).to_string()
            );
        }
    }

    out
}

/// JSON report; the series is dropped unless asked for
pub fn render_json(report: &LoudnessReport, with_series: bool) -> Result<String> {
    let json = if with_series {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string_pretty(&report.result)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loudscope_engine::{analyze, SampleBuffer};

    fn report(amplitude: f32) -> LoudnessReport {
        let tone: Vec<f32> = (0..48000)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * 997.0 * i as f32 / 48000.0).sin())
            .collect();
        analyze(&SampleBuffer::new(vec![tone], 48000)).unwrap()
    }

    #[test]
    fn test_text_summary() {
        let text = render_text(&report(0.1), false);
        assert!(text.contains("Integrated loudness: -23.0 LUFS"), "{}", text);
        assert!(text.contains("48000 Hz, 1 ch"));
        assert!(!text.contains("momentary  short-term"));
    }

    #[test]
    fn test_text_series_and_silence() {
        let text = render_text(&report(0.0), true);
        assert!(text.contains("Integrated loudness: -inf LUFS"));
        assert!(text.contains("-100.0 dBTP"));
        assert!(text.contains("short-term"));
    }

    #[test]
    fn test_json_result_only() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&report(0.0), false).unwrap()).unwrap();
        assert!(json["integrated"].is_null());
        assert!(json.get("series").is_none());
    }

    #[test]
    fn test_json_with_series() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&report(0.1), true).unwrap()).unwrap();
        assert!(json["result"]["integrated"].as_f64().unwrap() < -22.0);
        assert_eq!(json["series"]["momentary"].as_array().unwrap().len(), 6);
    }
}
