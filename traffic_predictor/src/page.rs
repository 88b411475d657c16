//! The single HTML page served at `/` and `/predict`.

use std::fmt::Write as _;

use traffic_pipeline::{HOLIDAYS, WEATHER};

use crate::types::PageView;

const STYLE: &str = "\
body{font-family:sans-serif;max-width:34rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.8rem}\
input,select{width:100%;padding:.3rem}\
button{margin-top:1.2rem;padding:.5rem 1.2rem}\
.prediction{color:#1b6e20;font-weight:bold}\
.error{color:#b00020}\
.notice{color:#8a6d00}";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select(out: &mut String, name: &str, label: &str, choices: &[&str]) {
    let _ = writeln!(out, "<label for=\"{name}\">{label}</label>");
    let _ = writeln!(out, "<select id=\"{name}\" name=\"{name}\">");
    for c in choices {
        let c = escape(c);
        let _ = writeln!(out, "<option value=\"{c}\">{c}</option>");
    }
    out.push_str("</select>\n");
}

fn number_input(out: &mut String, name: &str, label: &str, placeholder: &str) {
    let _ = writeln!(out, "<label for=\"{name}\">{label}</label>");
    let _ = writeln!(
        out,
        "<input id=\"{name}\" name=\"{name}\" type=\"text\" placeholder=\"{placeholder}\" required>"
    );
}

pub fn render(view: &PageView) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Traffic Volume Prediction</title>\n");
    let _ = writeln!(out, "<style>{STYLE}</style>");
    out.push_str("</head>\n<body>\n<h1>Traffic Volume Prediction</h1>\n");

    out.push_str("<form action=\"/predict\" method=\"post\">\n");
    select(&mut out, "holiday", "Holiday", &HOLIDAYS);
    number_input(&mut out, "temp", "Temperature (K)", "288.28");
    number_input(&mut out, "rain", "Rain in last hour (mm)", "0.0");
    number_input(&mut out, "snow", "Snow in last hour (mm)", "0.0");
    select(&mut out, "weather", "Weather", &WEATHER);
    out.push_str("<button type=\"submit\">Predict</button>\n</form>\n");

    if let Some(text) = &view.prediction_text {
        let _ = writeln!(out, "<p class=\"prediction\">{}</p>", escape(text));
    }
    if let Some(text) = &view.notice_text {
        let _ = writeln!(out, "<p class=\"notice\">{}</p>", escape(text));
    }
    if let Some(text) = &view.error_text {
        let _ = writeln!(out, "<p class=\"error\">{}</p>", escape(text));
    }

    out.push_str("</body>\n</html>\n");
    out
}
