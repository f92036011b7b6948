// Display formatting shared by the TUI and the text report

/// Whole-dollar USD with thousands separators: `$220,000`, `-$1,500`
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// A rate in [0, 1] as a percentage with one decimal: `30.0%`
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// A percentage change with an explicit sign: `+12.8%`
pub fn format_change(percent: f64) -> String {
    format!("{:+.1}%", percent)
}
