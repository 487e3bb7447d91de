//! Display formatting for numeric cell values.
//!
//! Two renderings are supported, both locale-independent:
//!
//! - serial dates (1900 date system) rendered as `yyyy-MM-dd HH:mm:ss`
//! - numbers rendered through an Excel number format code: `General`,
//!   fixed/grouped decimals, percentages, scientific notation and literal
//!   prefixes/suffixes, with positive/negative/zero sections
//! - fractions (`# ?/?`, `# ??/??`, `?/8`) as `whole numerator/denominator`
//!
//! Rounding is half away from zero on the value's 15-significant-digit
//! decimal form, so `2.5` shows as `3` and `1.005` as `1.01` with `0.00`.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Output pattern for serial dates.
pub const DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

const MILLIS_PER_DAY: f64 = 86_400_000.0;
// 9999-12-31, the last day Excel can represent
const MAX_SERIAL_DAY: i64 = 2_958_465;
// Above 2^53 every f64 is already an integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;
// Fraction denominators are searched up to 9999.
const MAX_DENOMINATOR_DIGITS: usize = 4;

/// Convert a 1900-system serial date number into a calendar date-time.
///
/// Serials below 61 account for Excel treating 1900 as a leap year, so
/// serial 1 is 1900-01-01 and serial 61 is 1900-03-01. The time of day is
/// rounded to the nearest millisecond. Negative or out-of-range serials
/// yield `None`.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let whole_days = serial.floor() as i64;
    if whole_days > MAX_SERIAL_DAY {
        return None;
    }
    let millis = ((serial - serial.floor()) * MILLIS_PER_DAY + 0.5) as i64;

    let epoch = if whole_days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let midnight = epoch
        .checked_add_signed(Duration::days(whole_days))?
        .and_hms_opt(0, 0, 0)?;
    midnight.checked_add_signed(Duration::milliseconds(millis))
}

/// Render a serial date as `yyyy-MM-dd HH:mm:ss`.
pub fn format_serial_date(serial: f64) -> Option<String> {
    serial_to_datetime(serial).map(|dt| dt.format(DATE_TIME_PATTERN).to_string())
}

/// Render a number the way Excel's `General` format displays it.
///
/// Integers print without a fraction; other values keep at most eleven
/// significant digits; very large or very small magnitudes switch to
/// scientific notation (`1.23457E+11`).
pub fn format_general(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude.fract() == 0.0 && magnitude < 1e11 {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value as i64).to_string();
    }

    if !(1e-10..1e11).contains(&magnitude) {
        return format_scientific_general(value);
    }

    // Round to 11 significant digits, then let ryu find the shortest form.
    let exponent = magnitude.log10().floor() as i32;
    let decimals = (10 - exponent).clamp(0, 15) as usize;
    let rounded = round_half_away(value, decimals);

    let mut buffer = ryu::Buffer::new();
    let text = buffer.format(rounded);
    text.strip_suffix(".0").unwrap_or(text).to_string()
}

/// Round `value` to `decimals` places, ties away from zero.
///
/// The scaled value is first settled to 15 significant digits so binary
/// noise (`1.005 * 100 == 100.49999999999999`) does not defeat the tie.
fn round_half_away(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }

    let settled: f64 = fast_float2::parse(format!("{:.14e}", scaled)).unwrap_or(scaled);
    settled.round() / factor
}

fn format_scientific_general(value: f64) -> String {
    let formatted = format!("{:.5E}", value);
    let (mantissa, exponent) = formatted.split_once('E').unwrap_or((&formatted, "0"));

    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}E{}{:02}", mantissa, sign, exponent.abs())
}

/// Render `value` through an Excel number format code.
///
/// The code may have up to four `;`-separated sections (positive, negative,
/// zero, text). A negative value rendered by the first section gets a
/// leading minus; a dedicated negative section controls its own signs.
pub fn format_number(value: f64, format_code: &str) -> String {
    let sections = split_sections(format_code);

    let (section, auto_minus) = match sections.len() {
        0 => return format_general(value),
        1 => (sections[0], value < 0.0),
        2 => {
            if value < 0.0 {
                (sections[1], false)
            } else {
                (sections[0], false)
            }
        },
        _ => {
            if value < 0.0 {
                (sections[1], false)
            } else if value == 0.0 {
                (sections[2], false)
            } else {
                (sections[0], false)
            }
        },
    };

    let trimmed = section.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.eq_ignore_ascii_case("general") || trimmed == "@" {
        return format_general(value);
    }

    let rendered = format_section(value.abs(), section);
    if auto_minus && rendered.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        format!("-{}", rendered)
    } else {
        rendered
    }
}

/// Split a format code on `;` outside quotes, escapes and brackets.
fn split_sections(code: &str) -> Vec<&str> {
    let mut sections = Vec::with_capacity(4);
    let mut in_quotes = false;
    let mut escaped = false;
    let mut in_brackets = false;
    let mut start = 0;

    for (idx, ch) in code.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '"' => in_quotes = !in_quotes,
            '\\' if !in_quotes => escaped = true,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            ';' if !in_quotes && !in_brackets => {
                sections.push(&code[start..idx]);
                start = idx + 1;
            },
            _ => {},
        }
    }
    sections.push(&code[start..]);
    sections
}

/// A format section broken into literal prefix, numeric pattern and literal suffix.
struct SectionParts<'a> {
    prefix: &'a str,
    number: &'a str,
    suffix: &'a str,
}

fn split_placeholders(section: &str) -> Option<SectionParts<'_>> {
    let mut in_quotes = false;
    let mut skip_next = false;
    let mut in_brackets = false;
    let mut first = None;
    let mut last = 0;

    let mut chars = section.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if in_quotes {
            if ch == '"' {
                in_quotes = false;
            }
            continue;
        }
        if in_brackets {
            if ch == ']' {
                in_brackets = false;
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            '[' => in_brackets = true,
            '\\' | '_' | '*' => skip_next = true,
            '0' | '#' | '?' => {
                first.get_or_insert(idx);
                last = idx + 1;
            },
            // Decimal point, grouping and exponent parts belong to the number
            // once it has started.
            '.' | ',' if first.is_some() => last = idx + 1,
            '.' if matches!(chars.peek(), Some((_, '0' | '#' | '?'))) => {
                first.get_or_insert(idx);
                last = idx + 1;
            },
            // Fraction bar, with an optional literal denominator (`?/8`).
            '/' if first.is_some() => {
                last = idx + 1;
                while let Some(&(digit_idx, '1'..='9')) = chars.peek() {
                    chars.next();
                    last = digit_idx + 1;
                }
            },
            'E' | 'e' if first.is_some() => {
                if let Some(&(_, sign @ ('+' | '-'))) = chars.peek() {
                    chars.next();
                    last = idx + 1 + sign.len_utf8();
                }
            },
            _ => {},
        }
    }

    let start = first?;
    Some(SectionParts {
        prefix: &section[..start],
        number: &section[start..last],
        suffix: &section[last..],
    })
}

fn format_section(value: f64, section: &str) -> String {
    let Some(parts) = split_placeholders(section) else {
        // No digit placeholders: the section is pure literal text.
        return render_literal(section);
    };

    let percent_count = section_literal_count(section, '%');
    let mut scaled = value;
    for _ in 0..percent_count {
        scaled *= 100.0;
    }

    let body = if parts.number.contains('/') {
        format_fraction(scaled, &FractionLayout::parse(parts.number))
    } else {
        match parts.number.find(['E', 'e']) {
            Some(pos) => format_scientific(scaled, &parts.number[..pos], &parts.number[pos + 1..]),
            None => format_fixed(scaled, &FixedLayout::parse(parts.number)),
        }
    };

    let mut out = render_literal(parts.prefix);
    out.push_str(&body);
    out.push_str(&render_literal(parts.suffix));
    out
}

/// Count occurrences of `needle` outside quotes and escapes.
fn section_literal_count(section: &str, needle: char) -> usize {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut count = 0;
    for ch in section.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '"' => in_quotes = !in_quotes,
            '\\' | '_' | '*' if !in_quotes => escaped = true,
            c if c == needle && !in_quotes => count += 1,
            _ => {},
        }
    }
    count
}

/// Render the literal parts of a format section.
///
/// Quoted text and backslash escapes are copied, `_x` becomes a space,
/// `*x` repeat fills are dropped and bracketed modifiers are removed except
/// for currency symbols (`[$€-407]` renders `€`).
fn render_literal(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                for quoted in chars.by_ref() {
                    if quoted == '"' {
                        break;
                    }
                    out.push(quoted);
                }
            },
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            },
            '_' => {
                if chars.next().is_some() {
                    out.push(' ');
                }
            },
            '*' => {
                chars.next();
            },
            '[' => {
                let mut modifier = String::new();
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    modifier.push(inner);
                }
                if let Some(currency) = modifier.strip_prefix('$') {
                    let symbol = currency.split('-').next().unwrap_or("");
                    out.push_str(symbol);
                }
            },
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone)]
struct FixedLayout {
    min_int: usize,
    int_placeholders: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: bool,
    scale_commas: usize,
    has_decimal_point: bool,
}

impl FixedLayout {
    fn parse(pattern: &str) -> Self {
        let mut raw = pattern;
        let mut scale_commas = 0;
        while let Some(stripped) = raw.strip_suffix(',') {
            raw = stripped;
            scale_commas += 1;
        }

        let decimal_pos = raw.find('.');
        let (int_pat, frac_pat) = match decimal_pos {
            Some(pos) => (&raw[..pos], &raw[pos + 1..]),
            None => (raw, ""),
        };

        let is_placeholder = |c: &char| matches!(c, '0' | '#' | '?');
        FixedLayout {
            min_int: int_pat.chars().filter(|c| *c == '0').count(),
            int_placeholders: int_pat.chars().filter(is_placeholder).count(),
            min_frac: frac_pat.chars().filter(|c| *c == '0').count(),
            max_frac: frac_pat.chars().filter(is_placeholder).count(),
            grouping: int_pat.contains(','),
            scale_commas,
            has_decimal_point: decimal_pos.is_some(),
        }
    }
}

fn format_fixed(mut value: f64, layout: &FixedLayout) -> String {
    for _ in 0..layout.scale_commas {
        value /= 1000.0;
    }

    let rounded = round_half_away(value, layout.max_frac);
    let formatted = format!("{:.*}", layout.max_frac, rounded);
    let (int_digits, frac_digits) = formatted.split_once('.').unwrap_or((&formatted, ""));

    let mut int_part = int_digits.to_string();
    if layout.int_placeholders == 0 || (layout.min_int == 0 && int_part == "0") {
        int_part.clear();
    }
    while int_part.len() < layout.min_int {
        int_part.insert(0, '0');
    }
    if layout.grouping && int_part.len() > 3 {
        int_part = group_thousands(&int_part);
    }

    let mut frac_part = frac_digits.to_string();
    while frac_part.len() > layout.min_frac && frac_part.ends_with('0') {
        frac_part.pop();
    }

    let mut out = int_part;
    if layout.has_decimal_point && (layout.max_frac == 0 || !frac_part.is_empty()) {
        out.push('.');
    }
    out.push_str(&frac_part);
    if out.is_empty() {
        out.push('0');
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Denominator {
    /// Best approximation with at most this many digits (`?/??`)
    UpToDigits(usize),
    /// Always this denominator (`?/8`)
    Fixed(u32),
}

#[derive(Debug, Clone)]
struct FractionLayout {
    /// Integer part shown separately (`# ?/?`); otherwise the fraction is improper
    has_whole: bool,
    /// `0` placeholder in the integer part: a zero whole number still shows
    whole_required: bool,
    denominator: Denominator,
}

impl FractionLayout {
    fn parse(pattern: &str) -> Self {
        let (numerator_side, denominator_side) = pattern.split_once('/').unwrap_or((pattern, ""));

        let numerator_side = numerator_side.trim_end();
        let whole_pattern = numerator_side
            .rsplit_once(' ')
            .map(|(whole, _)| whole.trim())
            .filter(|whole| whole.contains(['0', '#', '?']));

        let denominator_side = denominator_side.trim();
        let denominator = match denominator_side.chars().next() {
            Some('1'..='9') => match denominator_side.parse::<u32>() {
                Ok(fixed) => Denominator::Fixed(fixed),
                Err(_) => Denominator::UpToDigits(1),
            },
            _ => {
                let digits = denominator_side
                    .chars()
                    .filter(|c| matches!(c, '0' | '#' | '?'))
                    .count();
                Denominator::UpToDigits(digits.clamp(1, MAX_DENOMINATOR_DIGITS))
            },
        };

        FractionLayout {
            has_whole: whole_pattern.is_some(),
            whole_required: whole_pattern.is_some_and(|whole| whole.contains('0')),
            denominator,
        }
    }
}

/// Closest `numerator/denominator` to `fraction` (in `[0, 1)` for mixed
/// fractions), preferring the smallest denominator on ties.
fn approximate_fraction(fraction: f64, denominator: Denominator) -> (u64, u64) {
    match denominator {
        Denominator::Fixed(fixed) => {
            let fixed = u64::from(fixed);
            ((fraction * fixed as f64).round() as u64, fixed)
        },
        Denominator::UpToDigits(digits) => {
            let max = 10u64.pow(digits as u32) - 1;
            let mut best = (fraction.round() as u64, 1u64);
            let mut best_error = (fraction - best.0 as f64).abs();
            for denominator in 2..=max {
                let numerator = (fraction * denominator as f64).round();
                let error = (fraction - numerator / denominator as f64).abs();
                if error < best_error {
                    best = (numerator as u64, denominator);
                    best_error = error;
                }
            }
            best
        },
    }
}

fn format_fraction(value: f64, layout: &FractionLayout) -> String {
    let mut out = String::new();
    let mut int_buffer = itoa::Buffer::new();

    if !layout.has_whole {
        let (numerator, denominator) = approximate_fraction(value, layout.denominator);
        if numerator == 0 {
            return "0".to_string();
        }
        out.push_str(int_buffer.format(numerator));
        out.push('/');
        out.push_str(int_buffer.format(denominator));
        return out;
    }

    let mut whole = value.trunc() as u64;
    let (mut numerator, denominator) = approximate_fraction(value.fract(), layout.denominator);
    if numerator >= denominator {
        whole += numerator / denominator;
        numerator %= denominator;
    }

    if whole > 0 || layout.whole_required || numerator == 0 {
        out.push_str(int_buffer.format(whole));
    }
    if numerator > 0 {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(int_buffer.format(numerator));
        out.push('/');
        out.push_str(int_buffer.format(denominator));
    }
    out
}

fn format_scientific(value: f64, mantissa_pattern: &str, exponent_pattern: &str) -> String {
    let layout = FixedLayout::parse(mantissa_pattern);
    let (sign_always, exponent_digits) = match exponent_pattern.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, exponent_pattern.strip_prefix('-').unwrap_or(exponent_pattern)),
    };
    let width = exponent_digits.chars().filter(|c| matches!(c, '0' | '#' | '?')).count().max(1);

    // Mantissa keeps as many integer digits as the pattern asks for (##0.0E+0
    // is engineering notation with exponents in steps of three).
    let step = layout.int_placeholders.max(1) as i32;
    let mut exponent = if value == 0.0 {
        0
    } else {
        let raw = value.log10().floor() as i32;
        if step > 1 { raw.div_euclid(step) * step } else { raw }
    };

    let mut mantissa = value / 10f64.powi(exponent);
    mantissa = round_half_away(mantissa, layout.max_frac);
    if value != 0.0 && mantissa >= 10f64.powi(step) {
        mantissa /= 10f64.powi(step);
        exponent += step;
    }

    let sign = if exponent < 0 {
        "-"
    } else if sign_always {
        "+"
    } else {
        ""
    };
    format!(
        "{}E{}{:0width$}",
        format_fixed(mantissa, &layout),
        sign,
        exponent.abs(),
        width = width
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_dates() {
        assert_eq!(format_serial_date(44197.0).unwrap(), "2021-01-01 00:00:00");
        assert_eq!(format_serial_date(1.0).unwrap(), "1900-01-01 00:00:00");
        assert_eq!(format_serial_date(59.0).unwrap(), "1900-02-28 00:00:00");
        assert_eq!(format_serial_date(61.0).unwrap(), "1900-03-01 00:00:00");
        assert_eq!(format_serial_date(43831.5).unwrap(), "2020-01-01 12:00:00");
        assert_eq!(format_serial_date(44197.999999).unwrap(), "2021-01-01 23:59:59");
    }

    #[test]
    fn test_serial_dates_out_of_range() {
        assert!(format_serial_date(-1.0).is_none());
        assert!(format_serial_date(f64::NAN).is_none());
        assert!(format_serial_date(3_000_000.0).is_none());
    }

    #[test]
    fn test_general() {
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(42.0), "42");
        assert_eq!(format_general(-7.0), "-7");
        assert_eq!(format_general(3.5), "3.5");
        assert_eq!(format_general(0.1 + 0.2), "0.3");
        assert_eq!(format_general(123456789012.0), "1.23457E+11");
        assert_eq!(format_general(0.00000000001), "1E-11");
    }

    #[test]
    fn test_fixed_formats() {
        assert_eq!(format_number(1234.5678, "0"), "1235");
        assert_eq!(format_number(1234.5678, "0.00"), "1234.57");
        assert_eq!(format_number(1234.5678, "#,##0"), "1,235");
        assert_eq!(format_number(1234567.891, "#,##0.00"), "1,234,567.89");
        assert_eq!(format_number(0.5, "#.##"), ".5");
        assert_eq!(format_number(5.0, "0.0#"), "5.0");
        assert_eq!(format_number(-3.26, "0.0"), "-3.3");
        assert_eq!(format_number(-0.01, "0"), "0");
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(format_number(2.5, "0"), "3");
        assert_eq!(format_number(-2.5, "0"), "-3");
        assert_eq!(format_number(52000.5, "#,##0"), "52,001");
        assert_eq!(format_number(0.125, "0.00"), "0.13");
        assert_eq!(format_number(0.125, "0%"), "13%");
        assert_eq!(format_number(1.005, "0.00"), "1.01");
        assert_eq!(format_number(-3.25, "0.0"), "-3.3");
        assert_eq!(format_number(1e20, "0"), "100000000000000000000");
    }

    #[test]
    fn test_fractions() {
        assert_eq!(format_number(1.25, "# ?/?"), "1 1/4");
        assert_eq!(format_number(0.5, "# ??/??"), "1/2");
        assert_eq!(format_number(3.0, "# ?/?"), "3");
        assert_eq!(format_number(0.0, "# ?/?"), "0");
        assert_eq!(format_number(0.3333, "# ??/??"), "1/3");
        assert_eq!(format_number(2.99, "# ?/?"), "3");
        assert_eq!(format_number(-1.75, "# ?/?"), "-1 3/4");
        assert_eq!(format_number(1.3, "# ?/8"), "1 2/8");
        assert_eq!(format_number(1.25, "?/?"), "5/4");
        assert_eq!(format_number(0.5, "0 ?/?"), "0 1/2");
    }

    #[test]
    fn test_percent_and_scaling() {
        assert_eq!(format_number(0.256, "0%"), "26%");
        assert_eq!(format_number(0.256, "0.00%"), "25.60%");
        assert_eq!(format_number(1_500_000.0, "#,##0.0,,\"M\""), "1.5M");
    }

    #[test]
    fn test_scientific() {
        assert_eq!(format_number(12345.0, "0.00E+00"), "1.23E+04");
        assert_eq!(format_number(0.00012, "0.00E+00"), "1.20E-04");
        assert_eq!(format_number(12345.0, "##0.0E+0"), "12.3E+3");
    }

    #[test]
    fn test_sections_and_literals() {
        let accounting = "#,##0.00_);(#,##0.00)";
        assert_eq!(format_number(1234.5, accounting), "1,234.50 ");
        assert_eq!(format_number(-1234.5, accounting), "(1,234.50)");

        let currency = "\"$\"#,##0.00";
        assert_eq!(format_number(9.5, currency), "$9.50");
        assert_eq!(format_number(9.5, "[$€-407]#,##0.00"), "€9.50");
        assert_eq!(format_number(0.0, "0.00;-0.00;\"zero\""), "zero");
        assert_eq!(format_number(5.0, "[Red]0"), "5");
    }

    #[test]
    fn test_text_and_general_sections() {
        assert_eq!(format_number(12.5, "General"), "12.5");
        assert_eq!(format_number(12.5, "@"), "12.5");
    }
}
