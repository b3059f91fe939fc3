// Phone number helpers (NANP-aware, lenient for everything else)

/// Keep only ASCII digits.
pub fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digits with the NANP country code stripped from 11-digit numbers.
pub fn normalize(raw: &str) -> String {
    let d = digits(raw);
    if d.len() == 11 && d.starts_with('1') {
        d[1..].to_string()
    } else {
        d
    }
}

/// Area code of a 10-digit (after normalization) number.
pub fn area_code(raw: &str) -> Option<String> {
    let d = normalize(raw);
    if d.len() == 10 {
        Some(d[..3].to_string())
    } else {
        None
    }
}

/// `(555) 123-4567` for 10-digit numbers, otherwise the trimmed input.
pub fn display(raw: &str) -> String {
    let d = normalize(raw);
    if d.len() == 10 {
        format!("({}) {}-{}", &d[..3], &d[3..6], &d[6..])
    } else {
        raw.trim().to_string()
    }
}

/// Dialable form used in `tel:` and `sms:` URIs.
pub fn e164(raw: &str) -> String {
    let d = normalize(raw);
    if d.len() == 10 {
        format!("+1{}", d)
    } else {
        format!("+{}", d)
    }
}
