//! Best-effort numeric scanning of command-line values.
//!
//! Leading whitespace is skipped and the longest numeric prefix is taken, so
//! `"4x"` scans as 4. A value with no
//! numeric prefix yields `None`; callers fall back to zero.

/// Scan a leading signed decimal integer.
pub fn scan_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let end = sign_len(text) + digits_len(&text[sign_len(text)..]);
    text[..end].parse().ok()
}

/// Scan a leading decimal float (`1`, `.5`, `-2.5e-1`).
pub fn scan_float(text: &str) -> Option<f32> {
    let text = text.trim_start();
    let mut end = sign_len(text);
    let int_digits = digits_len(&text[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if text[end..].starts_with('.') {
        frac_digits = digits_len(&text[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    let rest = &text[end..];
    if rest.starts_with(['e', 'E']) {
        let exp_sign = sign_len(&rest[1..]);
        let exp_digits = digits_len(&rest[1 + exp_sign..]);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }
    text[..end].parse().ok()
}

fn sign_len(text: &str) -> usize {
    usize::from(text.starts_with(['+', '-']))
}

fn digits_len(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}
