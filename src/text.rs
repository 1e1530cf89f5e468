use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref CELL_ADDRESS_REGEX: Regex = Regex::new(r"^([A-Za-z]{1,3})([0-9]+)$").unwrap();
}

/// Characters removed from a row's text before keyword matching: half- and
/// full-width spaces and colons.
const ROW_NOISE: [char; 4] = [' ', '\u{3000}', ':', '：'];

/// Normalize the concatenated text of a row for exclusion matching.
pub fn normalize_row_text(text: &str) -> String {
    text.chars().filter(|c| !ROW_NOISE.contains(c)).collect()
}

/// Fold full-width characters to half-width and drop all whitespace.
///
/// # Examples
/// ```
/// use inspection_form::text::normalize_email;
///
/// assert_eq!(normalize_email(" ｙａｍａｄａ＠ｅｘａｍｐｌｅ．ｃｏｍ "), "yamada@example.com");
/// ```
pub fn normalize_email(raw: &str) -> String {
    raw.nfkc().filter(|c| !c.is_whitespace()).collect()
}

/// Truncate to at most `max` characters, appending `…` when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push('…');
    cut
}

/// Convert column letters to a 1-based column number (A=1, AA=27).
pub fn letter_to_column(letters: &str) -> u16 {
    letters
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .fold(0, |acc, c| acc * 26 + (c as u16 - 'A' as u16 + 1))
}

/// Parse an address such as `B3` into 1-based `(row, col)`.
pub fn parse_cell_address(address: &str) -> Option<(u32, u16)> {
    let caps = CELL_ADDRESS_REGEX.captures(address.trim())?;
    let col = letter_to_column(&caps[1]);
    let row: u32 = caps[2].parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_text_drops_spaces_and_colons() {
        assert_eq!(normalize_row_text("作成 部署：品質　保証部"), "作成部署品質保証部");
        assert_eq!(normalize_row_text("改訂日: 2024/01/01"), "改訂日2024/01/01");
    }

    #[test]
    fn email_is_folded_and_stripped() {
        assert_eq!(normalize_email("taro.suzuki ＠example.co.jp"), "taro.suzuki@example.co.jp");
        assert_eq!(normalize_email("\tａｂｃ@x.jp\u{3000}"), "abc@x.jp");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("傷がないこと", 10), "傷がないこと");
        assert_eq!(truncate_chars("傷がないこと", 3), "傷がな…");
    }

    #[test]
    fn column_letters_convert() {
        assert_eq!(letter_to_column("A"), 1);
        assert_eq!(letter_to_column("AA"), 27);
        assert_eq!(letter_to_column("U"), 21);
        assert_eq!(letter_to_column("y"), 25);
    }

    #[test]
    fn cell_addresses_parse() {
        assert_eq!(parse_cell_address("B3"), Some((3, 2)));
        assert_eq!(parse_cell_address("AA10"), Some((10, 27)));
        assert_eq!(parse_cell_address("A0"), None);
        assert_eq!(parse_cell_address("3B"), None);
    }
}
