use nalgebra::Vector3;

// "#rrggbb" 혹은 "rrggbb"를 [0, 1] 성분으로. 이상한 입력은 None
pub fn parse_hex_color(text: &str) -> Option<Vector3<f32>> {
    let trimmed = text.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Vector3::new(
        ((value >> 16) & 0xFF) as f32 / 255.0,
        ((value >> 8) & 0xFF) as f32 / 255.0,
        (value & 0xFF) as f32 / 255.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hash_prefixed_hex() {
        let color = parse_hex_color("#ffeded").unwrap();
        assert!((color.x - 1.0).abs() < 1e-6);
        assert!((color.y - 237.0 / 255.0).abs() < 1e-6);
        assert!((color.z - 237.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn parses_bare_hex_and_whitespace() {
        assert!(parse_hex_color("4488ee").is_some());
        assert!(parse_hex_color("  #4488ee  ").is_some());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_hex_color("").is_none());
        assert!(parse_hex_color("#fff").is_none());
        assert!(parse_hex_color("#ffededff").is_none());
        assert!(parse_hex_color("#zzeded").is_none());
    }
}
