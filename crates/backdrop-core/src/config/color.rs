/// RGB color parsed from a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// The host's default background and transparency key.
    pub const TAN: Self = Self {
        r: 0xD2,
        g: 0xB4,
        b: 0x8C,
    };

    /// Parses a hex color string like "#d2b48c" or "d2b48c".
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        Some(Self {
            r: u8::from_str_radix(&hex[0..2], 16).ok()?,
            g: u8::from_str_radix(&hex[2..4], 16).ok()?,
            b: u8::from_str_radix(&hex[4..6], 16).ok()?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Packs the color as a Win32 `COLORREF` (`0x00BBGGRR`).
    pub fn to_colorref(self) -> u32 {
        u32::from(self.r) | (u32::from(self.g) << 8) | (u32::from(self.b) << 16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_color() {
        assert_eq!(Color::from_hex("#d2b48c"), Some(Color::TAN));
        assert_eq!(Color::from_hex("D2B48C"), Some(Color::TAN));
        assert_eq!(Color::from_hex("bad"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn colorref_is_bgr() {
        assert_eq!(Color::TAN.to_colorref(), 0x008C_B4D2);
    }

    #[test]
    fn hex_round_trips_through_string() {
        assert_eq!(Color::from_hex(&Color::TAN.to_hex()), Some(Color::TAN));
    }
}
