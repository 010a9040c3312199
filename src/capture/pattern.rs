//! Synthetic EAN-13 symbols for the mock camera.
//!
//! Renders a clean symbol into a luma frame so the full capture-crop-decode
//! loop can run without a physical camera.

use thiserror::Error;

/// Left-half odd parity ("L") patterns, one per digit.
const L_CODES: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011, 0b0110001, 0b0101111, 0b0111011,
    0b0110111, 0b0001011,
];

/// Left-half even parity ("G") patterns.
const G_CODES: [u8; 10] = [
    0b0100111, 0b0110011, 0b0011011, 0b0100001, 0b0011101, 0b0111001, 0b0000101, 0b0010001,
    0b0001001, 0b0010111,
];

/// Right-half ("R") patterns.
const R_CODES: [u8; 10] = [
    0b1110010, 0b1100110, 0b1101100, 0b1000010, 0b1011100, 0b1001110, 0b1010000, 0b1000100,
    0b1001000, 0b1110100,
];

/// Parity of the six left digits, selected by the leading digit.
/// A set bit means G parity; the most significant of the six bits is the
/// first left digit.
const PARITY: [u8; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011, 0b011001, 0b011100, 0b010101, 0b010110,
    0b011010,
];

/// Number of modules in one EAN-13 symbol, guards included.
pub const EAN13_MODULES: usize = 95;

/// Quiet zone on each side, in modules.
pub const QUIET_ZONE_MODULES: usize = 11;

/// Errors from parsing an EAN-13 value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("EAN-13 value must be 12 or 13 digits, got {0} characters")]
    InvalidLength(usize),
    #[error("EAN-13 value contains a non-digit character {0:?}")]
    NonDigit(char),
    #[error("EAN-13 check digit mismatch: expected {expected}, got {found}")]
    CheckDigit { expected: u8, found: u8 },
}

/// A validated thirteen digit EAN-13 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ean13 {
    digits: [u8; 13],
}

impl Ean13 {
    /// Parses 12 digits (check digit appended) or 13 digits (check digit
    /// verified).
    pub fn parse(value: &str) -> Result<Self, PatternError> {
        let parsed = value
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8).ok_or(PatternError::NonDigit(c)))
            .collect::<Result<Vec<u8>, _>>()?;

        let mut digits = [0u8; 13];
        match parsed.len() {
            12 => {
                digits[..12].copy_from_slice(&parsed);
                digits[12] = check_digit(&digits[..12]);
            }
            13 => {
                digits.copy_from_slice(&parsed);
                let expected = check_digit(&digits[..12]);
                if digits[12] != expected {
                    return Err(PatternError::CheckDigit {
                        expected,
                        found: digits[12],
                    });
                }
            }
            n => return Err(PatternError::InvalidLength(n)),
        }

        Ok(Self { digits })
    }

    /// Returns the thirteen digits.
    pub fn digits(&self) -> &[u8; 13] {
        &self.digits
    }

    /// Encodes the symbol as 95 modules, `true` meaning a dark bar.
    pub fn modules(&self) -> Vec<bool> {
        let mut modules = Vec::with_capacity(EAN13_MODULES);
        let mut push = |bits: u8, width: u32| {
            for shift in (0..width).rev() {
                modules.push((bits >> shift) & 1 == 1);
            }
        };

        push(0b101, 3);
        let parity = PARITY[self.digits[0] as usize];
        for (i, &digit) in self.digits[1..7].iter().enumerate() {
            let even = (parity >> (5 - i)) & 1 == 1;
            let code = if even { G_CODES } else { L_CODES };
            push(code[digit as usize], 7);
        }
        push(0b01010, 5);
        for &digit in &self.digits[7..13] {
            push(R_CODES[digit as usize], 7);
        }
        push(0b101, 3);

        modules
    }

    /// Paints the symbol centered in a white luma buffer.
    ///
    /// Bars span `bar_rows` (clamped to the frame). The symbol is clipped if
    /// it does not fit horizontally.
    pub fn paint(
        &self,
        pixels: &mut [u8],
        width: u32,
        height: u32,
        module_px: u32,
        bar_rows: std::ops::Range<u32>,
    ) {
        if pixels.len() < (width as usize) * (height as usize) {
            return;
        }
        pixels.fill(255);

        let symbol_px = (EAN13_MODULES as u32) * module_px;
        let left = (width as i64 - symbol_px as i64) / 2;
        let modules = self.modules();
        let rows = bar_rows.start.min(height)..bar_rows.end.min(height);

        for y in rows {
            let row_start = (y * width) as usize;
            for (m, &dark) in modules.iter().enumerate() {
                if !dark {
                    continue;
                }
                for dx in 0..module_px as i64 {
                    let x = left + m as i64 * module_px as i64 + dx;
                    if (0..width as i64).contains(&x) {
                        pixels[row_start + x as usize] = 0;
                    }
                }
            }
        }
    }
}

impl std::fmt::Display for Ean13 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in self.digits {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

/// Computes the EAN-13 check digit over the first twelve digits.
fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d as u32 } else { d as u32 * 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_digit_appended() {
        let code = Ean13::parse("400638133393").unwrap();
        assert_eq!(code.to_string(), "4006381333931");
    }

    #[test]
    fn test_bad_check_digit_rejected() {
        assert_eq!(
            Ean13::parse("4006381333932"),
            Err(PatternError::CheckDigit {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Ean13::parse("12345"), Err(PatternError::InvalidLength(5)));
        assert_eq!(
            Ean13::parse("40063813339x"),
            Err(PatternError::NonDigit('x'))
        );
    }

    #[test]
    fn test_modules_have_guards() {
        let modules = Ean13::parse("4006381333931").unwrap().modules();
        assert_eq!(modules.len(), EAN13_MODULES);
        assert_eq!(&modules[..3], &[true, false, true]);
        assert_eq!(&modules[45..50], &[false, true, false, true, false]);
        assert_eq!(&modules[92..], &[true, false, true]);
    }

    #[test]
    fn test_paint_leaves_rows_outside_bars_white() {
        let code = Ean13::parse("4006381333931").unwrap();
        let (w, h) = (200u32, 20u32);
        let mut pixels = vec![0u8; (w * h) as usize];
        code.paint(&mut pixels, w, h, 2, 5..15);

        assert!(pixels[..(5 * w) as usize].iter().all(|&p| p == 255));
        assert!(pixels[(5 * w) as usize..(6 * w) as usize].contains(&0));
        assert!(pixels[(15 * w) as usize..].iter().all(|&p| p == 255));
    }
}
