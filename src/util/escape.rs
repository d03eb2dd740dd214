/*!
Debug-formatting helpers for bytes and byte strings, used so that error
messages and `Debug` impls involving haystacks don't dump raw, possibly
non-UTF-8, bytes onto the terminal.
*/

use core::{ascii, fmt, str};

/// Wraps a single byte with a `Debug` impl that escapes it the way Rust's
/// `\xNN` byte-literal syntax would, e.g. `b'\n'` prints as `\n` and `b'\xff'`
/// prints as `\xFF`.
pub(crate) struct DebugByte(pub u8);

impl fmt::Debug for DebugByte {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // 10 bytes is enough to cover any output from ascii::escape_default.
        let mut bytes = [0u8; 10];
        let mut len = 0;
        for (i, mut b) in ascii::escape_default(self.0).enumerate() {
            // Capitalize \xab to \xAB, to match how the rest of the crate
            // spells hex escapes.
            if i >= 2 && b'a' <= b && b <= b'f' {
                b -= 32;
            }
            bytes[len] = b;
            len += 1;
        }
        write!(f, "{}", str::from_utf8(&bytes[..len]).unwrap())
    }
}

/// Wraps a byte slice with a `Debug` impl that renders it as a quoted,
/// escaped string, truncating very long haystacks so a single bad match
/// doesn't flood a test failure or panic message.
pub(crate) struct DebugHaystack<'a>(pub &'a [u8]);

impl<'a> fmt::Debug for DebugHaystack<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const LIMIT: usize = 60;
        write!(f, "\"")?;
        let (shown, truncated) = if self.0.len() > LIMIT {
            (&self.0[..LIMIT], true)
        } else {
            (self.0, false)
        };
        for &b in shown {
            match b {
                0x20..=0x7E => write!(f, "{}", b as char)?,
                _ => write!(f, "{:?}", DebugByte(b))?,
            }
        }
        if truncated {
            write!(f, "... [{} bytes total]", self.0.len())?;
        }
        write!(f, "\"")
    }
}
