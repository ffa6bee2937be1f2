// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::Trap;

/// The character encoding of written events.
///
/// Characters that cannot be represented in the charset are written as `?`.
///
/// # Examples
///
/// ```
/// use plainlog::append::Charset;
///
/// let charset: Charset = "ISO-8859-1".parse().unwrap();
/// assert_eq!(charset.encode("café ✓").as_ref(), b"caf\xe9 ?");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// UTF-8, the platform default.
    #[default]
    Utf8,
    /// UTF-16, big endian, without a byte order mark.
    Utf16Be,
    /// UTF-16, little endian, without a byte order mark.
    Utf16Le,
    /// 7-bit US-ASCII.
    Ascii,
    /// ISO-8859-1.
    Latin1,
}

impl Charset {
    /// Resolve a configured charset name.
    ///
    /// `None` resolves to UTF-8. An unknown name is reported to `trap` and also resolves to
    /// UTF-8.
    pub fn resolve(name: Option<&str>, trap: &dyn Trap) -> Charset {
        match name.map(str::parse::<Charset>) {
            None => Charset::Utf8,
            Some(Ok(charset)) => charset,
            Some(Err(err)) => {
                trap.trap(
                    &Error::bad_config("charset", name.unwrap_or_default(), Charset::Utf8)
                        .with_source(err),
                );
                Charset::Utf8
            }
        }
    }

    /// The canonical name of the charset.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Ascii => "US-ASCII",
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    /// Encode `text`. UTF-8 borrows the text as is.
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        match self {
            Charset::Utf8 => Cow::Borrowed(text.as_bytes()),
            Charset::Utf16Be => Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Charset::Utf16Le => Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Charset::Ascii if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Charset::Ascii => Cow::Owned(
                text.chars()
                    .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                    .collect(),
            ),
            Charset::Latin1 if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Charset::Latin1 => Cow::Owned(
                text.chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect::<String>();

        match normalized.as_str() {
            "UTF8" => Ok(Charset::Utf8),
            "UTF16" | "UTF16BE" => Ok(Charset::Utf16Be),
            "UTF16LE" => Ok(Charset::Utf16Le),
            "ASCII" | "USASCII" => Ok(Charset::Ascii),
            "LATIN1" | "ISO88591" => Ok(Charset::Latin1),
            _ => Err(Error::new(format!("unsupported charset: {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trap::tests::RecordingTrap;

    #[test]
    fn names() {
        assert_eq!("utf-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("UTF_16LE".parse::<Charset>().unwrap(), Charset::Utf16Le);
        assert_eq!("us-ascii".parse::<Charset>().unwrap(), Charset::Ascii);
        assert_eq!("latin1".parse::<Charset>().unwrap(), Charset::Latin1);
        assert!("EBCDIC".parse::<Charset>().is_err());
    }

    #[test]
    fn unknown_names_fall_back() {
        let trap = RecordingTrap::default();
        assert_eq!(Charset::resolve(None, &trap), Charset::Utf8);
        assert_eq!(Charset::resolve(Some("UTF-16"), &trap), Charset::Utf16Be);
        assert!(trap.messages().is_empty());

        assert_eq!(Charset::resolve(Some("EBCDIC"), &trap), Charset::Utf8);
        assert_eq!(trap.messages().len(), 1);
        assert!(trap.messages()[0].contains("EBCDIC"));
    }

    #[test]
    fn encodings() {
        assert!(matches!(Charset::Utf8.encode("é"), Cow::Borrowed(_)));
        assert_eq!(Charset::Utf16Be.encode("A€").as_ref(), &[0x00, 0x41, 0x20, 0xAC]);
        assert_eq!(Charset::Utf16Le.encode("A€").as_ref(), &[0x41, 0x00, 0xAC, 0x20]);
        assert_eq!(Charset::Ascii.encode("naïve").as_ref(), b"na?ve");
        assert_eq!(Charset::Latin1.encode("naïve €").as_ref(), b"na\xefve ?");
    }
}
